//! # Scoped Registry
//!
//! Per-deployment singleton state and a hierarchical naming directory for
//! containers hosting many isolated applications in one process.
//!
//! ## Quick Start
//!
//! ```rust
//! use scoped_registry::{FactoryCatalog, IsolationUnit, NamingDirectory, SingletonRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct BeanManager;
//!
//! let mut catalog = FactoryCatalog::new();
//! catalog.register::<BeanManager>("bean-manager");
//!
//! // one singleton per deployment
//! let registry = SingletonRegistry::new();
//! let deployment = IsolationUnit::issue();
//! let manager = registry.get_singleton(&deployment, "bean-manager", &catalog).unwrap();
//!
//! // publish it under a well-known name
//! let directory = NamingDirectory::new();
//! directory.bind("java:comp/BeanManager", Arc::clone(&manager)).unwrap();
//! assert!(Arc::ptr_eq(&directory.lookup("java:comp/BeanManager").unwrap(), &manager));
//!
//! // undeploy
//! directory.unbind("java:comp/BeanManager").unwrap();
//! registry.evict_unit(&deployment);
//! ```
//!
//! ## Features
//!
//! - **Exactly-once creation**: concurrent callers for the same
//!   `(unit, name)` pair share one instance and one factory call
//! - **Unit-granular teardown**: [`SingletonRegistry::evict_unit`] drops a
//!   deployment's state in one step
//! - **Auto-vivifying paths**: [`NamingDirectory::bind`] creates missing
//!   intermediate directories
//! - **Checked narrowing**: `*_as` lookups downcast and fail explicitly
//! - **Tracing**: `tracing` events plus optional per-instance callbacks
//!
//! ## Main Types
//!
//! - [`SingletonRegistry`] - isolation-scoped singleton cache
//! - [`SingletonFactory`] / [`FactoryCatalog`] - construction capability
//! - [`NamingDirectory`] - hierarchical bind/lookup/unbind
//! - [`define_registry!`] / [`define_directory!`] - process-wide instances

mod directory;
mod factory;
mod macros;
mod naming_error;
mod naming_event;
mod naming_path;
mod registry;
mod registry_error;
mod registry_event;
mod unit;

pub use directory::{NameKind, NamingDirectory, NamingTraceCallback};
pub use factory::{CatalogError, FactoryCatalog, Instance, SingletonFactory};
pub use naming_error::NamingError;
pub use naming_event::NamingEvent;
pub use naming_path::{NamePath, SEPARATOR};
pub use registry::{SingletonRegistry, TraceCallback};
pub use registry_error::{FactoryError, RegistryError};
pub use registry_event::RegistryEvent;
pub use unit::IsolationUnit;
