//! Construction capability used by the singleton registry.
//!
//! The registry never knows how to build anything itself. Each call to
//! [`SingletonRegistry::get_singleton`](crate::SingletonRegistry::get_singleton)
//! receives a [`SingletonFactory`] that turns a symbolic name into a fresh
//! instance. Plain closures work, and [`FactoryCatalog`] covers the common case
//! of a fixed name → constructor table.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::FactoryError;

/// A type-erased, shareable singleton instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Produces a new instance for a symbolic name.
pub trait SingletonFactory {
    /// Builds a fresh instance for `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` cannot be resolved or construction fails.
    fn create(&self, name: &str) -> Result<Instance, FactoryError>;
}

impl<F> SingletonFactory for F
where
    F: Fn(&str) -> Result<Instance, FactoryError>,
{
    fn create(&self, name: &str) -> Result<Instance, FactoryError> {
        self(name)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no constructor registered for '{name}'")]
    UnknownName { name: String },
}

type Constructor = Box<dyn Fn() -> Result<Instance, FactoryError> + Send + Sync>;

/// A name → constructor table.
///
/// # Examples
///
/// ```rust
/// use scoped_registry::{FactoryCatalog, IsolationUnit, SingletonRegistry};
///
/// #[derive(Default)]
/// struct BeanManager;
///
/// let mut catalog = FactoryCatalog::new();
/// catalog.register::<BeanManager>("bean-manager");
///
/// let registry = SingletonRegistry::new();
/// let unit = IsolationUnit::issue();
/// let manager = registry
///     .get_singleton_as::<BeanManager, _>(&unit, "bean-manager", &catalog)
///     .unwrap();
/// # let _ = manager;
/// assert!(registry.get_singleton(&unit, "unknown", &catalog).is_err());
/// ```
#[derive(Default)]
pub struct FactoryCatalog {
    constructors: HashMap<String, Constructor>,
}

impl FactoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name`, built with `T::default()`.
    pub fn register<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: Default + Send + Sync + 'static,
    {
        self.register_with(name, || Ok::<_, FactoryError>(T::default()))
    }

    /// Registers a fallible constructor under `name`. Replaces any previous one.
    pub fn register_with<T, E, C>(&mut self, name: impl Into<String>, ctor: C) -> &mut Self
    where
        T: Send + Sync + 'static,
        E: Into<FactoryError>,
        C: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let ctor: Constructor = Box::new(move || match ctor() {
            Ok(value) => Ok(Arc::new(value) as Instance),
            Err(err) => Err(err.into()),
        });
        self.constructors.insert(name.into(), ctor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl SingletonFactory for FactoryCatalog {
    fn create(&self, name: &str) -> Result<Instance, FactoryError> {
        let ctor = self
            .constructors
            .get(name)
            .ok_or_else(|| CatalogError::UnknownName {
                name: name.to_owned(),
            })?;
        ctor()
    }
}

impl fmt::Debug for FactoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FactoryCatalog").field("names", &names).finish()
    }
}
