//! Macros for declaring process-wide registries and directories.
//!
//! Prefer constructing [`SingletonRegistry`](crate::SingletonRegistry) and
//! [`NamingDirectory`](crate::NamingDirectory) explicitly and passing them by
//! reference. These macros exist for the cases where one instance per process
//! is genuinely required.

/// Declares a module holding a lazily created, process-wide
/// [`SingletonRegistry`](crate::SingletonRegistry).
///
/// The generated module exposes free functions delegating to the static:
/// `get_singleton`, `get_singleton_as`, `evict_unit`, `contains`,
/// `set_trace_callback`, `clear_trace_callback`, plus `registry()` for direct
/// access. The unit type defaults to [`IsolationUnit`](crate::IsolationUnit).
///
/// # Examples
///
/// ```rust
/// use scoped_registry::{define_registry, FactoryCatalog, IsolationUnit};
/// use std::sync::Arc;
///
/// define_registry!(container);
///
/// #[derive(Default)]
/// struct Conversations;
///
/// let mut catalog = FactoryCatalog::new();
/// catalog.register::<Conversations>("conversations");
///
/// let unit = IsolationUnit::issue();
/// let a = container::get_singleton(&unit, "conversations", &catalog).unwrap();
/// let b = container::get_singleton(&unit, "conversations", &catalog).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// assert_eq!(container::evict_unit(&unit), 1);
/// ```
///
/// With a custom unit type:
///
/// ```rust
/// use scoped_registry::define_registry;
///
/// define_registry!(by_name, String);
/// assert_eq!(by_name::evict_unit(&"shop.war".to_string()), 0);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        $crate::define_registry!($name, $crate::IsolationUnit);
    };
    ($name:ident, $unit:ty) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::{Arc, LazyLock};

            static REGISTRY: LazyLock<$crate::SingletonRegistry<$unit>> =
                LazyLock::new(|| $crate::SingletonRegistry::new());

            /// The process-wide registry behind this module.
            pub fn registry() -> &'static $crate::SingletonRegistry<$unit> {
                &REGISTRY
            }

            /// Returns the instance for `(unit, name)`, creating it on first demand.
            pub fn get_singleton<F>(
                unit: &$unit,
                name: &str,
                factory: &F,
            ) -> Result<$crate::Instance, $crate::RegistryError>
            where
                F: $crate::SingletonFactory + ?Sized,
            {
                REGISTRY.get_singleton(unit, name, factory)
            }

            pub fn get_singleton_as<T, F>(
                unit: &$unit,
                name: &str,
                factory: &F,
            ) -> Result<Arc<T>, $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                F: $crate::SingletonFactory + ?Sized,
            {
                REGISTRY.get_singleton_as(unit, name, factory)
            }

            /// Drops every instance cached for `unit`.
            pub fn evict_unit(unit: &$unit) -> usize {
                REGISTRY.evict_unit(unit)
            }

            pub fn contains(unit: &$unit, name: &str) -> bool {
                REGISTRY.contains(unit, name)
            }

            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}

/// Declares a module holding a lazily created, process-wide
/// [`NamingDirectory`](crate::NamingDirectory).
///
/// # Examples
///
/// ```rust
/// use scoped_registry::define_directory;
/// use std::sync::Arc;
///
/// define_directory!(jndi);
///
/// jndi::bind("java:comp/BeanManager", Arc::new("manager")).unwrap();
/// let found: Arc<&str> = jndi::lookup_as("java:comp/BeanManager").unwrap();
/// assert_eq!(*found, "manager");
/// jndi::unbind("java:comp/BeanManager").unwrap();
/// ```
#[macro_export]
macro_rules! define_directory {
    ($name:ident) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::{Arc, LazyLock};

            static DIRECTORY: LazyLock<$crate::NamingDirectory> =
                LazyLock::new($crate::NamingDirectory::new);

            /// The process-wide directory behind this module.
            pub fn directory() -> &'static $crate::NamingDirectory {
                &DIRECTORY
            }

            pub fn bind(path: &str, object: $crate::Instance) -> Result<(), $crate::NamingError> {
                DIRECTORY.bind(path, object)
            }

            pub fn lookup(path: &str) -> Result<$crate::Instance, $crate::NamingError> {
                DIRECTORY.lookup(path)
            }

            pub fn lookup_as<T: Send + Sync + 'static>(
                path: &str,
            ) -> Result<Arc<T>, $crate::NamingError> {
                DIRECTORY.lookup_as(path)
            }

            pub fn unbind(path: &str) -> Result<(), $crate::NamingError> {
                DIRECTORY.unbind(path)
            }

            pub fn create_directory(path: &str) -> Result<(), $crate::NamingError> {
                DIRECTORY.create_directory(path)
            }

            pub fn list(
                path: &str,
            ) -> Result<Vec<(String, $crate::NameKind)>, $crate::NamingError> {
                DIRECTORY.list(path)
            }

            pub fn contains(path: &str) -> bool {
                DIRECTORY.contains(path)
            }

            pub fn set_trace_callback(
                callback: impl Fn(&$crate::NamingEvent) + Send + Sync + 'static,
            ) {
                DIRECTORY.set_trace_callback(callback)
            }

            pub fn clear_trace_callback() {
                DIRECTORY.clear_trace_callback()
            }
        }
    };
}
