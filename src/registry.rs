//! Isolation-scoped singleton storage.
//!
//! Each isolation unit (one deployment) owns a private map from symbolic name
//! to instance. Instances are created lazily through a [`SingletonFactory`]
//! and live until the whole unit is evicted.
//!
//! # Examples
//!
//! ```
//! use scoped_registry::{FactoryCatalog, IsolationUnit, SingletonRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct BeanManager;
//!
//! let mut catalog = FactoryCatalog::new();
//! catalog.register::<BeanManager>("bean-manager");
//!
//! let registry = SingletonRegistry::new();
//! let app_a = IsolationUnit::issue();
//! let app_b = IsolationUnit::issue();
//!
//! let a1 = registry.get_singleton(&app_a, "bean-manager", &catalog).unwrap();
//! let a2 = registry.get_singleton(&app_a, "bean-manager", &catalog).unwrap();
//! let b1 = registry.get_singleton(&app_b, "bean-manager", &catalog).unwrap();
//!
//! assert!(Arc::ptr_eq(&a1, &a2));
//! assert!(!Arc::ptr_eq(&a1, &b1));
//!
//! assert_eq!(registry.evict_unit(&app_a), 1);
//! ```

use std::{
    collections::HashMap,
    fmt,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    FactoryError, Instance, IsolationUnit, RegistryError, RegistryEvent, SingletonFactory,
};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives every [`RegistryEvent`]. It runs after the registry
/// lock has been released, so it may call back into the same registry.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

type InstanceMap = HashMap<String, Instance>;

/// Per-unit singleton registry.
///
/// A single mutex guards the whole lookup-or-create sequence, including the
/// factory call. Concurrent callers asking for the same `(unit, name)` pair
/// block until the first construction finishes, so the factory runs at most
/// once per pair. Factories must not call back into the same registry.
pub struct SingletonRegistry<U = IsolationUnit> {
    units: Mutex<HashMap<U, InstanceMap>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl<U> SingletonRegistry<U>
where
    U: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            units: Mutex::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a callback invoked on every registry operation.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Builds and emits an event, but only when a callback is installed.
    fn emit_event(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(&event());
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------------------------------

    // A panicking factory leaves the map untouched, so a poisoned lock still
    // guards consistent state.
    fn lock_units(&self) -> MutexGuard<'_, HashMap<U, InstanceMap>> {
        self.units.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Returns the instance for `(unit, name)`, creating it on first demand.
    ///
    /// The factory is invoked only when no instance is cached, and at most
    /// once even under concurrent callers. A trace callback sees a
    /// `Get { found }` event, followed by `Create` or `CreateFailed` when the
    /// factory ran.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidName`] if `name` is empty
    /// - [`RegistryError::CreationFailed`] if the factory fails; nothing is
    ///   cached and the next call retries
    pub fn get_singleton<F>(
        &self,
        unit: &U,
        name: &str,
        factory: &F,
    ) -> Result<Instance, RegistryError>
    where
        F: SingletonFactory + ?Sized,
    {
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        let mut units = self.lock_units();

        if let Some(existing) = units.get(unit).and_then(|instances| instances.get(name)) {
            let existing = Arc::clone(existing);
            drop(units);
            self.emit_get(unit, name, true);
            return Ok(existing);
        }

        let created = factory.create(name);
        if let Ok(instance) = &created {
            units
                .entry(unit.clone())
                .or_default()
                .insert(name.to_owned(), Arc::clone(instance));
        }
        drop(units);

        self.emit_get(unit, name, false);
        match created {
            Ok(instance) => {
                tracing::debug!(unit = ?unit, name, "created singleton");
                self.emit_event(|| RegistryEvent::Create {
                    unit: format!("{unit:?}"),
                    name: name.to_owned(),
                });
                Ok(instance)
            }
            Err(source) => Err(self.creation_failed(unit, name, source)),
        }
    }

    /// [`get_singleton`](Self::get_singleton) narrowed to a concrete type.
    ///
    /// # Errors
    ///
    /// Everything `get_singleton` returns, plus [`RegistryError::TypeMismatch`]
    /// when the cached instance is not a `T`. The instance stays cached.
    pub fn get_singleton_as<T, F>(
        &self,
        unit: &U,
        name: &str,
        factory: &F,
    ) -> Result<Arc<T>, RegistryError>
    where
        T: Send + Sync + 'static,
        F: SingletonFactory + ?Sized,
    {
        self.get_singleton(unit, name, factory)?
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Drops every instance cached for `unit` and returns how many there were.
    ///
    /// Evicting an unknown unit is a no-op returning `0`. Instances still
    /// referenced elsewhere stay alive; the registry only releases its own
    /// handles.
    pub fn evict_unit(&self, unit: &U) -> usize {
        let removed = self
            .lock_units()
            .remove(unit)
            .map_or(0, |instances| instances.len());

        tracing::debug!(unit = ?unit, removed, "evicted isolation unit");
        self.emit_event(|| RegistryEvent::Evict {
            unit: format!("{unit:?}"),
            removed,
        });
        removed
    }

    /// Whether an instance is cached for `(unit, name)`. Never constructs.
    pub fn contains(&self, unit: &U, name: &str) -> bool {
        self.lock_units()
            .get(unit)
            .is_some_and(|instances| instances.contains_key(name))
    }

    /// Number of units holding at least one instance.
    pub fn unit_count(&self) -> usize {
        self.lock_units().len()
    }

    pub fn instance_count(&self, unit: &U) -> usize {
        self.lock_units().get(unit).map_or(0, HashMap::len)
    }

    fn emit_get(&self, unit: &U, name: &str, found: bool) {
        tracing::trace!(unit = ?unit, name, found, "singleton lookup");
        self.emit_event(|| RegistryEvent::Get {
            unit: format!("{unit:?}"),
            name: name.to_owned(),
            found,
        });
    }

    fn creation_failed(&self, unit: &U, name: &str, source: FactoryError) -> RegistryError {
        tracing::error!(unit = ?unit, name, error = %source, "unable to create singleton");
        self.emit_event(|| RegistryEvent::CreateFailed {
            unit: format!("{unit:?}"),
            name: name.to_owned(),
        });
        RegistryError::CreationFailed {
            name: name.to_owned(),
            source,
        }
    }
}

impl<U> Default for SingletonRegistry<U>
where
    U: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for SingletonRegistry<U>
where
    U: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("units", &self.unit_count())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FactoryCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Barrier, Mutex as StdMutex};
    use std::thread;

    /// Counts invocations and builds a `Vec<String>` tagged with the name.
    #[derive(Default)]
    struct CountingFactory {
        calls: AtomicUsize,
    }

    impl SingletonFactory for CountingFactory {
        fn create(&self, name: &str) -> Result<Instance, FactoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(vec![name.to_owned()]))
        }
    }

    impl CountingFactory {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn failing(_: &str) -> Result<Instance, FactoryError> {
        Err("class not found".into())
    }

    #[test]
    fn test_same_pair_returns_same_instance() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let first = registry.get_singleton(&unit, "manager", &factory).unwrap();
        let second = registry.get_singleton(&unit, "manager", &factory).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.calls(), 1);
    }

    #[test]
    fn test_units_are_isolated() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let (a, b) = (IsolationUnit::issue(), IsolationUnit::issue());

        let in_a = registry.get_singleton(&a, "manager", &factory).unwrap();
        let in_b = registry.get_singleton(&b, "manager", &factory).unwrap();

        assert!(!Arc::ptr_eq(&in_a, &in_b));
        assert_eq!(factory.calls(), 2);
        assert_eq!(registry.unit_count(), 2);
    }

    #[test]
    fn test_names_are_independent_within_unit() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let a = registry.get_singleton(&unit, "a", &factory).unwrap();
        let b = registry.get_singleton(&unit, "b", &factory).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.instance_count(&unit), 2);
    }

    #[test]
    fn test_creation_failure_is_not_cached() {
        let registry = SingletonRegistry::new();
        let unit = IsolationUnit::issue();

        let err = registry.get_singleton(&unit, "missing", &failing).unwrap_err();
        match err {
            RegistryError::CreationFailed { name, source } => {
                assert_eq!(name, "missing");
                assert_eq!(source.to_string(), "class not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!registry.contains(&unit, "missing"));
        assert_eq!(registry.unit_count(), 0);

        // a later call retries with a working factory
        let factory = CountingFactory::default();
        registry.get_singleton(&unit, "missing", &factory).unwrap();
        assert_eq!(factory.calls(), 1);
        assert!(registry.contains(&unit, "missing"));
    }

    #[test]
    fn test_empty_name_rejected_without_calling_factory() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let err = registry.get_singleton(&unit, "", &factory).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName));
        assert_eq!(factory.calls(), 0);
    }

    #[test]
    fn test_evict_then_recreate() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let before = registry.get_singleton(&unit, "manager", &factory).unwrap();
        registry.get_singleton(&unit, "other", &factory).unwrap();

        assert_eq!(registry.evict_unit(&unit), 2);
        assert_eq!(registry.instance_count(&unit), 0);

        let after = registry.get_singleton(&unit, "manager", &factory).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(factory.calls(), 3);
    }

    #[test]
    fn test_evict_unknown_unit_is_noop() {
        let registry: SingletonRegistry = SingletonRegistry::new();
        assert_eq!(registry.evict_unit(&IsolationUnit::issue()), 0);
        assert_eq!(registry.evict_unit(&IsolationUnit::issue()), 0);
    }

    #[test]
    fn test_evict_leaves_other_units() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let (a, b) = (IsolationUnit::issue(), IsolationUnit::issue());

        registry.get_singleton(&a, "manager", &factory).unwrap();
        let kept = registry.get_singleton(&b, "manager", &factory).unwrap();

        registry.evict_unit(&a);

        let again = registry.get_singleton(&b, "manager", &factory).unwrap();
        assert!(Arc::ptr_eq(&kept, &again));
        assert_eq!(factory.calls(), 2);
    }

    #[test]
    fn test_evicted_instances_outlive_registry_handle() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let held = registry.get_singleton(&unit, "manager", &factory).unwrap();
        assert_eq!(Arc::strong_count(&held), 2); // held + registry

        registry.evict_unit(&unit);
        assert_eq!(Arc::strong_count(&held), 1);
        assert_eq!(
            held.downcast_ref::<Vec<String>>(),
            Some(&vec!["manager".to_owned()])
        );
    }

    #[test]
    fn test_get_singleton_as() {
        let mut catalog = FactoryCatalog::new();
        catalog.register::<String>("greeting");
        let registry = SingletonRegistry::new();
        let unit = IsolationUnit::issue();

        let s: Arc<String> = registry
            .get_singleton_as(&unit, "greeting", &catalog)
            .unwrap();
        assert!(s.is_empty());

        let err = registry
            .get_singleton_as::<u64, _>(&unit, "greeting", &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::TypeMismatch { ref name, expected: "u64" } if name == "greeting"
        ));
        assert!(registry.contains(&unit, "greeting"));
    }

    #[test]
    fn test_custom_unit_type() {
        let registry: SingletonRegistry<&'static str> = SingletonRegistry::new();
        let factory = CountingFactory::default();

        let a = registry.get_singleton(&"shop.war", "cfg", &factory).unwrap();
        let b = registry.get_singleton(&"admin.war", "cfg", &factory).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.evict_unit(&"shop.war"), 1);
    }

    #[test]
    fn test_concurrent_creation_runs_factory_once() {
        const THREADS: usize = 16;

        let registry = Arc::new(SingletonRegistry::new());
        let factory = Arc::new(CountingFactory::default());
        let barrier = Arc::new(Barrier::new(THREADS));
        let unit = IsolationUnit::issue();

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let factory = Arc::clone(&factory);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_singleton(&unit, "shared", &*factory).unwrap()
                })
            })
            .collect();

        let instances: Vec<Instance> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(factory.calls(), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
    }

    #[test]
    fn test_panicking_factory_does_not_poison_registry() {
        let registry = Arc::new(SingletonRegistry::new());
        let unit = IsolationUnit::issue();

        let r = Arc::clone(&registry);
        let result = thread::spawn(move || {
            let boom = |_: &str| -> Result<Instance, FactoryError> { panic!("constructor panicked") };
            let _ = r.get_singleton(&unit, "x", &boom);
        })
        .join();
        assert!(result.is_err());

        let factory = CountingFactory::default();
        registry.get_singleton(&unit, "x", &factory).unwrap();
        assert_eq!(factory.calls(), 1);
    }

    #[test]
    fn test_trace_events() {
        let registry = SingletonRegistry::new();
        let factory = CountingFactory::default();
        let unit = IsolationUnit::from_raw(7);

        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        registry.get_singleton(&unit, "m", &factory).unwrap();
        registry.get_singleton(&unit, "m", &factory).unwrap();
        let _ = registry.get_singleton(&unit, "bad", &failing);
        registry.evict_unit(&unit);

        registry.clear_trace_callback();
        registry.evict_unit(&unit);

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "get { unit: IsolationUnit(7), name: m, found: false }",
                "create { unit: IsolationUnit(7), name: m }",
                "get { unit: IsolationUnit(7), name: m, found: true }",
                "get { unit: IsolationUnit(7), name: bad, found: false }",
                "create_failed { unit: IsolationUnit(7), name: bad }",
                "evict { unit: IsolationUnit(7), removed: 1 }",
            ]
        );
    }

    #[test]
    fn test_trace_callback_may_reenter_registry() {
        let registry = Arc::new(SingletonRegistry::new());
        let factory = CountingFactory::default();
        let unit = IsolationUnit::issue();

        let seen = Arc::new(AtomicUsize::new(0));
        let (r, s) = (Arc::downgrade(&registry), seen.clone());
        registry.set_trace_callback(move |_| {
            if let Some(r) = r.upgrade() {
                s.store(r.unit_count(), Ordering::SeqCst);
            }
        });

        registry.get_singleton(&unit, "m", &factory).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        registry.clear_trace_callback();
    }

    #[test]
    fn test_debug_format() {
        let registry: SingletonRegistry = SingletonRegistry::default();
        assert_eq!(format!("{registry:?}"), "SingletonRegistry { units: 0, .. }");
    }
}
