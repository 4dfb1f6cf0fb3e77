/// Events emitted by a [`SingletonRegistry`](crate::SingletonRegistry).
///
/// These are passed to the callback set via `set_trace_callback`. The unit is
/// carried in its `Debug` form so events stay independent of the unit type.
///
/// # Examples
///
/// ```rust
/// use scoped_registry::RegistryEvent;
///
/// let event = RegistryEvent::Create {
///     unit: "unit-1".into(),
///     name: "app.Manager".into(),
/// };
/// assert_eq!(event.to_string(), "create { unit: unit-1, name: app.Manager }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A new instance was constructed and cached.
    Create { unit: String, name: String },

    /// A singleton was requested.
    Get {
        unit: String,
        name: String,
        /// Whether an instance was already cached before the call
        found: bool,
    },

    /// The factory failed; nothing was cached.
    CreateFailed { unit: String, name: String },

    /// All instances of a unit were dropped.
    Evict {
        unit: String,
        /// Number of instances removed (0 for an unknown unit)
        removed: usize,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Create { unit, name } => {
                write!(f, "create {{ unit: {unit}, name: {name} }}")
            }
            RegistryEvent::Get { unit, name, found } => {
                write!(f, "get {{ unit: {unit}, name: {name}, found: {found} }}")
            }
            RegistryEvent::CreateFailed { unit, name } => {
                write!(f, "create_failed {{ unit: {unit}, name: {name} }}")
            }
            RegistryEvent::Evict { unit, removed } => {
                write!(f, "evict {{ unit: {unit}, removed: {removed} }}")
            }
        }
    }
}
