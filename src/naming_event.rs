/// Events emitted by a [`NamingDirectory`](crate::NamingDirectory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingEvent {
    /// An object was bound (new binding or overwrite).
    Bind { path: String },

    Lookup { path: String, found: bool },

    Unbind { path: String, found: bool },

    /// A directory was explicitly requested via `create_directory`.
    CreateDirectory { path: String },
}

impl std::fmt::Display for NamingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingEvent::Bind { path } => write!(f, "bind {{ path: {path} }}"),
            NamingEvent::Lookup { path, found } => {
                write!(f, "lookup {{ path: {path}, found: {found} }}")
            }
            NamingEvent::Unbind { path, found } => {
                write!(f, "unbind {{ path: {path}, found: {found} }}")
            }
            NamingEvent::CreateDirectory { path } => {
                write!(f, "create_directory {{ path: {path} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_event_display() {
        let event = NamingEvent::Bind {
            path: "a/b".into(),
        };
        assert_eq!(event.to_string(), "bind { path: a/b }");

        let event = NamingEvent::Lookup {
            path: "a/b".into(),
            found: false,
        };
        assert_eq!(event.to_string(), "lookup { path: a/b, found: false }");

        let event = NamingEvent::Unbind {
            path: "a".into(),
            found: true,
        };
        assert_eq!(event.to_string(), "unbind { path: a, found: true }");

        let event = NamingEvent::CreateDirectory { path: "x/y".into() };
        assert_eq!(event.to_string(), "create_directory { path: x/y }");
    }
}
