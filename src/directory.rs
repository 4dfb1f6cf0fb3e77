//! Hierarchical naming directory.
//!
//! Objects are published under slash-separated paths. Binding auto-creates
//! any missing intermediate directories, so independent components can agree
//! on a well-known path without pre-registering their namespace.
//!
//! # Examples
//!
//! ```
//! use scoped_registry::{NamingDirectory, NamingError};
//! use std::sync::Arc;
//!
//! let directory = NamingDirectory::new();
//! directory.bind("java:comp/env/BeanManager", Arc::new(42u32)).unwrap();
//!
//! let value: Arc<u32> = directory.lookup_as("java:comp/env/BeanManager").unwrap();
//! assert_eq!(*value, 42);
//!
//! // intermediate nodes are directories, not bindings
//! assert!(matches!(
//!     directory.lookup("java:comp/env"),
//!     Err(NamingError::NotFound { .. })
//! ));
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{Instance, NamePath, NamingError, NamingEvent};

/// Type alias for the directory's tracing callback.
pub type NamingTraceCallback = dyn Fn(&NamingEvent) + Send + Sync + 'static;

/// Kind of node found at a path, as reported by [`NamingDirectory::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Directory,
    Binding,
}

enum Node {
    Directory(Children),
    Binding(Instance),
}

impl Node {
    fn kind(&self) -> NameKind {
        match self {
            Node::Directory(_) => NameKind::Directory,
            Node::Binding(_) => NameKind::Binding,
        }
    }
}

type Children = HashMap<String, Node>;

/// A tree of directories and bindings behind a read/write lock.
///
/// Mutations (`bind`, `unbind`, `create_directory`) are serialized by the
/// write lock. Reads (`lookup`, `list`, `contains`) share the read lock and
/// only ever see fully linked nodes.
pub struct NamingDirectory {
    root: RwLock<Children>,
    trace: Mutex<Option<Arc<NamingTraceCallback>>>,
}

impl NamingDirectory {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    pub fn set_trace_callback(&self, callback: impl Fn(&NamingEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: impl FnOnce() -> NamingEvent) {
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
    // Tree access
    // ---------------------------------------------------------------------------------------------

    fn read_root(&self) -> RwLockReadGuard<'_, Children> {
        self.root.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_root(&self) -> RwLockWriteGuard<'_, Children> {
        self.root.write().unwrap_or_else(|p| p.into_inner())
    }

    // ---------------------------------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------------------------------

    /// Binds `object` at `path`, creating missing intermediate directories.
    ///
    /// An existing binding at `path` is overwritten. Failures are logged and
    /// returned; nodes that existed before the call are never modified by a
    /// failed bind.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidPath`] for a malformed path
    /// - [`NamingError::StructuralConflict`] when an intermediate segment is a
    ///   binding, or the final segment is a directory
    pub fn bind(&self, path: &str, object: Instance) -> Result<(), NamingError> {
        let result = NamePath::parse(path).and_then(|name| self.bind_name(&name, object));

        match &result {
            Ok(()) => {
                tracing::debug!(path, "bound name");
                self.emit_event(|| NamingEvent::Bind {
                    path: path.to_owned(),
                });
            }
            Err(err) => tracing::error!(path, error = %err, "failed to bind name"),
        }
        result
    }

    fn bind_name(&self, name: &NamePath, object: Instance) -> Result<(), NamingError> {
        let (parents, leaf) = name.split_last();

        let mut root = self.write_root();
        let directory = descend_or_create(&mut root, name, parents)?;

        match directory.get_mut(leaf) {
            Some(Node::Binding(existing)) => *existing = object,
            Some(Node::Directory(_)) => return Err(conflict(name, leaf)),
            None => {
                directory.insert(leaf.to_owned(), Node::Binding(object));
            }
        }
        Ok(())
    }

    /// Resolves `path` to its bound object.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidPath`] for a malformed path
    /// - [`NamingError::NotFound`] if a segment is missing, an intermediate
    ///   segment is a binding, or `path` names a directory
    pub fn lookup(&self, path: &str) -> Result<Instance, NamingError> {
        let name = NamePath::parse(path)?;

        let found = {
            let root = self.read_root();
            match resolve(&root, name.segments()) {
                Some(Node::Binding(object)) => Some(Arc::clone(object)),
                _ => None,
            }
        };

        tracing::trace!(path, found = found.is_some(), "name lookup");
        self.emit_event(|| NamingEvent::Lookup {
            path: path.to_owned(),
            found: found.is_some(),
        });

        found.ok_or_else(|| NamingError::NotFound {
            path: path.to_owned(),
        })
    }

    /// [`lookup`](Self::lookup) followed by a checked downcast to `T`.
    ///
    /// # Errors
    ///
    /// Everything `lookup` returns, plus [`NamingError::TypeMismatch`] when the
    /// bound object is not a `T`.
    pub fn lookup_as<T>(&self, path: &str) -> Result<Arc<T>, NamingError>
    where
        T: Send + Sync + 'static,
    {
        self.lookup(path)?
            .downcast::<T>()
            .map_err(|_| NamingError::TypeMismatch {
                path: path.to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Removes the binding or directory (with its subtree) at `path`.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidPath`] for a malformed path
    /// - [`NamingError::NotFound`] if nothing exists at `path`
    pub fn unbind(&self, path: &str) -> Result<(), NamingError> {
        let name = NamePath::parse(path)?;
        let (parents, leaf) = name.split_last();

        let removed = {
            let mut root = self.write_root();
            resolve_directory_mut(&mut root, parents)
                .and_then(|directory| directory.remove(leaf))
                .is_some()
        };

        self.emit_event(|| NamingEvent::Unbind {
            path: path.to_owned(),
            found: removed,
        });

        if removed {
            tracing::debug!(path, "unbound name");
            Ok(())
        } else {
            Err(NamingError::NotFound {
                path: path.to_owned(),
            })
        }
    }

    /// Ensures a directory exists at `path`, creating parents as needed.
    ///
    /// Succeeds without change if the directory already exists.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidPath`] for a malformed path
    /// - [`NamingError::StructuralConflict`] if any segment is a binding
    pub fn create_directory(&self, path: &str) -> Result<(), NamingError> {
        let name = NamePath::parse(path)?;
        {
            let mut root = self.write_root();
            descend_or_create(&mut root, &name, name.segments())?;
        }

        tracing::debug!(path, "created directory");
        self.emit_event(|| NamingEvent::CreateDirectory {
            path: path.to_owned(),
        });
        Ok(())
    }

    /// Lists the children of the directory at `path`, sorted by name.
    ///
    /// # Errors
    ///
    /// - [`NamingError::InvalidPath`] for a malformed path
    /// - [`NamingError::NotFound`] if `path` does not name a directory
    pub fn list(&self, path: &str) -> Result<Vec<(String, NameKind)>, NamingError> {
        let name = NamePath::parse(path)?;
        let root = self.read_root();
        match resolve(&root, name.segments()) {
            Some(Node::Directory(children)) => Ok(sorted_entries(children)),
            _ => Err(NamingError::NotFound {
                path: path.to_owned(),
            }),
        }
    }

    /// Lists the top-level names, sorted.
    pub fn list_root(&self) -> Vec<(String, NameKind)> {
        sorted_entries(&self.read_root())
    }

    /// Whether anything (binding or directory) exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        let Ok(name) = NamePath::parse(path) else {
            return false;
        };
        let root = self.read_root();
        resolve(&root, name.segments()).is_some()
    }
}

impl Default for NamingDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NamingDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingDirectory")
            .field("root", &self.list_root())
            .finish_non_exhaustive()
    }
}

fn conflict(name: &NamePath, segment: &str) -> NamingError {
    NamingError::StructuralConflict {
        path: name.to_string(),
        segment: segment.to_owned(),
    }
}

/// Walks `segments` from `directory`, creating missing directories.
///
/// Fails at the first segment occupied by a binding. Directories created
/// before that point stay in place.
fn descend_or_create<'a>(
    mut directory: &'a mut Children,
    name: &NamePath,
    segments: &[String],
) -> Result<&'a mut Children, NamingError> {
    for segment in segments {
        let node = directory
            .entry(segment.clone())
            .or_insert_with(|| Node::Directory(HashMap::new()));
        directory = match node {
            Node::Directory(children) => children,
            Node::Binding(_) => return Err(conflict(name, segment)),
        };
    }
    Ok(directory)
}

fn resolve<'a>(root: &'a Children, segments: &[String]) -> Option<&'a Node> {
    let (first, rest) = segments.split_first()?;
    let mut node = root.get(first)?;
    for segment in rest {
        node = match node {
            Node::Directory(children) => children.get(segment)?,
            Node::Binding(_) => return None,
        };
    }
    Some(node)
}

fn resolve_directory_mut<'a>(
    mut directory: &'a mut Children,
    segments: &[String],
) -> Option<&'a mut Children> {
    for segment in segments {
        directory = match directory.get_mut(segment)? {
            Node::Directory(children) => children,
            Node::Binding(_) => return None,
        };
    }
    Some(directory)
}

fn sorted_entries(children: &Children) -> Vec<(String, NameKind)> {
    let mut entries: Vec<(String, NameKind)> = children
        .iter()
        .map(|(name, node)| (name.clone(), node.kind()))
        .collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    entries
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
