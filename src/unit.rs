use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UNIT: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one deployment.
///
/// The registry only compares and hashes units; it never creates them. Issue a
/// fresh handle when a deployment starts and pass it to
/// [`SingletonRegistry::evict_unit`](crate::SingletonRegistry::evict_unit)
/// when it is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsolationUnit(u64);

impl IsolationUnit {
    /// Issues a handle that is unique within this process.
    pub fn issue() -> Self {
        Self(NEXT_UNIT.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a caller-chosen id.
    ///
    /// Handles built this way may collide with ones returned by [`issue`](Self::issue);
    /// pick one scheme per registry.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IsolationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}
