use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Design;

/// A [`Design`] shared across threads.
///
/// Mutation takes the write lock, so it is serialised; validation,
/// counting, export and rendering take the read lock and may run
/// concurrently with each other.
#[derive(Debug, Clone, Default)]
pub struct SharedDesign {
    inner: Arc<RwLock<Design>>,
}

impl SharedDesign {
    pub fn new(design: Design) -> Self {
        Self {
            inner: Arc::new(RwLock::new(design)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Design> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Design> {
        self.inner.write()
    }

    /// Run `f` with shared access.
    pub fn with<R>(&self, f: impl FnOnce(&Design) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access.
    pub fn update<R>(&self, f: impl FnOnce(&mut Design) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Clone the current state out of the lock.
    pub fn snapshot(&self) -> Design {
        self.inner.read().clone()
    }
}

impl From<Design> for SharedDesign {
    fn from(design: Design) -> Self {
        Self::new(design)
    }
}
