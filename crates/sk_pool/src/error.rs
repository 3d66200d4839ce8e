use sk_core::Poolable;
use std::fmt;

/// Error type for pool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError<K> {
    /// Every entity of this key is in use and the pool may not grow.
    Exhausted(K),
    /// No pool was registered for this key.
    UnregisteredKey(K),
    /// The key already has a pool; keys are immutable after registration.
    DuplicateKey(K),
}

impl<K> PoolError<K> {
    pub fn key(&self) -> &K {
        match self {
            Self::Exhausted(k) | Self::UnregisteredKey(k) | Self::DuplicateKey(k) => k,
        }
    }
}

impl<K: fmt::Debug> fmt::Display for PoolError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted(k) => write!(f, "pool for {:?} is exhausted", k),
            Self::UnregisteredKey(k) => write!(f, "no pool registered for {:?}", k),
            Self::DuplicateKey(k) => write!(f, "a pool for {:?} is already registered", k),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for PoolError<K> {}

/// A release the pool refused. The entity is handed back to the caller.
pub struct ReturnRejected<T: Poolable> {
    pub entity: T,
    pub error: PoolError<T::Key>,
}

impl<T: Poolable> ReturnRejected<T> {
    /// Take the entity back, dropping the error.
    pub fn into_entity(self) -> T {
        self.entity
    }
}

impl<T: Poolable> fmt::Debug for ReturnRejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnRejected")
            .field("key", &self.entity.key())
            .field("error", &self.error)
            .finish()
    }
}

impl<T: Poolable> fmt::Display for ReturnRejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return rejected: {}", self.error)
    }
}

impl<T: Poolable> std::error::Error for ReturnRejected<T> {}
