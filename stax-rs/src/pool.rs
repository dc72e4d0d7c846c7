//! Bounded pool of reusable factories.
//!
//! The pool never blocks: borrowing from an empty pool creates a fresh
//! factory and releasing into a full pool drops the factory. Several threads
//! may borrow and release concurrently.

use std::fmt;
use std::ops::Deref;

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use log::debug;

use crate::constants::MIN_POOL_CAPACITY;

/// Default pool capacity: the number of logical CPUs, but at least
/// [`MIN_POOL_CAPACITY`].
pub fn default_pool_capacity() -> usize {
    num_cpus::get().max(MIN_POOL_CAPACITY)
}

/// A bounded, non-blocking pool of factories.
pub struct FactoryPool<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> FactoryPool<T> {
    /// Creates an empty pool holding at most `capacity` factories (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = async_channel::bounded(capacity);
        FactoryPool { tx, rx, capacity }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(default_pool_capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of factories currently pooled.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Takes a pooled factory, or creates one with `make` if none is pooled.
    pub fn borrow_or<F: FnOnce() -> T>(&self, make: F) -> T {
        match self.rx.try_recv() {
            Ok(factory) => factory,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => {
                debug!("Factory pool empty, creating a new factory");
                make()
            }
        }
    }

    /// Offers a factory back to the pool. Returns `false` if the pool is
    /// full, in which case the factory is dropped.
    pub fn release(&self, factory: T) -> bool {
        match self.tx.try_send(factory) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Lends a factory for the lifetime of the returned guard.
    ///
    /// An `injected` factory is lent as is and never enters the pool.
    /// Otherwise a pooled (or freshly made) factory is lent and released when
    /// the guard is dropped.
    pub fn lease<'a, F: FnOnce() -> T>(&'a self, injected: Option<&'a T>, make: F) -> Lease<'a, T> {
        let slot = match injected {
            Some(factory) => Slot::Injected(factory),
            None => Slot::Pooled(Some(self.borrow_or(make))),
        };
        Lease { pool: self, slot }
    }
}

impl<T> Default for FactoryPool<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<T> fmt::Debug for FactoryPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryPool")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

enum Slot<'a, T> {
    Pooled(Option<T>),
    Injected(&'a T),
}

/// A factory lent out by [`FactoryPool::lease`].
pub struct Lease<'a, T> {
    pool: &'a FactoryPool<T>,
    slot: Slot<'a, T>,
}

impl<T> Lease<'_, T> {
    /// Returns true if the lent factory is an injected one.
    pub fn is_injected(&self) -> bool {
        matches!(self.slot, Slot::Injected(_))
    }
}

impl<T> Deref for Lease<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.slot {
            Slot::Pooled(Some(factory)) => factory,
            Slot::Injected(factory) => factory,
            Slot::Pooled(None) => unreachable!("factory taken before the lease was dropped"),
        }
    }
}

impl<T> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        if let Slot::Pooled(factory) = &mut self.slot {
            if let Some(factory) = factory.take() {
                self.pool.release(factory);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_default_capacity() {
        assert!(default_pool_capacity() >= MIN_POOL_CAPACITY);
        assert!(default_pool_capacity() >= num_cpus::get());
        assert_eq!(FactoryPool::<u32>::default().capacity(), default_pool_capacity());
    }

    #[test]
    fn test_borrow_from_empty_pool_creates() {
        let pool = FactoryPool::new(2);
        assert_eq!(pool.borrow_or(|| 7), 7);
        assert!(pool.release(8));
        assert_eq!(pool.borrow_or(|| 7), 8);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_release_never_exceeds_capacity() {
        let pool = FactoryPool::new(3);
        let accepted = (0..10).filter(|i| pool.release(*i)).count();
        assert_eq!(accepted, 3);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let pool = FactoryPool::new(0);
        assert_eq!(pool.capacity(), 1);
        assert!(pool.release("a"));
        assert!(!pool.release("b"));
    }

    #[test]
    fn test_lease_returns_factory_on_drop() {
        let pool = FactoryPool::new(4);
        {
            let lease = pool.lease(None, || String::from("fresh"));
            assert_eq!(lease.as_str(), "fresh");
            assert!(!lease.is_injected());
            assert!(pool.is_empty());
        }
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_lease_releases_on_early_return() {
        fn fails(pool: &FactoryPool<u8>) -> Result<(), String> {
            let _lease = pool.lease(None, || 1);
            let _n: u8 = "boom".parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
            Ok(())
        }
        let pool = FactoryPool::new(4);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_injected_factory_is_never_pooled() {
        let pool = FactoryPool::new(4);
        let injected = String::from("mine");
        for _ in 0..5 {
            let lease = pool.lease(Some(&injected), || String::from("pooled"));
            assert_eq!(&*lease, "mine");
            assert!(lease.is_injected());
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_concurrent_use_stays_bounded() {
        let pool = Arc::new(FactoryPool::new(4));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let lease = pool.lease(None, || i);
                        assert!(*lease < 8);
                        assert!(pool.len() <= pool.capacity());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.len() <= 4);
    }
}
