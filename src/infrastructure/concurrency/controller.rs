//! Concurrency controller
//!
//! Bounds in-flight external-search and inference operations with two
//! independent counting semaphores. Acquisition waits until capacity frees
//! or the caller's deadline elapses; a bounded number of waiters per pool
//! keeps the queue from growing without limit.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Capacity pool a token is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotClass {
    Retrieval,
    Inference,
}

impl fmt::Display for SlotClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieval => write!(f, "retrieval"),
            Self::Inference => write!(f, "inference"),
        }
    }
}

/// Pool sizes and waiter bound
#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    pub retrieval_slots: usize,
    pub inference_slots: usize,
    /// Maximum requests waiting on one pool before new ones are rejected
    pub max_waiters: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            retrieval_slots: 8,
            inference_slots: 2,
            max_waiters: 64,
        }
    }
}

/// Point-in-time view of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUsage {
    pub class: SlotClass,
    pub capacity: usize,
    pub available: usize,
    pub waiting: usize,
}

/// One unit of capacity. Released when dropped.
#[derive(Debug)]
pub struct InFlightToken {
    class: SlotClass,
    _permit: OwnedSemaphorePermit,
}

impl InFlightToken {
    pub fn class(&self) -> SlotClass {
        self.class
    }
}

#[derive(Debug)]
struct SlotPool {
    semaphore: Arc<Semaphore>,
    size: usize,
    waiters: AtomicUsize,
}

impl SlotPool {
    fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
            waiters: AtomicUsize::new(0),
        }
    }
}

/// Decrements the waiter count on every exit path, cancellation included
struct WaiterGuard<'a>(&'a AtomicUsize);

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared controller for retrieval and inference capacity
#[derive(Debug)]
pub struct ConcurrencyController {
    retrieval: SlotPool,
    inference: SlotPool,
    max_waiters: usize,
}

impl ConcurrencyController {
    pub fn new(config: ConcurrencyConfig) -> Result<Self, DomainError> {
        if config.retrieval_slots == 0 || config.inference_slots == 0 {
            return Err(DomainError::configuration(
                "Slot counts must be greater than zero",
            ));
        }

        Ok(Self {
            retrieval: SlotPool::new(config.retrieval_slots),
            inference: SlotPool::new(config.inference_slots),
            max_waiters: config.max_waiters,
        })
    }

    fn pool(&self, class: SlotClass) -> &SlotPool {
        match class {
            SlotClass::Retrieval => &self.retrieval,
            SlotClass::Inference => &self.inference,
        }
    }

    /// Acquire one slot of `class`, failing with `Overloaded` if none frees
    /// up before `deadline` or the waiter queue is full
    pub async fn acquire(
        &self,
        class: SlotClass,
        deadline: Instant,
    ) -> Result<InFlightToken, DomainError> {
        let pool = self.pool(class);

        if let Ok(permit) = pool.semaphore.clone().try_acquire_owned() {
            return Ok(InFlightToken {
                class,
                _permit: permit,
            });
        }

        if pool.waiters.fetch_add(1, Ordering::SeqCst) >= self.max_waiters {
            pool.waiters.fetch_sub(1, Ordering::SeqCst);
            warn!(slot_class = %class, "Slot queue full, rejecting request");
            return Err(DomainError::overloaded(format!(
                "Too many requests waiting for {} capacity",
                class
            )));
        }

        let _waiter = WaiterGuard(&pool.waiters);
        debug!(slot_class = %class, "Waiting for capacity");

        match timeout_at(deadline, pool.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(InFlightToken {
                class,
                _permit: permit,
            }),
            Ok(Err(_)) => Err(DomainError::internal(format!(
                "{} capacity pool is closed",
                class
            ))),
            Err(_) => Err(DomainError::overloaded(format!(
                "No {} capacity available before deadline",
                class
            ))),
        }
    }

    /// Return a token's capacity to its pool
    pub fn release(&self, token: InFlightToken) {
        debug!(slot_class = %token.class(), "Releasing slot");
        drop(token);
    }

    /// Slots currently free in the pool
    pub fn available(&self, class: SlotClass) -> usize {
        self.pool(class).semaphore.available_permits()
    }

    /// Configured size of the pool
    pub fn capacity(&self, class: SlotClass) -> usize {
        self.pool(class).size
    }

    /// Requests currently waiting on the pool
    pub fn waiting(&self, class: SlotClass) -> usize {
        self.pool(class).waiters.load(Ordering::SeqCst)
    }

    pub fn usage(&self, class: SlotClass) -> SlotUsage {
        SlotUsage {
            class,
            capacity: self.capacity(class),
            available: self.available(class),
            waiting: self.waiting(class),
        }
    }
}
