//! Bounded-wait exclusive access.
//!
//! Every transport interaction must hold the port exclusively, but a caller
//! that cannot get the port within its deadline should fail with
//! [`Error::LockTimeout`](crate::Error::LockTimeout) rather than block
//! forever behind a stuck peer.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{DriverResult, Error};

/// A mutex whose acquisition is bounded by a deadline.
///
/// The value lives in an `Option`: a holder takes it out, works on it through
/// the guard, and the guard's `Drop` puts it back and wakes one waiter.
#[derive(Debug)]
pub struct TimedMutex<T> {
    slot: Mutex<Option<T>>,
    available: Condvar,
}

impl<T> TimedMutex<T> {
    pub fn new(value: T) -> Self {
        TimedMutex {
            slot: Mutex::new(Some(value)),
            available: Condvar::new(),
        }
    }

    /// Acquire exclusive access, waiting at most `timeout`.
    pub fn acquire(&self, timeout: Duration) -> DriverResult<TimedGuard<'_, T>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().map_err(|_| Error::LockTimeout)?;
        loop {
            if let Some(value) = slot.take() {
                return Ok(TimedGuard { owner: self, value: Some(value) });
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::LockTimeout);
            }
            let (next, result) = self
                .available
                .wait_timeout(slot, remaining)
                .map_err(|_| Error::LockTimeout)?;
            slot = next;
            if result.timed_out() && slot.is_none() {
                return Err(Error::LockTimeout);
            }
        }
    }
}

/// Guard returned by [`TimedMutex::acquire`]; releases on drop.
#[derive(Debug)]
pub struct TimedGuard<'a, T> {
    owner: &'a TimedMutex<T>,
    value: Option<T>,
}

impl<T> std::ops::Deref for TimedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_ref().expect("guard holds the value until drop")
    }
}

impl<T> std::ops::DerefMut for TimedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().expect("guard holds the value until drop")
    }
}

impl<T> Drop for TimedGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.owner.slot.lock() {
            *slot = self.value.take();
            self.owner.available.notify_one();
        }
    }
}
