//! Admission gate serializing producers on a queue.
//!
//! A queue uses exactly one discipline for its lifetime, picked when it is
//! built: a spin mutex when an upper layer can be suspended through hooks,
//! or a single-permit semaphore with a bounded wait otherwise.

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;

use super::config::RetryPolicy;
use super::error::{IoError, IoResult};

/// Which admission discipline a queue uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateKind {
    /// Unbounded spin mutex; producers can be suspended by hooks
    Mutex,
    /// Bounded-wait semaphore; full rings are reported to the caller
    Semaphore,
}

/// Counting semaphore with a bounded acquire.
pub struct Semaphore {
    permits: AtomicU32,
}

impl Semaphore {
    /// Create a semaphore holding `permits` permits.
    pub const fn new(permits: u32) -> Self {
        Self {
            permits: AtomicU32::new(permits),
        }
    }

    /// Take a permit without waiting.
    pub fn try_acquire(&self) -> bool {
        self.permits
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |p| p.checked_sub(1))
            .is_ok()
    }

    /// Return a permit.
    pub fn release(&self) {
        self.permits.fetch_add(1, Ordering::Release);
    }

    /// Permits currently available
    pub fn available(&self) -> u32 {
        self.permits.load(Ordering::Relaxed)
    }

    /// Take a permit, sleeping `policy.step_us` between attempts.
    ///
    /// Fails with [`IoError::Timeout`] once `policy.timeout_us` has elapsed.
    pub fn acquire_within<D: DelayNs>(&self, policy: RetryPolicy, delay: &mut D) -> IoResult<()> {
        let mut elapsed = 0u32;
        loop {
            if self.try_acquire() {
                return Ok(());
            }
            if elapsed >= policy.timeout_us {
                return Err(IoError::Timeout);
            }
            delay.delay_us(policy.step_us);
            elapsed = elapsed.saturating_add(policy.step_us);
        }
    }
}

/// The admission gate of one queue.
pub enum AdmissionGate {
    /// Spin mutex discipline
    Mutex(spin::Mutex<()>),
    /// Single-permit semaphore discipline
    Semaphore(Semaphore),
}

impl AdmissionGate {
    /// Create a gate of the given kind.
    pub const fn new(kind: GateKind) -> Self {
        match kind {
            GateKind::Mutex => AdmissionGate::Mutex(spin::Mutex::new(())),
            GateKind::Semaphore => AdmissionGate::Semaphore(Semaphore::new(1)),
        }
    }

    /// Discipline of this gate
    pub const fn kind(&self) -> GateKind {
        match self {
            AdmissionGate::Mutex(_) => GateKind::Mutex,
            AdmissionGate::Semaphore(_) => GateKind::Semaphore,
        }
    }

    /// Enter the gate. The returned guard leaves it on drop.
    ///
    /// The mutex discipline spins without bound and ignores `policy`.
    pub fn enter<D: DelayNs>(&self, policy: RetryPolicy, delay: &mut D) -> IoResult<GateGuard<'_>> {
        match self {
            AdmissionGate::Mutex(m) => Ok(GateGuard::Mutex(m.lock())),
            AdmissionGate::Semaphore(s) => {
                s.acquire_within(policy, delay)?;
                Ok(GateGuard::Semaphore(s))
            }
        }
    }
}

/// Proof of admission; dropping it releases the gate.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub enum GateGuard<'a> {
    /// Held spin mutex
    Mutex(spin::MutexGuard<'a, ()>),
    /// Held semaphore permit
    Semaphore(&'a Semaphore),
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        if let GateGuard::Semaphore(s) = self {
            s.release();
        }
    }
}
