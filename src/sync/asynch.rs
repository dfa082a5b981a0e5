//! Async/await support for transmit hooks.
//!
//! [`AsyncTxHooks`] plugs into a queue as its [`TxHooks`] (and, for a guest
//! queue, as the host's [`XnetWake`]). Producers await
//! [`wait_resume`](AsyncTxHooks::wait_resume) after a `Busy`; the host
//! side awaits [`wait_xnet`](AsyncTxHooks::wait_xnet) before draining the
//! guest ring.

use core::future::{Future, poll_fn};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::task::{Poll, Waker};

use super::primitives::CriticalSectionCell;
use crate::driver::{TxHooks, XnetWake};

/// Interrupt-safe storage for one waker.
pub struct WakerSlot {
    waker: CriticalSectionCell<Option<Waker>>,
}

impl WakerSlot {
    /// Create an empty slot (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            waker: CriticalSectionCell::new(None),
        }
    }

    /// Store `waker`, replacing any previous one that would wake a different task.
    pub fn register(&self, waker: &Waker) {
        self.waker.with(|slot| match slot {
            Some(existing) if existing.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        });
    }

    /// Wake and clear the stored waker, if any.
    pub fn wake(&self) {
        if let Some(w) = self.waker.replace(None) {
            w.wake();
        }
    }

    /// Check if a waker is stored
    pub fn is_registered(&self) -> bool {
        self.waker.with(|slot| slot.is_some())
    }
}

impl Default for WakerSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Waker-backed transmit hooks for one queue.
pub struct AsyncTxHooks {
    suspended: AtomicBool,
    resumes: AtomicU32,
    xnet_events: AtomicU32,
    resume_waker: WakerSlot,
    xnet_waker: WakerSlot,
}

impl AsyncTxHooks {
    /// Create hooks with no pending events.
    pub const fn new() -> Self {
        Self {
            suspended: AtomicBool::new(false),
            resumes: AtomicU32::new(0),
            xnet_events: AtomicU32::new(0),
            resume_waker: WakerSlot::new(),
            xnet_waker: WakerSlot::new(),
        }
    }

    /// Check if the queue is currently suspended
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    /// Resolve once the queue is not suspended.
    pub fn wait_resume(&self) -> impl Future<Output = ()> + '_ {
        poll_fn(move |cx| {
            if !self.is_suspended() {
                return Poll::Ready(());
            }
            self.resume_waker.register(cx.waker());
            if self.is_suspended() {
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
    }

    /// Resolve on the next wake from the guest queue.
    ///
    /// Wakes raised before this call are not replayed; check the guest ring
    /// before awaiting.
    pub fn wait_xnet(&self) -> impl Future<Output = ()> + '_ {
        let seen = self.xnet_events.load(Ordering::Acquire);
        poll_fn(move |cx| {
            if self.xnet_events.load(Ordering::Acquire) != seen {
                return Poll::Ready(());
            }
            self.xnet_waker.register(cx.waker());
            if self.xnet_events.load(Ordering::Acquire) != seen {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
    }

    /// Number of resume events seen
    pub fn resumes(&self) -> u32 {
        self.resumes.load(Ordering::Relaxed)
    }
}

impl Default for AsyncTxHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl TxHooks for AsyncTxHooks {
    fn tx_suspend(&self, _queue: u8) {
        self.suspended.store(true, Ordering::Release);
    }

    fn tx_resume(&self, _queue: u8) {
        self.suspended.store(false, Ordering::Release);
        self.resumes.fetch_add(1, Ordering::AcqRel);
        self.resume_waker.wake();
    }
}

impl XnetWake for AsyncTxHooks {
    fn xnet_wake(&self) {
        self.xnet_events.fetch_add(1, Ordering::AcqRel);
        self.xnet_waker.wake();
    }
}
