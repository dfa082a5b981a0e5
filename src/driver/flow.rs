//! Transmit flow control.
//!
//! This module extends [`TxQueue`] with the XOFF/XON state machine:
//!
//! 1. `ring_check` enters XOFF when the ring is full or the link is paused
//!    and tells the upper layer through [`TxHooks::tx_suspend`]
//! 2. Reclaim frees slots; once more than `free_thresh` are free (and the
//!    link is not paused) `try_xon` leaves XOFF and calls
//!    [`TxHooks::tx_resume`]
//!
//! Both transitions are decided inside a critical section. The lockless
//! peeks only look at ring occupancy, never at XOFF itself, so a reclaim
//! racing with a producer cannot lose a wakeup.
//!
//! Chain-mode restarts also live here since they share the same lock.

use core::sync::atomic::Ordering;

use super::error::{IoError, IoResult};
use super::queue::{QueueStatus, TxQueue};
use crate::hal::TxBufferManager;
use crate::internal::dma::DescriptorRing;

/// Upper-layer transmit hooks.
///
/// Registering hooks on a queue selects the mutex admission gate: a producer
/// that sees `Busy` can park until `tx_resume` instead of failing.
pub trait TxHooks: Sync {
    /// The queue entered XOFF; stop offering packets.
    fn tx_suspend(&self, queue: u8);

    /// The queue left XOFF; packets may be offered again.
    fn tx_resume(&self, queue: u8);
}

/// Wake hook of a host queue paired with a guest queue.
pub trait XnetWake: Sync {
    /// Staged descriptors are waiting to be pulled.
    fn xnet_wake(&self);
}

impl<B: TxBufferManager, const N: usize> TxQueue<'_, B, N> {
    /// Check whether another packet may be queued.
    ///
    /// Returns [`IoError::Busy`] when the ring is full or the link is paused
    /// with hooks registered; in both cases XOFF is set and `xoffs` counted.
    /// Calling it again without an intervening enqueue or reclaim yields the
    /// same result.
    pub fn ring_check(&self) -> IoResult<()> {
        let queue = self.config.queue_id;

        if self.link_paused.load(Ordering::Acquire) {
            match self.hooks {
                Some(hooks) => {
                    critical_section::with(|_| {
                        self.set_status(QueueStatus::XOFF);
                        self.stats.with(|s| s.xoffs += 1);
                        hooks.tx_suspend(queue);
                    });
                    log::debug!("txq {}: xoff, link paused", queue);
                    return Err(IoError::Busy);
                }
                None => self.stats.with(|s| s.xoffs += 1),
            }
        }

        if self.unused_count() != 0 {
            return Ok(());
        }

        let full = critical_section::with(|_| {
            if self.unused_count() != 0 {
                return false;
            }
            self.set_status(QueueStatus::XOFF);
            self.stats.with(|s| s.xoffs += 1);
            if let Some(hooks) = self.hooks {
                hooks.tx_suspend(queue);
            }
            true
        });

        if full {
            log::debug!("txq {}: xoff, ring full", queue);
            Err(IoError::Busy)
        } else {
            Ok(())
        }
    }

    /// Leave XOFF if enough slots are free and the link is not paused.
    ///
    /// Returns true if this call performed the transition.
    pub fn try_xon(&self) -> bool {
        // Only occupancy is peeked here. XOFF is read under the lock.
        if self.unused_count() <= self.config.free_thresh {
            return false;
        }

        let resumed = critical_section::with(|_| {
            if !self.xon_ready() {
                return false;
            }
            self.clear_status(QueueStatus::XOFF);
            self.stats.with(|s| s.xons += 1);
            true
        });

        if resumed {
            log::debug!(
                "txq {}: xon, {} slots free",
                self.config.queue_id,
                self.unused_count()
            );
            if let Some(hooks) = self.hooks {
                hooks.tx_resume(self.config.queue_id);
            }
        }
        resumed
    }

    fn xon_ready(&self) -> bool {
        self.is_xoff()
            && !self.link_paused.load(Ordering::Acquire)
            && self.unused_count() > self.config.free_thresh
    }

    /// Signal a link-level pause. The next `ring_check` reports it.
    pub fn pause_link(&self) {
        self.link_paused.store(true, Ordering::Release);
        log::warn!("txq {}: link paused", self.config.queue_id);
    }

    /// Clear a link-level pause and resume transmission if possible.
    pub fn resume_link(&self) -> bool {
        self.link_paused.store(false, Ordering::Release);
        self.try_xon()
    }

    /// Check if a link-level pause is signalled
    pub fn is_link_paused(&self) -> bool {
        self.link_paused.load(Ordering::Acquire)
    }

    /// Restart the chain walk once the hardware has caught up with `halt`.
    ///
    /// The continuation bit of the last new descriptor is cleared so the
    /// engine stops there, the channel is pointed at the old checkpoint and
    /// restarted, and `halt` moves to the end of the new batch. A batch never
    /// crosses the end of the descriptor array; the remainder is kicked on a
    /// later call.
    pub(crate) fn chain_kick(&self) {
        if !self.config.chain_mode {
            return;
        }

        critical_section::with(|_| {
            let halt = self.halt.load(Ordering::Acquire);
            let curr = self.curr.load(Ordering::Acquire);
            if halt == curr || self.dirt.load(Ordering::Acquire) != halt {
                return;
            }

            let end = if curr > halt { curr } else { 0 };
            let chan = self.config.chan_id;
            self.chan.stop(chan);
            self.ring.get(DescriptorRing::<N>::prev(end)).chain(false);
            self.chan.set_base(chan, self.ring.slot_addr(halt));
            self.chan.start(chan);
            self.halt.store(end, Ordering::Release);
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use std::thread;

    use crate::driver::config::QueueConfig;
    use crate::driver::error::{Error, IoError};
    use crate::driver::queue::{QueueStatus, TxQueue};
    use crate::internal::dma::DescFlags;
    use crate::testing::{
        ChanOp, MockBuffers, MockChannel, MockDelay, MockHooks, complete_pending,
    };

    fn fill<const N: usize>(q: &TxQueue<'_, MockBuffers, N>, count: usize) {
        let mut delay = MockDelay::new();
        for i in 0..count {
            let pkt = MockBuffers::packet(0x1000 + 0x100 * i as u64, 64);
            q.transmit(Some(&pkt), &mut delay).unwrap();
        }
    }

    #[test]
    fn ring_check_ok_with_room() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q: TxQueue<'_, _, 8> = TxQueue::new(QueueConfig::for_ring(8), &chan, &bufs).unwrap();
        q.start().unwrap();

        assert_eq!(q.ring_check(), Ok(()));
        assert!(!q.is_xoff());
        assert_eq!(q.stats().xoffs, 0);
    }

    #[test]
    fn ring_check_is_idempotent() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 4> = TxQueue::new(QueueConfig::for_ring(4), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();

        for _ in 0..3 {
            assert_eq!(q.ring_check(), Ok(()));
        }

        fill(&q, 3);
        for _ in 0..3 {
            assert_eq!(q.ring_check(), Err(IoError::Busy));
            assert!(q.is_xoff());
        }
    }

    #[test]
    fn last_free_slot_is_usable_then_busy() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 4> = TxQueue::new(QueueConfig::for_ring(4), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();

        fill(&q, 2);
        assert_eq!(q.unused_count(), 1);
        fill(&q, 1);
        assert_eq!(q.unused_count(), 0);
        assert_eq!(q.ring_check(), Err(IoError::Busy));
        assert!(q.is_xoff());
        assert!(hooks.suspends() >= 1);
    }

    #[test]
    fn full_ring_rejects_next_mutex_producer_with_busy() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 4> = TxQueue::new(QueueConfig::for_ring(4), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();
        fill(&q, 3);

        let mut delay = MockDelay::new();
        let pkt = MockBuffers::packet(0x9000, 64);
        assert_eq!(
            q.transmit(Some(&pkt), &mut delay),
            Err(Error::Io(IoError::Busy))
        );
        assert_eq!(q.stats().packets, 3);
        assert_eq!(q.stats().dropped, 0);
    }

    #[test]
    fn reclaim_above_threshold_resumes_upper_layer() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let config = QueueConfig::for_ring(8).with_free_thresh(2);
        let q: TxQueue<'_, _, 8> = TxQueue::new(config, &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();
        fill(&q, 7);
        assert!(q.is_xoff());

        // Two free slots is not above the threshold.
        complete_pending(&q, 2);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(2));
        assert!(q.is_xoff());
        assert_eq!(hooks.resumes(), 0);

        complete_pending(&q, 1);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(1));
        assert!(!q.is_xoff());
        assert_eq!(hooks.resumes(), 1);
        assert_eq!(q.stats().xons, 1);
    }

    #[test]
    fn reclaim_racing_xoff_decision_still_resumes() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 4> = TxQueue::new(QueueConfig::for_ring(4), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();
        fill(&q, 3);

        // A producer has seen the ring full inside the lock but has not
        // published XOFF yet; meanwhile the hardware finishes everything.
        q.clear_status(QueueStatus::XOFF);
        complete_pending(&q, 3);

        thread::scope(|s| {
            let reclaimer = critical_section::with(|_| {
                let reclaimer = s.spawn(|| q.tx_ring_clean(usize::MAX));
                while q.dirt() != 3 {
                    thread::yield_now();
                }
                q.set_status(QueueStatus::XOFF);
                reclaimer
            });
            assert_eq!(reclaimer.join().unwrap(), Ok(3));
        });

        assert!(!q.is_xoff());
        assert_eq!(hooks.resumes(), 1);
        assert_eq!(q.stats().xons, 1);
    }

    #[test]
    fn paused_link_with_hooks_suspends() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 8> = TxQueue::new(QueueConfig::for_ring(8), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();

        q.pause_link();
        assert_eq!(q.ring_check(), Err(IoError::Busy));
        assert!(q.is_xoff());
        assert_eq!(hooks.suspends(), 1);
        assert_eq!(q.stats().xoffs, 1);

        assert!(q.resume_link());
        assert!(!q.is_xoff());
        assert_eq!(hooks.resumes(), 1);
    }

    #[test]
    fn paused_link_without_hooks_only_counts() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q: TxQueue<'_, _, 8> = TxQueue::new(QueueConfig::for_ring(8), &chan, &bufs).unwrap();
        q.start().unwrap();

        q.pause_link();
        assert!(q.is_link_paused());
        assert_eq!(q.ring_check(), Ok(()));
        assert!(!q.is_xoff());
        assert_eq!(q.stats().xoffs, 1);
    }

    #[test]
    fn paused_link_blocks_xon() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let q: TxQueue<'_, _, 4> = TxQueue::new(QueueConfig::for_ring(4), &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();
        fill(&q, 3);
        q.pause_link();

        complete_pending(&q, 3);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(3));
        assert!(q.is_xoff());

        assert!(q.resume_link());
        assert!(!q.is_xoff());
    }

    #[test]
    fn chain_kick_restarts_from_checkpoint() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let config = QueueConfig::for_ring(8).with_chain_mode(true);
        let q: TxQueue<'_, _, 8> = TxQueue::new(config, &chan, &bufs).unwrap();
        q.start().unwrap();

        fill(&q, 1);
        let slot0 = q.ring.slot_addr(0);
        let slot1 = q.ring.slot_addr(1);
        assert_eq!(
            chan.ops(),
            [
                ChanOp::Stop(0),
                ChanOp::SetBase(0, slot0),
                ChanOp::Start(0),
                ChanOp::Goto(0, slot1),
            ]
        );
        assert_eq!(q.halt(), 1);
        assert!(!q.descriptor(0).is_chained());

        // Hardware still busy with slot 0: later packets accumulate.
        chan.clear();
        fill(&q, 2);
        assert_eq!(q.halt(), 1);
        assert!(!chan.ops().contains(&ChanOp::Start(0)));
        assert!(q.descriptor(1).read().desc_flags().contains(DescFlags::CHAIN));

        // Completing slot 0 lets reclaim kick the batch 1..3.
        complete_pending(&q, 1);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(1));
        assert_eq!(q.halt(), 3);
        assert!(q.descriptor(1).is_chained());
        assert!(!q.descriptor(2).is_chained());
        assert!(chan.ops().contains(&ChanOp::SetBase(0, q.ring.slot_addr(1))));
    }

    #[test]
    fn chain_batch_stops_at_array_end() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let hooks = MockHooks::new();
        let config = QueueConfig::for_ring(4).with_chain_mode(true);
        let q: TxQueue<'_, _, 4> = TxQueue::new(config, &chan, &bufs)
            .unwrap()
            .with_hooks(&hooks);
        q.start().unwrap();

        // Walk the indices to slot 2, one kicked packet at a time.
        for _ in 0..2 {
            fill(&q, 1);
            complete_pending(&q, 1);
            q.tx_ring_clean(usize::MAX).unwrap();
        }
        assert_eq!(q.halt(), 2);
        assert_eq!(q.dirt(), 2);

        // Slots 2, 3 and 0 queued; only slot 2 is kicked immediately.
        fill(&q, 3);
        assert_eq!(q.curr(), 1);
        assert_eq!(q.halt(), 3);

        // The next batch ends at the array boundary.
        complete_pending(&q, 1);
        q.tx_ring_clean(usize::MAX).unwrap();
        assert_eq!(q.halt(), 0);
        assert!(!q.descriptor(3).is_chained());
        assert!(q.descriptor(0).is_chained());

        complete_pending(&q, 1);
        q.tx_ring_clean(usize::MAX).unwrap();
        assert_eq!(q.halt(), 1);
        assert!(!q.descriptor(0).is_chained());
    }
}
