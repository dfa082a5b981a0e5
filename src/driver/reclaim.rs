//! Completion reclaim.
//!
//! Walks the ring from `dirt` towards `curr`, handing finished slots back to
//! the buffer manager. Only one reclaim pass runs at a time; the `BUSY`
//! status flag marks the owner.

use core::sync::atomic::Ordering;

use super::config::DeviceRole;
use super::error::{DmaError, DmaResult};
use super::queue::{QueueStatus, TxQueue};
use crate::hal::TxBufferManager;
use crate::internal::dma::DescriptorRing;

impl<B: TxBufferManager, const N: usize> TxQueue<'_, B, N> {
    /// Reclaim up to `budget` completed descriptors.
    ///
    /// Returns the number reclaimed, or 0 immediately if another pass is
    /// running. A slot is complete when the hardware has set its done bit;
    /// on a guest (`Vnet`) queue, when the host has cleared its byte count.
    ///
    /// A done descriptor reporting zero transferred bytes stops the walk with
    /// [`DmaError::Internal`]; slots reclaimed before it stay reclaimed.
    pub fn tx_ring_clean(&self, budget: usize) -> DmaResult<usize> {
        if !self.try_set_busy() {
            return Ok(0);
        }

        let result = self.reclaim_locked(budget.min(N - 1));
        self.clear_status(QueueStatus::BUSY);

        if matches!(result, Ok(n) if n > 0) {
            self.chain_kick();
            self.try_xon();
        }
        result
    }

    fn reclaim_locked(&self, budget: usize) -> DmaResult<usize> {
        let queue = self.config.queue_id;
        let guest_side = self.config.role == DeviceRole::Vnet;
        let curr = self.curr.load(Ordering::Acquire);
        let mut dirt = self.dirt.load(Ordering::Acquire);
        let mut done = 0;

        while dirt != curr && done < budget {
            let desc = self.ring.get(dirt);
            if guest_side {
                if !desc.is_empty() {
                    break;
                }
            } else {
                if !desc.is_done() {
                    break;
                }
                if desc.transferred() == 0 {
                    log::error!("txq {}: slot {} completed with zero length", queue, dirt);
                    return Err(DmaError::Internal);
                }
                if desc.has_error() {
                    self.stats.with(|s| s.errors += 1);
                    log::warn!("txq {}: slot {} completed with error", queue, dirt);
                }
            }

            if !self.pulled[dirt].swap(false, Ordering::AcqRel) {
                self.bufs.tx_buf_free(queue, dirt);
            }
            desc.reset();
            dirt = DescriptorRing::<N>::next(dirt);
            self.dirt.store(dirt, Ordering::Release);
            done += 1;
        }

        Ok(done)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::driver::config::QueueConfig;
    use crate::driver::error::DmaError;
    use crate::driver::queue::{QueueStatus, TxQueue};
    use crate::testing::{CaptureLogger, MockBuffers, MockChannel, MockDelay, complete_pending};

    fn sent<'a>(
        chan: &'a MockChannel,
        bufs: &'a MockBuffers,
        count: u64,
    ) -> TxQueue<'a, MockBuffers, 8> {
        let q = TxQueue::new(QueueConfig::for_ring(8).with_queue_id(4), chan, bufs).unwrap();
        q.start().unwrap();
        let mut delay = MockDelay::new();
        for i in 0..count {
            q.transmit(Some(&MockBuffers::packet(0x1000 * (i + 1), 100)), &mut delay)
                .unwrap();
        }
        q
    }

    #[test]
    fn nothing_done_reclaims_nothing() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 3);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(0));
        assert_eq!(q.dirt(), 0);
    }

    #[test]
    fn reclaims_completed_prefix_in_order() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 4);

        complete_pending(&q, 2);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(2));
        assert_eq!(q.dirt(), 2);
        assert_eq!(bufs.freed(), [(4, 0), (4, 1)]);
        assert!(q.descriptor(0).is_empty());
        assert!(!q.status().contains(QueueStatus::BUSY));
    }

    #[test]
    fn budget_limits_pass() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 4);

        complete_pending(&q, 4);
        assert_eq!(q.tx_ring_clean(1), Ok(1));
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(3));
        assert_eq!(q.pending_count(), 0);
    }

    #[test]
    fn concurrent_pass_is_skipped() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 2);
        complete_pending(&q, 2);

        assert!(q.try_set_busy());
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(0));
        q.clear_status(QueueStatus::BUSY);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(2));
    }

    #[test]
    fn zero_length_completion_is_internal() {
        let logger = CaptureLogger::install();
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 3);

        q.descriptor(0).mark_done(100, false);
        q.descriptor(1).mark_done(0, false);
        assert_eq!(q.tx_ring_clean(usize::MAX), Err(DmaError::Internal));
        assert_eq!(q.dirt(), 1, "slot before the bad one stays reclaimed");
        assert!(!q.status().contains(QueueStatus::BUSY));
        assert!(logger.contains("completed with zero length"));
    }

    #[test]
    fn hardware_error_is_counted() {
        let chan = MockChannel::new();
        let bufs = MockBuffers::new();
        let q = sent(&chan, &bufs, 1);

        q.descriptor(0).mark_done(100, true);
        assert_eq!(q.tx_ring_clean(usize::MAX), Ok(1));
        assert_eq!(q.stats().errors, 1);
        assert_eq!(bufs.freed().len(), 1);
    }
}
