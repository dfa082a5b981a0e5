//! Virtual/host network shim.
//!
//! A guest (`Vnet`) queue stages packets in its own ring and wakes the
//! paired host (`Hnet`) queue, which pulls those descriptors, oldest first,
//! into the real ring by calling [`transmit`](TxQueue::transmit) with no
//! packet.
//!
//! A guest slot is ready while its byte count is non-zero. Pulling copies
//! address, length and packet flags, then clears the byte count; the guest
//! queue's reclaim treats the cleared count as completion.

use core::sync::atomic::{AtomicUsize, Ordering};

use embedded_hal::delay::DelayNs;

use super::error::{DmaError, DmaResult, Error, Result};
use super::queue::TxQueue;
use crate::hal::TxBufferManager;
use crate::internal::dma::{DescFlags, TxDescriptor};

/// Host-side view of a guest queue's staged descriptors.
pub struct GuestRing<'a> {
    descs: &'a [TxDescriptor],
    next: AtomicUsize,
}

impl<'a> GuestRing<'a> {
    /// Wrap a guest ring, starting the read index at slot 0.
    pub const fn new(descs: &'a [TxDescriptor]) -> Self {
        Self {
            descs,
            next: AtomicUsize::new(0),
        }
    }

    /// Guest slot the next pull will read
    pub fn next_index(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Move the read index back to slot 0, where a restarted guest stages
    /// its first packet.
    pub fn rewind(&self) {
        self.next.store(0, Ordering::Relaxed);
    }

    /// Check if the oldest guest slot holds a staged packet
    pub fn has_staged(&self) -> bool {
        self.descs
            .get(self.next_index())
            .is_some_and(|d| !d.is_empty())
    }

    /// Move the oldest staged guest descriptor into `dst`.
    ///
    /// Returns the byte count copied, or [`DmaError::Empty`] if nothing is
    /// staged. Callers serialize on the host queue's admission gate.
    pub fn fetch_into(&self, dst: &TxDescriptor, mode: DescFlags) -> DmaResult<u16> {
        let idx = self.next_index();
        let src = self.descs.get(idx).ok_or(DmaError::Empty)?;
        if src.is_empty() {
            return Err(DmaError::Empty);
        }

        let len = dst.copy_from(src, mode);
        src.clear_len();
        self.next.store((idx + 1) % self.descs.len(), Ordering::Relaxed);
        Ok(len)
    }
}

impl<B: TxBufferManager, const N: usize> TxQueue<'_, B, N> {
    /// Pull every staged guest descriptor onto the hardware ring.
    ///
    /// Stops at the first empty guest slot and returns the number pulled.
    /// Other errors from [`transmit`](Self::transmit) are returned as is.
    pub fn drain_guest<D: DelayNs>(&self, delay: &mut D) -> Result<usize> {
        let mut pulled = 0;
        loop {
            match self.transmit(None, delay) {
                Ok(()) => pulled += 1,
                Err(Error::Dma(DmaError::Empty)) => return Ok(pulled),
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if the paired guest ring has a descriptor ready to pull
    pub fn guest_pending(&self) -> bool {
        self.guest.as_ref().is_some_and(GuestRing::has_staged)
    }
}

// =============================================================================
// Tests
// =============================================================================
