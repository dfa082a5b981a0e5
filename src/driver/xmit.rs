//! Transmit engine.

use core::sync::atomic::Ordering;

use embedded_hal::delay::DelayNs;

use super::config::DeviceRole;
use super::error::{ConfigError, DmaError, IoError, Result};
use super::gate::GateKind;
use super::queue::TxQueue;
use crate::hal::TxBufferManager;
use crate::internal::constants::MAX_HDR_PROFILE;
use crate::internal::dma::DescriptorRing;

impl<B: TxBufferManager, const N: usize> TxQueue<'_, B, N> {
    /// Queue one packet for transmission.
    ///
    /// `raw` is the packet to send. On a host (`Hnet`) queue, `None` pulls the
    /// oldest staged descriptor from the paired guest ring instead.
    ///
    /// # Errors
    ///
    /// - `Config(Unavailable)`: queue not started, or pull without a guest ring
    /// - `Config(InvalidParam)`: pull on a non-host queue, bad packet length
    /// - `Io(Timeout)`: semaphore admission wait exceeded
    /// - `Io(Busy)`: ring full or suspended; retry after resume
    /// - `Dma(ResourceExhausted)`: packet not queued (counted as dropped), or
    ///   the ring stayed full past the retry policy (packet was queued)
    /// - `Dma(Empty)`: nothing staged to pull
    /// - `Dma(Internal)`: poll-mode reclaim saw an impossible completion
    pub fn transmit<D: DelayNs>(&self, raw: Option<&B::Packet>, delay: &mut D) -> Result<()> {
        let pull = raw.is_none();
        if pull && self.config.role != DeviceRole::Hnet {
            return Err(ConfigError::InvalidParam.into());
        }

        let _guard = self.gate.enter(self.config.admission, delay)?;

        if !self.is_active() {
            return Err(ConfigError::Unavailable.into());
        }

        if !pull {
            match self.gate.kind() {
                GateKind::Semaphore => {
                    if self.is_xoff() {
                        self.stats.with(|s| s.dropped += 1);
                        return Err(DmaError::ResourceExhausted.into());
                    }
                }
                GateKind::Mutex => self.ring_check()?,
            }
        }

        if self.unused_count() == 0 {
            return Err(IoError::Busy.into());
        }

        let curr = self.curr.load(Ordering::Acquire);
        let len = match raw {
            None => self.pull_guest(curr)?,
            Some(pkt) => self.load_buffer(curr, pkt)?,
        };

        if self.config.role == DeviceRole::Vnet {
            if let Some(wake) = self.xnet {
                wake.xnet_wake();
            }
        }

        let next = DescriptorRing::<N>::next(curr);
        self.curr.store(next, Ordering::Release);

        self.chain_kick();

        self.chan.goto(self.config.chan_id, self.ring.slot_addr(next));

        self.stats.with(|s| {
            s.packets += 1;
            s.bytes += len as u64;
        });

        if self.config.is_poll() && self.unused_count() <= self.config.free_thresh {
            self.tx_ring_clean(self.config.reclaim_budget)?;
        }

        if self.ring_check().is_err() {
            self.wait_for_room(delay)?;
        }
        Ok(())
    }

    /// Fill slot `curr` from the guest ring.
    fn pull_guest(&self, curr: usize) -> Result<usize> {
        let guest = self.guest.as_ref().ok_or(ConfigError::Unavailable)?;
        let len = guest.fetch_into(self.ring.get(curr), self.mode_flags())?;
        self.pulled[curr].store(true, Ordering::Release);
        Ok(len as usize)
    }

    /// Fill slot `curr` from a buffer-manager packet.
    fn load_buffer(&self, curr: usize, pkt: &B::Packet) -> Result<usize> {
        let queue = self.config.queue_id;
        let Some(pbuf) = self.bufs.tx_buf_get(queue, curr, pkt) else {
            self.stats.with(|s| s.dropped += 1);
            log::warn!("txq {}: no buffer for slot {}", queue, curr);
            return Err(DmaError::ResourceExhausted.into());
        };

        if pbuf.len == 0 || pbuf.len > self.config.max_packet_len {
            self.stats.with(|s| s.dropped += 1);
            self.bufs.tx_buf_free(queue, curr);
            log::warn!("txq {}: bad packet length {}", queue, pbuf.len);
            return Err(ConfigError::InvalidParam.into());
        }

        if pbuf.meta.hdr_profile > MAX_HDR_PROFILE {
            self.stats.with(|s| s.dropped += 1);
            self.bufs.tx_buf_free(queue, curr);
            log::warn!("txq {}: bad header profile {}", queue, pbuf.meta.hdr_profile);
            return Err(ConfigError::InvalidParam.into());
        }

        let addr = self.bufs.tx_buf_dma(queue, curr);
        self.pulled[curr].store(false, Ordering::Release);
        self.ring.get(curr).configure(
            addr,
            pbuf.len as u16,
            pbuf.meta.hdr_profile,
            pbuf.desc_flags() | self.mode_flags(),
        );
        Ok(pbuf.len)
    }

    /// Wait for the ring to leave XOFF after a submit filled it.
    ///
    /// Mutex-gated queues completing by interrupt return at once: the
    /// completion path will resume the upper layer. Otherwise the wait is
    /// bounded by the ring-full retry policy, reclaiming on each attempt in
    /// poll mode.
    fn wait_for_room<D: DelayNs>(&self, delay: &mut D) -> Result<()> {
        let mutex = self.gate.kind() == GateKind::Mutex;
        if mutex && !self.config.is_poll() {
            return Ok(());
        }

        let policy = self.config.ring_full_retry;
        let mut elapsed = 0u32;
        loop {
            if self.config.is_poll() {
                self.tx_ring_clean(self.config.reclaim_budget)?;
            } else {
                self.try_xon();
            }
            if !self.is_xoff() {
                return Ok(());
            }
            if elapsed >= policy.timeout_us {
                break;
            }
            delay.delay_us(policy.step_us);
            elapsed = elapsed.saturating_add(policy.step_us);
        }

        log::error!(
            "txq {}: tx ring full for {} us, hardware not completing",
            self.config.queue_id,
            policy.timeout_us
        );
        if mutex {
            Ok(())
        } else {
            Err(DmaError::ResourceExhausted.into())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
