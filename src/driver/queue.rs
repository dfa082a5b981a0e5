//! Transmit queue controller.
//!
//! A [`TxQueue`] owns one descriptor ring together with its producer index
//! (`curr`), consumer index (`dirt`) and chain-mode restart checkpoint
//! (`halt`). Producers enter through [`transmit`](TxQueue::transmit); the
//! completion path calls [`tx_ring_clean`](TxQueue::tx_ring_clean). Both take
//! `&self`, so a queue can be shared between threads and interrupt context.
//!
//! # Placement
//!
//! The ring is stored inline and its address is handed to the DMA engine by
//! [`start`](TxQueue::start). A started queue must not be moved; keep it in a
//! `static` or pin it in place.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

use super::config::{DeviceType, QueueConfig};
use super::error::{ConfigError, ConfigResult, IoError, IoResult};
use super::flow::{TxHooks, XnetWake};
use super::gate::{AdmissionGate, GateKind};
use super::registry::DeviceRegistry;
use super::vnet::GuestRing;
use crate::hal::{DmaChannel, TxBufferManager};
use crate::internal::dma::{DescFlags, DescriptorRing, TxDescriptor};
use crate::sync::CriticalSectionCell;

bitflags! {
    /// Queue state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueueStatus: u32 {
        /// Transmission suspended (ring full or link paused)
        const XOFF = 1 << 0;
        /// Queue started
        const ACTIVE = 1 << 1;
        /// A reclaim pass is running
        const BUSY = 1 << 2;
        /// Completions are polled
        const POLL = 1 << 3;
    }
}

/// Transmit statistics. All counters only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStats {
    /// Packets handed to the hardware
    pub packets: u64,
    /// Bytes handed to the hardware
    pub bytes: u64,
    /// Packets rejected after being offered
    pub dropped: u64,
    /// Transitions into (or confirmations of) the suspended state
    pub xoffs: u64,
    /// Transitions back to active
    pub xons: u64,
    /// Descriptors the hardware completed with an error
    pub errors: u64,
}

/// Transmit queue over a ring of `N` descriptors.
pub struct TxQueue<'a, B: TxBufferManager, const N: usize> {
    pub(crate) ring: DescriptorRing<N>,
    pub(crate) config: QueueConfig,
    pub(crate) chan: &'a dyn DmaChannel,
    pub(crate) bufs: &'a B,
    pub(crate) hooks: Option<&'a dyn TxHooks>,
    pub(crate) xnet: Option<&'a dyn XnetWake>,
    pub(crate) guest: Option<GuestRing<'a>>,
    pub(crate) gate: AdmissionGate,
    pub(crate) curr: AtomicUsize,
    pub(crate) dirt: AtomicUsize,
    pub(crate) halt: AtomicUsize,
    /// Slots filled from the guest ring; their buffers belong to the guest
    pub(crate) pulled: [AtomicBool; N],
    pub(crate) status: AtomicU32,
    pub(crate) link_paused: AtomicBool,
    pub(crate) stats: CriticalSectionCell<TxStats>,
}

impl<'a, B: TxBufferManager, const N: usize> TxQueue<'a, B, N> {
    /// Create a stopped queue driving `chan`.
    ///
    /// The admission gate starts as a semaphore; registering hooks with
    /// [`with_hooks`](Self::with_hooks) switches it to a mutex.
    pub fn new(config: QueueConfig, chan: &'a dyn DmaChannel, bufs: &'a B) -> ConfigResult<Self> {
        config.validate(N)?;
        Ok(Self {
            ring: DescriptorRing::new(),
            config,
            chan,
            bufs,
            hooks: None,
            xnet: None,
            guest: None,
            gate: AdmissionGate::new(GateKind::Semaphore),
            curr: AtomicUsize::new(0),
            dirt: AtomicUsize::new(0),
            halt: AtomicUsize::new(0),
            pulled: [const { AtomicBool::new(false) }; N],
            status: AtomicU32::new(0),
            link_paused: AtomicBool::new(false),
            stats: CriticalSectionCell::new(TxStats::default()),
        })
    }

    /// Create a queue using the channel registered for `device`.
    pub fn attach<const CAP: usize>(
        registry: &DeviceRegistry<'a, CAP>,
        device: DeviceType,
        config: QueueConfig,
        bufs: &'a B,
    ) -> ConfigResult<Self> {
        let chan = registry.lookup(device)?;
        Self::new(config, chan, bufs)
    }

    /// Register upper-layer suspend/resume hooks. Selects the mutex gate.
    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a dyn TxHooks) -> Self {
        self.hooks = Some(hooks);
        self.gate = AdmissionGate::new(GateKind::Mutex);
        self
    }

    /// Register the wake hook of the paired host queue (Vnet role).
    #[must_use]
    pub fn with_xnet_wake(mut self, wake: &'a dyn XnetWake) -> Self {
        self.xnet = Some(wake);
        self
    }

    /// Pair with the staged ring of a guest queue (Hnet role).
    #[must_use]
    pub fn with_guest(mut self, descs: &'a [TxDescriptor]) -> Self {
        self.guest = Some(GuestRing::new(descs));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Descriptors of this queue, as seen by a paired host queue.
    pub fn staged_ring(&self) -> &[TxDescriptor] {
        self.ring.as_slice()
    }

    /// Descriptor at `index`
    pub fn descriptor(&self, index: usize) -> &TxDescriptor {
        self.ring.get(index)
    }

    /// Queue configuration
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Ring size
    pub const fn nb_desc(&self) -> usize {
        N
    }

    /// Next producer slot
    pub fn curr(&self) -> usize {
        self.curr.load(Ordering::Acquire)
    }

    /// Oldest slot not yet reclaimed
    pub fn dirt(&self) -> usize {
        self.dirt.load(Ordering::Acquire)
    }

    /// Chain-mode restart checkpoint
    pub fn halt(&self) -> usize {
        self.halt.load(Ordering::Acquire)
    }

    /// Current state flags
    pub fn status(&self) -> QueueStatus {
        QueueStatus::from_bits_truncate(self.status.load(Ordering::Acquire))
    }

    /// Check if transmission is suspended
    pub fn is_xoff(&self) -> bool {
        self.status().contains(QueueStatus::XOFF)
    }

    /// Check if the queue has been started
    pub fn is_active(&self) -> bool {
        self.status().contains(QueueStatus::ACTIVE)
    }

    /// Admission discipline in use
    pub fn gate_kind(&self) -> GateKind {
        self.gate.kind()
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> TxStats {
        self.stats.with(|s| *s)
    }

    /// Number of free slots; zero means the ring is full.
    #[inline]
    pub fn unused_count(&self) -> usize {
        DescriptorRing::<N>::unused(self.curr(), self.dirt())
    }

    /// Number of slots waiting for completion.
    #[inline]
    pub fn pending_count(&self) -> usize {
        DescriptorRing::<N>::pending(self.curr(), self.dirt())
    }

    pub(crate) fn set_status(&self, flags: QueueStatus) {
        self.status.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    pub(crate) fn clear_status(&self, flags: QueueStatus) {
        self.status.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    /// Claim the single reclaimer slot. Returns false if already held.
    pub(crate) fn try_set_busy(&self) -> bool {
        let prev = self
            .status
            .fetch_or(QueueStatus::BUSY.bits(), Ordering::AcqRel);
        prev & QueueStatus::BUSY.bits() == 0
    }

    /// Control bits every descriptor of this ring carries.
    pub(crate) fn mode_flags(&self) -> DescFlags {
        let mut flags = DescFlags::empty();
        if self.config.chain_mode {
            flags |= DescFlags::CHAIN;
        }
        if !self.config.is_poll() {
            flags |= DescFlags::INTR_PKT;
        }
        flags
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the queue.
    ///
    /// Descriptors and indices are reset, and a host queue reads its guest
    /// ring from slot 0 again. Outside chain mode the channel is
    /// pointed at slot 0 and enabled; in chain mode it is enabled by the first
    /// checkpoint kick.
    pub fn start(&self) -> ConfigResult<()> {
        if self.is_active() {
            return Err(ConfigError::InvalidParam);
        }

        self.ring.reset();
        for slot in &self.pulled {
            slot.store(false, Ordering::Relaxed);
        }
        self.curr.store(0, Ordering::Release);
        self.dirt.store(0, Ordering::Release);
        self.halt.store(0, Ordering::Release);
        if let Some(guest) = &self.guest {
            guest.rewind();
        }

        let chan = self.config.chan_id;
        if !self.config.chain_mode {
            self.chan.set_base(chan, self.ring.base_addr());
            self.chan.goto(chan, self.ring.slot_addr(0));
            self.chan.start(chan);
        }

        let mut flags = QueueStatus::ACTIVE;
        if self.config.is_poll() {
            flags |= QueueStatus::POLL;
        }
        self.set_status(flags);
        log::debug!("txq {}: started on chan {}", self.config.queue_id, chan);
        Ok(())
    }

    /// Stop the queue and release every buffer still owned by the ring.
    ///
    /// Waits for in-flight producers and any running reclaim pass, bounded
    /// by the admission policy.
    pub fn stop<D: DelayNs>(&self, delay: &mut D) -> IoResult<()> {
        let _guard = self.gate.enter(self.config.admission, delay)?;

        let policy = self.config.admission;
        let mut elapsed = 0u32;
        while !self.try_set_busy() {
            if elapsed >= policy.timeout_us {
                return Err(IoError::Timeout);
            }
            delay.delay_us(policy.step_us);
            elapsed = elapsed.saturating_add(policy.step_us);
        }

        self.chan.stop(self.config.chan_id);

        let curr = self.curr();
        let mut dirt = self.dirt();
        let mut released = 0usize;
        while dirt != curr {
            if !self.pulled[dirt].swap(false, Ordering::AcqRel) {
                self.bufs.tx_buf_free(self.config.queue_id, dirt);
                released += 1;
            }
            self.ring.get(dirt).reset();
            dirt = DescriptorRing::<N>::next(dirt);
        }

        self.curr.store(0, Ordering::Release);
        self.dirt.store(0, Ordering::Release);
        self.halt.store(0, Ordering::Release);
        if let Some(guest) = &self.guest {
            guest.rewind();
        }
        self.clear_status(QueueStatus::all());
        log::debug!(
            "txq {}: stopped, released {} pending buffers",
            self.config.queue_id,
            released
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
