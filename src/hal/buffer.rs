//! Packet buffer management.
//!
//! The buffer manager owns packet memory. The transmit engine asks it to
//! prepare a payload for a ring slot, reads back the DMA address, and
//! returns the slot's buffer once the hardware has finished with it.

use crate::internal::dma::DescFlags;

/// Per-packet transmit metadata decoded by the buffer manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxMeta {
    /// Payload starts with a Higig module header
    pub higig: bool,
    /// Switch should discard the packet after reading it
    pub purge: bool,
    /// Header profile selector (3 bits); larger values are rejected at submit
    pub hdr_profile: u8,
}

/// A payload prepared for DMA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketBuffer {
    /// Length in bytes as the DMA engine must read it
    pub len: usize,
    /// Buffer was adjusted to carry a module header in front of the frame
    pub adjusted: bool,
    /// Decoded transmit metadata
    pub meta: TxMeta,
}

impl PacketBuffer {
    /// Create a plain buffer with no metadata.
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            adjusted: false,
            meta: TxMeta {
                higig: false,
                purge: false,
                hdr_profile: 0,
            },
        }
    }

    /// Set the transmit metadata.
    pub const fn with_meta(mut self, meta: TxMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Mark the buffer as carrying a prepended module header.
    pub const fn with_adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = adjusted;
        self
    }

    /// Control flags describing this packet.
    pub fn desc_flags(&self) -> DescFlags {
        let mut flags = DescFlags::empty();
        if self.adjusted || self.meta.higig {
            flags |= DescFlags::HIGIG;
        }
        if self.meta.purge {
            flags |= DescFlags::PURGE;
        }
        flags
    }
}

/// Maps packets to DMA-able buffers for one device.
///
/// Buffers are tracked per `(queue, slot)`; the engine guarantees a slot is
/// not reused until [`tx_buf_free`](Self::tx_buf_free) has been called for it.
pub trait TxBufferManager: Sync {
    /// Packet type accepted from the upper layer.
    type Packet: ?Sized;

    /// Prepare `raw` for transmission from `slot`.
    ///
    /// Returns `None` when no buffer could be set up (allocation or mapping
    /// failure); the engine counts this as a drop.
    fn tx_buf_get(&self, queue: u8, slot: usize, raw: &Self::Packet) -> Option<PacketBuffer>;

    /// DMA address of the buffer prepared for `slot`.
    fn tx_buf_dma(&self, queue: u8, slot: usize) -> u64;

    /// Release the buffer held by `slot`.
    fn tx_buf_free(&self, queue: u8, slot: usize);
}
