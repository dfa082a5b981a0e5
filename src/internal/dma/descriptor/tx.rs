//! TX DMA descriptor for packet transmission.

use bitflags::bitflags;

use super::bits::{ctrl, status};
use super::{VolatileCell, dma_rmb, dma_wmb};

bitflags! {
    /// Single-bit control flags of a TX descriptor.
    ///
    /// Bit positions match the hardware control word so the flags can be
    /// merged into it without translation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DescFlags: u32 {
        /// DMA continues to the next descriptor (chain mode only)
        const CHAIN = ctrl::CHAIN;
        /// Packet continues in the next descriptor
        const SG = ctrl::SG;
        /// Descriptor links back to the ring base
        const RELOAD = ctrl::RELOAD;
        /// Payload carries a Higig module header
        const HIGIG = ctrl::HIGIG;
        /// Switch discards the packet after reading it
        const PURGE = ctrl::PURGE;
        /// Raise an interrupt when the packet completes
        const INTR_PKT = ctrl::INTR_PKT;
        /// Raise an interrupt when the descriptor completes
        const INTR_DESC = ctrl::INTR_DESC;
    }
}

impl DescFlags {
    /// Flags that describe the packet itself and survive a guest-to-host copy.
    ///
    /// Chaining and interrupt bits belong to the ring that finally carries
    /// the descriptor, so they are re-derived on the host side.
    pub const PACKET: Self = Self::SG.union(Self::HIGIG).union(Self::PURGE);
}

/// Decoded view of a descriptor's software-written fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DescriptorFields {
    /// Buffer DMA address
    pub addr: u64,
    /// Byte count
    pub len: u16,
    /// Header profile (3 bits)
    pub profile: u8,
    /// Raw control flags
    pub flags: u32,
}

impl DescriptorFields {
    /// Control flags as a typed set
    #[inline(always)]
    pub fn desc_flags(&self) -> DescFlags {
        DescFlags::from_bits_truncate(self.flags)
    }
}

/// TX DMA descriptor (16 bytes).
#[repr(C)]
#[repr(align(16))]
pub struct TxDescriptor {
    /// Word 0: Buffer address, low half
    addr_lo: VolatileCell<u32>,
    /// Word 1: Buffer address, high half
    addr_hi: VolatileCell<u32>,
    /// Word 2: Control flags, header profile and byte count
    ctrl: VolatileCell<u32>,
    /// Word 3: Completion status written back by hardware
    status: VolatileCell<u32>,
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 16;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addr_lo: VolatileCell::new(0),
            addr_hi: VolatileCell::new(0),
            ctrl: VolatileCell::new(0),
            status: VolatileCell::new(0),
        }
    }

    /// Populate the descriptor for one transfer.
    ///
    /// The status word is cleared first and the control word (which carries
    /// the byte count) is written last, behind a write barrier, so the engine
    /// never sees a length paired with a stale address.
    pub fn configure(&self, addr: u64, len: u16, profile: u8, flags: DescFlags) {
        self.status.set(0);
        self.addr_lo.set(addr as u32);
        self.addr_hi.set((addr >> 32) as u32);

        let word = (flags.bits() & ctrl::FLAGS_MASK)
            | (((profile as u32) << ctrl::HDR_PROFILE_SHIFT) & ctrl::HDR_PROFILE_MASK)
            | ((len as u32) << ctrl::LEN_SHIFT);
        self.ctrl.set_release(word);
        dma_wmb();
    }

    /// Set or clear the chain (continuation) bit.
    pub fn chain(&self, enable: bool) {
        if enable {
            self.ctrl.update(|v| v | ctrl::CHAIN);
        } else {
            self.ctrl.update(|v| v & !ctrl::CHAIN);
        }
        dma_wmb();
    }

    /// Read back the software-written fields.
    #[must_use]
    pub fn read(&self) -> DescriptorFields {
        let word = self.ctrl.get_acquire();
        DescriptorFields {
            addr: self.addr(),
            len: (word >> ctrl::LEN_SHIFT) as u16,
            profile: ((word & ctrl::HDR_PROFILE_MASK) >> ctrl::HDR_PROFILE_SHIFT) as u8,
            flags: word & ctrl::FLAGS_MASK,
        }
    }

    /// Buffer DMA address.
    #[inline(always)]
    #[must_use]
    pub fn addr(&self) -> u64 {
        ((self.addr_hi.get() as u64) << 32) | (self.addr_lo.get() as u64)
    }

    /// Byte count. Zero means the slot holds no staged packet.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> u16 {
        (self.ctrl.get_acquire() >> ctrl::LEN_SHIFT) as u16
    }

    /// Check if the descriptor carries no staged packet.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the chain bit is set.
    #[inline(always)]
    #[must_use]
    pub fn is_chained(&self) -> bool {
        (self.ctrl.get() & ctrl::CHAIN) != 0
    }

    /// Copy a staged descriptor into this slot.
    ///
    /// Only the address, byte count, header profile and packet flags are
    /// taken from `other`; `mode` supplies the ring-specific control bits.
    /// Returns the copied byte count.
    pub fn copy_from(&self, other: &TxDescriptor, mode: DescFlags) -> u16 {
        let src = other.read();
        let flags = (src.desc_flags() & DescFlags::PACKET) | mode;
        self.configure(src.addr, src.len, src.profile, flags);
        src.len
    }

    /// Clear the byte count, marking a staged slot as consumed.
    pub fn clear_len(&self) {
        self.ctrl.update(|v| v & !ctrl::LEN_MASK);
        dma_wmb();
    }

    /// Check if the DMA engine has finished with this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_done(&self) -> bool {
        let done = (self.status.get() & status::DONE) != 0;
        if done {
            dma_rmb();
        }
        done
    }

    /// Check if the DMA engine flagged an error.
    #[inline(always)]
    #[must_use]
    pub fn has_error(&self) -> bool {
        (self.status.get() & status::ERR) != 0
    }

    /// Bytes the DMA engine reports as transferred.
    #[inline(always)]
    #[must_use]
    pub fn transferred(&self) -> u16 {
        (self.status.get() & status::BYTES_MASK) as u16
    }

    /// Write back a completion the way the DMA engine does.
    #[cfg(test)]
    pub(crate) fn mark_done(&self, bytes: u16, error: bool) {
        let mut word = status::DONE | (bytes as u32 & status::BYTES_MASK);
        if error {
            word |= status::ERR;
        }
        self.status.set_release(word);
    }

    /// Reset descriptor to initial state.
    pub fn reset(&self) {
        self.ctrl.set(0);
        self.status.set(0);
        self.addr_lo.set(0);
        self.addr_hi.set(0);
        dma_wmb();
    }

    /// Get raw control word for debugging.
    #[inline(always)]
    #[must_use]
    pub fn raw_ctrl(&self) -> u32 {
        self.ctrl.get()
    }

    /// Get raw status word for debugging.
    #[inline(always)]
    #[must_use]
    pub fn raw_status(&self) -> u32 {
        self.status.get()
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: TxDescriptor uses volatile cells for all DMA-accessed fields
unsafe impl Sync for TxDescriptor {}
unsafe impl Send for TxDescriptor {}
