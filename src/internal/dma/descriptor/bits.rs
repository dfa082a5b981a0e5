//! DMA descriptor bit field constants.
//!
//! Layout of the 16-byte CMICr2-style TX descriptor:
//!
//! | Word | Contents                                         |
//! |------|--------------------------------------------------|
//! | 0    | Buffer address, low 32 bits                      |
//! | 1    | Buffer address, high 32 bits                     |
//! | 2    | Control: flags, header profile, byte count       |
//! | 3    | Status: written back by the DMA engine           |

// =============================================================================
// Control Word (word 2)
// =============================================================================

/// Control word bit field constants
pub mod ctrl {
    /// Chain - DMA continues to the next descriptor after this one
    pub const CHAIN: u32 = 1 << 0;
    /// Scatter/gather - packet continues in the next descriptor
    pub const SG: u32 = 1 << 1;
    /// Reload - descriptor address points back to the ring base
    pub const RELOAD: u32 = 1 << 2;
    /// Higig - payload is prefixed with a module header
    pub const HIGIG: u32 = 1 << 3;
    /// Purge - packet is dropped by the switch after being read
    pub const PURGE: u32 = 1 << 6;
    /// Interrupt when this packet completes
    pub const INTR_PKT: u32 = 1 << 7;
    /// Interrupt when this descriptor completes
    pub const INTR_DESC: u32 = 1 << 8;
    /// Header profile shift (3 bits)
    pub const HDR_PROFILE_SHIFT: u32 = 9;
    /// Header profile mask
    pub const HDR_PROFILE_MASK: u32 = 0x7 << 9;
    /// Byte count shift (16 bits)
    pub const LEN_SHIFT: u32 = 16;
    /// Byte count mask
    pub const LEN_MASK: u32 = 0xFFFF << 16;

    /// Every single-bit flag carried in the control word
    pub const FLAGS_MASK: u32 = CHAIN | SG | RELOAD | HIGIG | PURGE | INTR_PKT | INTR_DESC;
}

// =============================================================================
// Status Word (word 3)
// =============================================================================

/// Status word bit field constants
pub mod status {
    /// Bytes actually transferred by the DMA engine
    pub const BYTES_MASK: u32 = 0xFFFF;
    /// Error - the engine aborted this descriptor
    pub const ERR: u32 = 1 << 30;
    /// Done - the engine has finished with this descriptor
    pub const DONE: u32 = 1 << 31;
}
