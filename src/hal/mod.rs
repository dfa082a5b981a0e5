//! Hardware Abstraction Layer
//!
//! Traits for the collaborators the transmit engine drives but does not own.
//! Platform code implements them over the real register block and buffer pool.
//!
//! # Modules
//!
//! - [`channel`]: DMA channel control (start, stop, base address, doorbell)
//! - [`buffer`]: Packet buffer manager mapping payloads to DMA addresses
//!
//! # Delay Integration
//!
//! Bounded waits use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod buffer;
pub mod channel;

// Re-export commonly used types
pub use buffer::{PacketBuffer, TxBufferManager, TxMeta};
pub use channel::DmaChannel;
