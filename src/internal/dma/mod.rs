//! Descriptor Ring Storage
//!
//! This module provides the hardware-visible side of the transmit path. All
//! memory is statically allocated using const generics.
//!
//! # Architecture
//!
//! - [`DescriptorRing`]: Fixed-size circular array of TX descriptors
//! - [`TxDescriptor`]: One 16-byte transfer record (address, control, status)
//! - `VolatileCell` and the `dma_wmb`/`dma_rmb` barriers: ordering between
//!   CPU stores and the DMA engine's view of memory
//!
//! # Example
//!
//! ```ignore
//! use pdma_tx::{DescFlags, DescriptorRing};
//!
//! let ring: DescriptorRing<8> = DescriptorRing::new();
//! ring.get(0).configure(0x1000, 64, 0, DescFlags::empty());
//! ```

pub(crate) mod descriptor;
mod ring;

pub use descriptor::{DescFlags, DescriptorFields, TxDescriptor};
pub use ring::DescriptorRing;
