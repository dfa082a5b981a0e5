//! Packet DMA Transmit Engine
//!
//! A `no_std`, `no_alloc` transmit path for switch-ASIC packet DMA channels.
//!
//! The crate drives a fixed-size ring of hardware descriptors: producers
//! fill slots and ring the channel doorbell, the DMA engine marks slots done,
//! and a reclaim pass hands finished buffers back to the buffer manager.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): Queue controller, transmit engine, flow
//!    control, guest/host virtualization and the device registry
//! 2. **HAL Layer** ([`hal`]): Traits for channel register access and packet
//!    buffer management, implemented by platform code
//! 3. **Descriptor Layer** ([`DescriptorRing`], [`TxDescriptor`]): The
//!    hardware-visible ring with explicit memory barriers
//!
//! ## Concurrency
//!
//! Any number of threads may call [`TxQueue::transmit`] on a shared queue.
//! Producers are admitted through an [`driver::gate::AdmissionGate`]; the
//! ring-full state and the flow control flags change only inside a
//! `critical-section` region, and a single reclaim pass runs at a time.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error types
//! - `async`: Enable waker-based [`TxHooks`] (`sync::AsyncTxHooks`)
//!
//! # Example
//!
//! ```ignore
//! use pdma_tx::{DeviceRegistry, DeviceType, QueueConfig, TxQueue};
//!
//! let mut registry: DeviceRegistry<'_> = DeviceRegistry::new();
//! registry.register(DeviceType::Cmicr2, &cmicr2_channel)?;
//!
//! let txq: TxQueue<'_, _, 256> =
//!     TxQueue::attach(&registry, DeviceType::Cmicr2, QueueConfig::for_ring(256), &buffers)?;
//! txq.start()?;
//!
//! match txq.transmit(Some(&packet), &mut delay) {
//!     Ok(()) => {}
//!     Err(e) if e.is_transient() => { /* back off and retry */ }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! # Memory Requirements
//!
//! Each descriptor is 16 bytes; a queue of `N` slots also keeps one flag
//! byte per slot and a handful of atomics. Packet memory belongs to the
//! buffer manager.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

/// Default values and hardware limits.
pub mod constants {
    pub use crate::internal::constants::*;
}

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{CompletionMode, DeviceRole, DeviceType, QueueConfig, RetryPolicy};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use driver::flow::{TxHooks, XnetWake};
pub use driver::gate::GateKind;
pub use driver::queue::{QueueStatus, TxQueue, TxStats};
pub use driver::registry::DeviceRegistry;
pub use driver::vnet::GuestRing;
pub use hal::{DmaChannel, PacketBuffer, TxBufferManager, TxMeta};
pub use internal::dma::{DescFlags, DescriptorFields, DescriptorRing, TxDescriptor};
