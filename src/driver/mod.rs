//! Core transmit-path components.
//!
//! - [`config`] - Queue configuration and builder methods
//! - [`error`] - Error types and result aliases
//! - [`queue`] - The [`TxQueue`] controller (ring, indices, state, statistics)
//! - [`registry`] - Channel operations keyed by device family
//!
//! - [`gate`] - Producer admission (mutex or counting semaphore)
//! - [`flow`] - XOFF/XON flow control and the hook traits
//! - [`vnet`] - Guest ring for the virtualized (`Vnet`/`Hnet`) roles
//!
//! The transmit engine (`xmit`) and completion reclaim (`reclaim`) are
//! further `impl TxQueue` blocks kept in private modules.
//!
//! # Example
//!
//! ```ignore
//! use pdma_tx::driver::{DeviceRegistry, DeviceType, QueueConfig, TxQueue};
//!
//! let mut registry: DeviceRegistry = DeviceRegistry::new();
//! registry.register(DeviceType::Cmicr2, &CMICR2_CHANNEL)?;
//!
//! let config = QueueConfig::for_ring(256).with_chan_id(1);
//! let queue: TxQueue<'_, _, 256> =
//!     TxQueue::attach(&registry, DeviceType::Cmicr2, config, &BUFFERS)?;
//! queue.start()?;
//! queue.transmit(Some(&skb), &mut delay)?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod flow;
pub mod gate;
pub mod queue;
mod reclaim;
pub mod registry;
pub mod vnet;
mod xmit;

// Re-exports for convenience
pub use config::{CompletionMode, DeviceRole, DeviceType, QueueConfig, RetryPolicy};
pub use error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, ErrorKind, IoError, IoResult, Result,
};
pub use flow::{TxHooks, XnetWake};
pub use gate::GateKind;
pub use queue::{QueueStatus, TxQueue, TxStats};
pub use registry::DeviceRegistry;
pub use vnet::GuestRing;
