//! Synchronization support.
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], interior
//!   mutability guarded by a `critical-section` critical section. Queue
//!   statistics live in one; XOFF/XON decisions run inside the same lock.
//!
//! - **Async hooks** (`asynch`, feature `async`): [`AsyncTxHooks`]
//!   implements the transmit hooks with wakers so async producers can await
//!   resume and pull events instead of polling.
//!
//! # Feature Flags
//!
//! - `async`: Enables the `asynch` module

mod primitives;

pub use primitives::CriticalSectionCell;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::{AsyncTxHooks, WakerSlot};
