//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`constants`]: Internal constants and default values
//! - [`dma`]: Descriptor layout, barriers and the descriptor ring
//!
//! # Stability
//!
//! **WARNING:** Only the items re-exported from the crate root are stable.
//! Everything else here is subject to change without notice.

pub(crate) mod constants;
pub(crate) mod dma;
