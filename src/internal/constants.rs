//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers and
//! default configuration values used throughout the transmit engine.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Ring geometry**: Default ring sizes and watermarks
//! - **Packet limits**: Byte-count bounds enforced before a descriptor is written
//! - **Timing**: Retry deadlines and polling intervals
//! - **Registry**: Device registry capacity
//!
//! # Note
//!
//! Descriptor bit definitions remain in `internal::dma::descriptor::bits` as
//! they are specific to the hardware record layout.

// =============================================================================
// Ring Geometry
// =============================================================================

/// Default number of transmit descriptors per ring
pub const DEFAULT_TX_DESC: usize = 64;

/// Smallest usable ring (one slot is always kept unused)
pub const MIN_TX_DESC: usize = 2;

// =============================================================================
// Packet Limits
// =============================================================================

/// Largest byte count the 16-bit descriptor length field can carry
pub const MAX_DESC_LEN: usize = 0xFFFF;

/// Default maximum packet length (jumbo frame plus module header)
pub const DEFAULT_MAX_PACKET_LEN: usize = 9_600;

/// Largest header profile selector the 3-bit descriptor field can carry
pub const MAX_HDR_PROFILE: u8 = 7;

// =============================================================================
// Timing Constants
// =============================================================================

/// Deadline for waiting on a full ring before declaring it unrecoverable
pub const TX_RING_FULL_TIMEOUT_US: u32 = 1_000_000;

/// Sleep step between ring-full retries
pub const TX_RING_FULL_POLL_US: u32 = 1;

/// Bounded wait for the semaphore-style admission gate
pub const ADMISSION_TIMEOUT_US: u32 = 5_000_000;

/// Sleep step while waiting for an admission permit
pub const ADMISSION_POLL_US: u32 = 10;

// =============================================================================
// Registry
// =============================================================================

/// Number of device families a registry holds by default
pub const REGISTRY_SLOTS: usize = 4;
