//! Configuration types for transmit queues

use super::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    ADMISSION_POLL_US, ADMISSION_TIMEOUT_US, DEFAULT_MAX_PACKET_LEN, DEFAULT_TX_DESC,
    MAX_DESC_LEN, MIN_TX_DESC, TX_RING_FULL_POLL_US, TX_RING_FULL_TIMEOUT_US,
};

/// Role of a queue in the virtual/host network split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceRole {
    /// Plain queue driving a hardware channel
    #[default]
    Normal,
    /// Guest-side queue; descriptors are staged for a host queue to pull
    Vnet,
    /// Host-side queue that pulls staged guest descriptors onto hardware
    Hnet,
}

/// Device family, used to select channel operations from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceType {
    /// CMICx generation
    Cmicx,
    /// CMICr generation
    Cmicr,
    /// CMICr2 generation
    #[default]
    Cmicr2,
}

/// How descriptor completions are observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionMode {
    /// Hardware raises an interrupt per packet; reclaim runs from the handler
    #[default]
    Interrupt,
    /// No interrupts; the transmit path reclaims opportunistically
    Poll,
}

/// Bounded retry: total deadline plus the sleep between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Give up after this many microseconds
    pub timeout_us: u32,
    /// Sleep between attempts, in microseconds
    pub step_us: u32,
}

impl RetryPolicy {
    /// Create a retry policy
    #[must_use]
    pub const fn new(timeout_us: u32, step_us: u32) -> Self {
        Self {
            timeout_us,
            step_us,
        }
    }

    /// Number of sleeps before the deadline passes
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.step_us == 0 {
            0
        } else {
            self.timeout_us.div_ceil(self.step_us)
        }
    }
}

/// Transmit queue configuration
///
/// The ring size is the `N` const parameter of
/// [`TxQueue`](super::TxQueue); fields here that depend on it are checked
/// by [`validate`](Self::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueConfig {
    /// Queue index passed to the buffer manager and hooks
    pub queue_id: u8,
    /// Hardware channel driven by this queue
    pub chan_id: u8,
    /// XON threshold and poll-mode reclaim trigger (free slots)
    pub free_thresh: usize,
    /// Channel follows the chain bit instead of the doorbell address
    pub chain_mode: bool,
    /// Completion observation mode
    pub completion: CompletionMode,
    /// Virtual network role
    pub role: DeviceRole,
    /// Wait bound when the ring stays full after a submit
    pub ring_full_retry: RetryPolicy,
    /// Wait bound for the semaphore admission gate
    pub admission: RetryPolicy,
    /// Maximum descriptors reclaimed per poll-mode pass
    pub reclaim_budget: usize,
    /// Largest accepted packet, in bytes
    pub max_packet_len: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueConfig {
    /// Create a new configuration sized for the default ring
    #[must_use]
    pub const fn new() -> Self {
        Self::for_ring(DEFAULT_TX_DESC)
    }

    /// Create a configuration whose thresholds suit a ring of `nb_desc` slots
    #[must_use]
    pub const fn for_ring(nb_desc: usize) -> Self {
        Self {
            queue_id: 0,
            chan_id: 0,
            free_thresh: nb_desc / 4,
            chain_mode: false,
            completion: CompletionMode::Interrupt,
            role: DeviceRole::Normal,
            ring_full_retry: RetryPolicy::new(TX_RING_FULL_TIMEOUT_US, TX_RING_FULL_POLL_US),
            admission: RetryPolicy::new(ADMISSION_TIMEOUT_US, ADMISSION_POLL_US),
            reclaim_budget: usize::MAX,
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the queue index
    #[must_use]
    pub const fn with_queue_id(mut self, queue_id: u8) -> Self {
        self.queue_id = queue_id;
        self
    }

    /// Set the hardware channel
    #[must_use]
    pub const fn with_chan_id(mut self, chan_id: u8) -> Self {
        self.chan_id = chan_id;
        self
    }

    /// Set the free-slot threshold
    #[must_use]
    pub const fn with_free_thresh(mut self, free_thresh: usize) -> Self {
        self.free_thresh = free_thresh;
        self
    }

    /// Enable or disable chain mode
    #[must_use]
    pub const fn with_chain_mode(mut self, enabled: bool) -> Self {
        self.chain_mode = enabled;
        self
    }

    /// Set the completion mode
    #[must_use]
    pub const fn with_completion(mut self, completion: CompletionMode) -> Self {
        self.completion = completion;
        self
    }

    /// Set the virtual network role
    #[must_use]
    pub const fn with_role(mut self, role: DeviceRole) -> Self {
        self.role = role;
        self
    }

    /// Set the ring-full retry policy
    #[must_use]
    pub const fn with_ring_full_retry(mut self, policy: RetryPolicy) -> Self {
        self.ring_full_retry = policy;
        self
    }

    /// Set the admission gate wait policy
    #[must_use]
    pub const fn with_admission(mut self, policy: RetryPolicy) -> Self {
        self.admission = policy;
        self
    }

    /// Set the poll-mode reclaim budget
    #[must_use]
    pub const fn with_reclaim_budget(mut self, budget: usize) -> Self {
        self.reclaim_budget = budget;
        self
    }

    /// Set the maximum packet length
    #[must_use]
    pub const fn with_max_packet_len(mut self, len: usize) -> Self {
        self.max_packet_len = len;
        self
    }

    /// Check if completions are polled
    #[inline(always)]
    #[must_use]
    pub const fn is_poll(&self) -> bool {
        matches!(self.completion, CompletionMode::Poll)
    }

    /// Check the configuration against a ring of `nb_desc` slots.
    pub const fn validate(&self, nb_desc: usize) -> ConfigResult<()> {
        if nb_desc < MIN_TX_DESC {
            return Err(ConfigError::InvalidParam);
        }
        if self.free_thresh >= nb_desc - 1 {
            return Err(ConfigError::InvalidParam);
        }
        if self.max_packet_len == 0 || self.max_packet_len > MAX_DESC_LEN {
            return Err(ConfigError::InvalidParam);
        }
        if self.reclaim_budget == 0 {
            return Err(ConfigError::InvalidParam);
        }
        if self.ring_full_retry.step_us == 0 || self.admission.step_us == 0 {
            return Err(ConfigError::InvalidParam);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
