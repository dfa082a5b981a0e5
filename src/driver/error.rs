//! Error types for the transmit engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Bad parameters and missing collaborators
//! - [`IoError`]: Contention and bounded waits that ran out
//! - [`DmaError`]: Ring resources and descriptor state
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by [`TxQueue::transmit`](crate::driver::TxQueue::transmit). Use
//! [`Error::kind`] for a flat view.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Parameter and attach-time errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid argument, configuration value or queue mode
    InvalidParam,
    /// Device, channel or queue not available in the current state
    Unavailable,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidParam => "invalid parameter",
            ConfigError::Unavailable => "device unavailable",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Ring and descriptor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Ring or buffer resources exhausted; the packet was not queued
    ResourceExhausted,
    /// No staged guest descriptor to pull
    Empty,
    /// Hardware reported an impossible completion
    Internal,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::ResourceExhausted => "resources exhausted",
            DmaError::Empty => "no staged descriptor",
            DmaError::Internal => "internal descriptor error",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Transient runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Ring full or transmission suspended; retry later
    Busy,
    /// Operation timed out
    Timeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Busy => "transmit busy",
            IoError::Timeout => "operation timed out",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match queue.transmit(Some(&pkt), &mut delay) {
///     Err(Error::Io(IoError::Busy)) => { /* back off, wait for resume */ }
///     Err(Error::Dma(DmaError::ResourceExhausted)) => { /* packet dropped */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

/// Flat classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Invalid argument or mode
    Param,
    /// Ring full or suspended
    Busy,
    /// Bounded wait expired
    Timeout,
    /// Packet could not be queued
    ResourceExhausted,
    /// Nothing to pull
    Empty,
    /// Hardware inconsistency
    Internal,
    /// Device or queue unavailable
    Unavailable,
}

impl Error {
    /// Flat classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(ConfigError::InvalidParam) => ErrorKind::Param,
            Error::Config(ConfigError::Unavailable) => ErrorKind::Unavailable,
            Error::Io(IoError::Busy) => ErrorKind::Busy,
            Error::Io(IoError::Timeout) => ErrorKind::Timeout,
            Error::Dma(DmaError::ResourceExhausted) => ErrorKind::ResourceExhausted,
            Error::Dma(DmaError::Empty) => ErrorKind::Empty,
            Error::Dma(DmaError::Internal) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same call later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Busy | ErrorKind::Timeout | ErrorKind::Empty
        )
    }

    /// Returns a human-readable description of the inner error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::Config(e) => e.as_str(),
            Error::Dma(e) => e.as_str(),
            Error::Io(e) => e.as_str(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for transmit operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
