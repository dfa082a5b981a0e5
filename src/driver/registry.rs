//! Device registry.
//!
//! Maps each [`DeviceType`] to the [`DmaChannel`] implementation for that
//! device family. Platform code registers its families once at startup;
//! queues look theirs up in [`TxQueue::attach`](super::TxQueue::attach).

use super::config::DeviceType;
use super::error::{ConfigError, ConfigResult};
use crate::hal::DmaChannel;
use crate::internal::constants::REGISTRY_SLOTS;

/// Fixed-capacity table of channel operations keyed by device type.
pub struct DeviceRegistry<'a, const CAP: usize = REGISTRY_SLOTS> {
    entries: [Option<(DeviceType, &'a dyn DmaChannel)>; CAP],
}

impl<'a, const CAP: usize> DeviceRegistry<'a, CAP> {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [None; CAP],
        }
    }

    /// Register the channel operations for `device`.
    ///
    /// Fails with `InvalidParam` if the type is already registered and with
    /// `Unavailable` if every slot is taken.
    pub fn register(&mut self, device: DeviceType, ops: &'a dyn DmaChannel) -> ConfigResult<()> {
        if self.contains(device) {
            return Err(ConfigError::InvalidParam);
        }
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.is_none())
            .ok_or(ConfigError::Unavailable)?;
        *slot = Some((device, ops));
        log::debug!("registry: {:?} registered", device);
        Ok(())
    }

    /// Remove the entry for `device`, returning whether one existed.
    pub fn unregister(&mut self, device: DeviceType) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| matches!(e, Some((d, _)) if *d == device))
        {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Channel operations for `device`.
    pub fn lookup(&self, device: DeviceType) -> ConfigResult<&'a dyn DmaChannel> {
        self.entries
            .iter()
            .flatten()
            .find(|(d, _)| *d == device)
            .map(|(_, ops)| *ops)
            .ok_or(ConfigError::Unavailable)
    }

    /// Check if `device` has an entry
    pub fn contains(&self, device: DeviceType) -> bool {
        self.lookup(device).is_ok()
    }

    /// Number of registered device types
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const CAP: usize> Default for DeviceRegistry<'_, CAP> {
    fn default() -> Self {
        Self::new()
    }
}
