//! DMA channel control operations.
//!
//! One implementation exists per device family; the
//! [`DeviceRegistry`](crate::driver::DeviceRegistry) hands the right one to a
//! queue at attach time.

/// Register-level control of a packet DMA channel.
///
/// Implementations write the channel's control and address registers. All
/// methods take `&self` because they are invoked from concurrent producers
/// and the completion path; register writes are individually atomic.
pub trait DmaChannel: Sync {
    /// Enable the channel so it starts fetching descriptors.
    fn start(&self, chan: u8);

    /// Halt the channel.
    fn stop(&self, chan: u8);

    /// Program the address of the first descriptor the channel will fetch.
    fn set_base(&self, chan: u8, addr: u64);

    /// Doorbell: tell the channel it may process descriptors up to `addr`.
    fn goto(&self, chan: u8, addr: u64);
}

impl<T: DmaChannel + ?Sized> DmaChannel for &T {
    #[inline]
    fn start(&self, chan: u8) {
        (**self).start(chan)
    }

    #[inline]
    fn stop(&self, chan: u8) {
        (**self).stop(chan)
    }

    #[inline]
    fn set_base(&self, chan: u8, addr: u64) {
        (**self).set_base(chan, addr)
    }

    #[inline]
    fn goto(&self, chan: u8, addr: u64) {
        (**self).goto(chan, addr)
    }
}
