//! TX DMA descriptor structures.
//!
//! Each descriptor points to a packet buffer and carries control bits for the
//! DMA engine plus a status word the engine writes back on completion.

use core::sync::atomic::{Ordering, fence};

pub mod bits;
pub mod tx;

pub use tx::{DescFlags, DescriptorFields, TxDescriptor};

/// Write barrier between descriptor stores and anything that publishes them.
///
/// Every store issued before this call is visible to the DMA engine (and to
/// other CPUs) before any store issued after it.
#[inline(always)]
pub(crate) fn dma_wmb() {
    fence(Ordering::Release);
}

/// Read barrier between observing a completion and reading descriptor fields.
#[inline(always)]
pub(crate) fn dma_rmb() {
    fence(Ordering::Acquire);
}

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses. The `*_release` and
/// `*_acquire` variants pair the access with a fence for publish/observe
/// ordering against the DMA engine.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: VolatileCell is safe to share between threads because all access
// is through volatile operations on naturally aligned words, and producers
// serialize on the admission gate before writing a slot.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        // SAFETY: the pointer comes from our own UnsafeCell and is aligned.
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        // SAFETY: the pointer comes from our own UnsafeCell and is aligned.
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Volatile read followed by an acquire fence.
    ///
    /// Field reads issued after this call cannot be hoisted above it.
    #[inline(always)]
    pub fn get_acquire(&self) -> T {
        let value = self.get();
        dma_rmb();
        value
    }

    /// Release fence followed by a volatile write.
    ///
    /// Field writes issued before this call are visible before `value`.
    #[inline(always)]
    pub fn set_release(&self, value: T) {
        dma_wmb();
        self.set(value);
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_cell_get_set() {
        let cell = VolatileCell::new(5u32);
        assert_eq!(cell.get(), 5);
        cell.set(9);
        assert_eq!(cell.get(), 9);
    }

    #[test]
    fn volatile_cell_release_acquire_round_trip() {
        let cell = VolatileCell::new(0u32);
        cell.set_release(0xDEAD_BEEF);
        assert_eq!(cell.get_acquire(), 0xDEAD_BEEF);
    }

    #[test]
    fn volatile_cell_update() {
        let cell = VolatileCell::new(0b0101u32);
        cell.update(|v| v | 0b1000);
        assert_eq!(cell.get(), 0b1101);
    }
}
