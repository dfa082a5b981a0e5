//! Circular ring of TX descriptors.

use super::descriptor::TxDescriptor;

/// Fixed-size circular array of hardware-visible TX descriptors.
///
/// The ring only provides storage and index arithmetic. Producer and
/// consumer indices live in the owning queue; one slot is always left
/// unused so that `curr == dirt` unambiguously means "empty".
pub struct DescriptorRing<const N: usize> {
    /// Array of descriptors
    pub(crate) descriptors: [TxDescriptor; N],
}

impl<const N: usize> DescriptorRing<N> {
    /// Create a ring of zeroed descriptors. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descriptors: [const { TxDescriptor::new() }; N],
        }
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring is empty (always false for fixed-size ring)
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Index following `index`, wrapping around
    #[inline(always)]
    #[must_use]
    pub const fn next(index: usize) -> usize {
        (index + 1) % N
    }

    /// Index preceding `index`, wrapping around
    #[inline(always)]
    #[must_use]
    pub const fn prev(index: usize) -> usize {
        (index + N - 1) % N
    }

    /// Free slots between a producer index `curr` and a consumer index `dirt`.
    ///
    /// Always in `0..=N-1`; zero means the ring is full.
    #[inline(always)]
    #[must_use]
    pub const fn unused(curr: usize, dirt: usize) -> usize {
        (N + dirt - curr - 1) % N
    }

    /// Slots currently owned by hardware between `dirt` and `curr`.
    #[inline(always)]
    #[must_use]
    pub const fn pending(curr: usize, dirt: usize) -> usize {
        (N + curr - dirt) % N
    }

    /// Get a reference to a descriptor at a specific index
    #[inline(always)]
    pub fn get(&self, index: usize) -> &TxDescriptor {
        &self.descriptors[index % N]
    }

    /// All descriptors as a slice (guest view for the virtualization shim)
    #[inline(always)]
    pub fn as_slice(&self) -> &[TxDescriptor] {
        &self.descriptors
    }

    /// Get the base address of the descriptor array
    #[inline(always)]
    pub fn base_addr(&self) -> u64 {
        self.descriptors.as_ptr() as u64
    }

    /// DMA address of the descriptor at `index`
    #[inline(always)]
    pub fn slot_addr(&self, index: usize) -> u64 {
        self.base_addr() + ((index % N) * TxDescriptor::SIZE) as u64
    }

    /// Reset every descriptor to its zeroed state
    pub fn reset(&self) {
        for desc in self.iter() {
            desc.reset();
        }
    }

    /// Iterate over all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &TxDescriptor> {
        self.descriptors.iter()
    }
}

impl<const N: usize> Default for DescriptorRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
