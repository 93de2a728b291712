use kernel_memory_addresses::PhysicalAddress;

/// A firmware page allocation request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("physical page allocation denied")]
pub struct AllocationError;

/// Physical memory that can be reserved at a caller-chosen address.
///
/// The kernel is linked for a fixed physical layout, so there is no
/// "anywhere" variant: either the pages at `base` can be had, or the boot
/// fails.
pub trait PhysicalMemory {
    /// Reserve `pages` 4 KiB pages starting at the page-aligned `base` and
    /// return the reserved bytes for writing.
    ///
    /// # Errors
    /// [`AllocationError`] if the range is unavailable.
    fn allocate_at(
        &mut self,
        base: PhysicalAddress,
        pages: usize,
    ) -> Result<&mut [u8], AllocationError>;
}
