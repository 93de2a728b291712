//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for physical addresses and page-granular sizes used
//! by the boot loader when it places kernel segments into physical memory.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address (RAM or MMIO). |
//! | [`PageSize`] | Marker trait carrying the page size in bytes and its shift. |
//! | [`Size4K`] | The 4 KiB base page, the unit of UEFI page allocations. |
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x0010_0042);
//! assert_eq!(pa.align_down::<Size4K>().as_u64(), 0x0010_0000);
//! assert_eq!(pa.offset::<Size4K>(), 0x42);
//! assert_eq!(pages_for::<Size4K>(8192), 2);
//! assert_eq!(pages_for::<Size4K>(8193), 3);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod page_size;
mod physical_address;

pub use page_size::{PageSize, Size4K};
pub use physical_address::PhysicalAddress;

/// Number of `S`-sized pages needed to hold `bytes` bytes, i.e. `ceil(bytes / S::SIZE)`.
#[inline(always)]
#[must_use]
pub const fn pages_for<S: PageSize>(bytes: u64) -> u64 {
    bytes.div_ceil(S::SIZE)
}

/// Round `x` up to the next multiple of `S::SIZE`, or `None` on overflow.
#[inline]
#[must_use]
pub const fn checked_align_up<S: PageSize>(x: u64) -> Option<u64> {
    match x.checked_add(S::SIZE - 1) {
        Some(v) => Some(v & !(S::SIZE - 1)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counts_round_up() {
        assert_eq!(pages_for::<Size4K>(0), 0);
        assert_eq!(pages_for::<Size4K>(1), 1);
        assert_eq!(pages_for::<Size4K>(4096), 1);
        assert_eq!(pages_for::<Size4K>(4097), 2);
        assert_eq!(pages_for::<Size4K>(8192), 2);
    }

    #[test]
    fn align_up_saturates_to_none() {
        assert_eq!(checked_align_up::<Size4K>(0x1001), Some(0x2000));
        assert_eq!(checked_align_up::<Size4K>(0x2000), Some(0x2000));
        assert_eq!(checked_align_up::<Size4K>(u64::MAX), None);
    }

    #[test]
    fn split_address() {
        let pa = PhysicalAddress::new(0x0000_0010_2000_0042);
        assert_eq!(pa.align_down::<Size4K>().as_u64(), 0x0000_0010_2000_0000);
        assert_eq!(pa.offset::<Size4K>(), 0x42);
        assert!(!pa.is_aligned::<Size4K>());
        assert!(pa.align_down::<Size4K>().is_aligned::<Size4K>());
    }
}
