//! # Physical Memory Layout

/// Size of one physical page, the unit of firmware page allocations.
pub const PAGE_SIZE: u64 = 4096;

/// Where the kernel image is linked and loaded (identity mapped by firmware).
///
/// # Kernel Build
/// This information is sourced in the kernel's `build.rs` to configure
/// the linker.
pub const PHYS_LOAD: u64 = 0x0010_0000; // 1 MiB

/// Size of the kernel's statically reserved heap.
pub const KERNEL_HEAP_SIZE: usize = 1024 * 1024;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(PHYS_LOAD.is_multiple_of(PAGE_SIZE));
    assert!(KERNEL_HEAP_SIZE.is_multiple_of(4096));
};
