use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull, null_mut};
use kernel_image::{AllocationError, PhysicalMemory};
use kernel_info::memory::PAGE_SIZE;
use kernel_memory_addresses::PhysicalAddress;
use log::warn;
use uefi::boot::{self, AllocateType, MemoryType};

/// A UEFI Boot Services pool allocation to back Rust's global allocator.
///
/// # Notes
/// - Valid only while Boot Services are active (before `ExitBootServices`).
/// - Pool memory is `LOADER_DATA`, so leaked allocations survive the
///   handoff and stay readable by the kernel.
/// - We always over-allocate to satisfy alignment and store the original pointer
///   just before the returned aligned block for correct deallocation.
pub struct UefiBootAllocator;

#[global_allocator]
static GLOBAL_ALLOC: UefiBootAllocator = UefiBootAllocator;

unsafe impl GlobalAlloc for UefiBootAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let align = layout.align().max(size_of::<usize>());
        let size = layout.size().max(1);
        let Some(total) = size
            .checked_add(align)
            .and_then(|v| v.checked_add(size_of::<usize>()))
        else {
            return null_mut();
        };

        let Ok(raw) = boot::allocate_pool(MemoryType::LOADER_DATA, total) else {
            return null_mut();
        };

        let raw_ptr = raw.as_ptr();
        let addr = raw_ptr as usize + size_of::<usize>();
        let aligned = (addr + (align - 1)) & !(align - 1);
        let header_ptr = (aligned - size_of::<usize>()) as *mut usize;

        // Store the original allocation pointer just before the aligned region
        unsafe {
            ptr::write(header_ptr, raw_ptr as usize);
        }
        aligned as *mut u8
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if ptr.is_null() {
            return;
        }

        let header_ptr = (ptr as usize - size_of::<usize>()) as *mut usize;
        let orig_ptr = unsafe { ptr::read(header_ptr) as *mut u8 };

        // SAFETY: `orig_ptr` was returned by `allocate_pool` and stored by us.
        let _ = unsafe { boot::free_pool(NonNull::new_unchecked(orig_ptr)) };
    }
}

/// Fixed-address page allocations from boot services.
///
/// Firmware identity-maps all memory while boot services run, so the
/// returned physical pages are directly writable.
pub struct UefiPhysicalMemory;

impl PhysicalMemory for UefiPhysicalMemory {
    fn allocate_at(
        &mut self,
        base: PhysicalAddress,
        pages: usize,
    ) -> Result<&mut [u8], AllocationError> {
        let len = usize::try_from(PAGE_SIZE)
            .ok()
            .and_then(|page| page.checked_mul(pages))
            .ok_or(AllocationError)?;

        let region = boot::allocate_pages(
            AllocateType::Address(base.as_u64()),
            MemoryType::LOADER_DATA,
            pages,
        )
        .map_err(|e| {
            warn!("AllocatePages({base}, {pages}) failed: {:?}", e.status());
            AllocationError
        })?;

        // SAFETY: the firmware just reserved `len` bytes at `region` for us alone.
        Ok(unsafe { core::slice::from_raw_parts_mut(region.as_ptr(), len) })
    }
}
