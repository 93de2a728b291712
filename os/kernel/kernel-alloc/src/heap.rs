use crate::BumpArena;
use core::alloc::{GlobalAlloc, Layout};
use core::cell::UnsafeCell;
use core::ptr::{self, NonNull};
use kernel_info::memory::KERNEL_HEAP_SIZE;
use kernel_sync::SpinLock;

/// The kernel's heap at its configured size.
pub type DefaultHeap = KernelHeap<KERNEL_HEAP_SIZE>;

#[repr(C, align(16))]
struct HeapMem<const SIZE: usize>(UnsafeCell<[u8; SIZE]>);

/// A `SIZE`-byte heap that lives inside the value itself.
///
/// Meant to be placed in a `static`; the arena is attached to the storage
/// lazily on the first allocation, once the address is final.
pub struct KernelHeap<const SIZE: usize> {
    storage: HeapMem<SIZE>,
    arena: SpinLock<BumpArena>,
}

// SAFETY: the storage is only handed out through the arena, which is behind the lock.
unsafe impl<const SIZE: usize> Sync for KernelHeap<SIZE> {}

impl<const SIZE: usize> Default for KernelHeap<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> KernelHeap<SIZE> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: HeapMem(UnsafeCell::new([0; SIZE])),
            arena: SpinLock::new(BumpArena::empty()),
        }
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.arena.with_lock(|arena| arena.used())
    }

    pub const fn capacity(&self) -> usize {
        SIZE
    }

    fn with_arena<R>(&self, f: impl FnOnce(&mut BumpArena) -> R) -> R {
        self.arena.with_lock(|arena| {
            if !arena.is_initialized() {
                let start = self.storage.0.get().cast::<u8>() as usize;
                // SAFETY: `storage` is owned by `self` and only reachable through the arena.
                unsafe { arena.init(start, SIZE) };
            }
            f(arena)
        })
    }
}

unsafe impl<const SIZE: usize> GlobalAlloc for KernelHeap<SIZE> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.with_arena(|arena| arena.alloc(layout))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Some(ptr) = NonNull::new(ptr) {
            self.with_arena(|arena| arena.dealloc(ptr, layout));
        }
    }
}
