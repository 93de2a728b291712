use core::alloc::Layout;
use core::ptr::NonNull;

/// A bump allocator over `[start, end)`.
///
/// Only the address range is tracked; the arena never touches the memory
/// it manages.
#[derive(Debug)]
pub struct BumpArena {
    start: usize,
    end: usize,
    next: usize,
    live: usize,
}

impl BumpArena {
    /// An arena without memory; every allocation fails until [`init`](Self::init).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            next: 0,
            live: 0,
        }
    }

    /// Manage `size` bytes at `start`.
    ///
    /// # Safety
    /// The range must be valid for writes, unused by anything else and must
    /// outlive every allocation made from the arena.
    pub const unsafe fn init(&mut self, start: usize, size: usize) {
        self.start = start;
        self.end = start.saturating_add(size);
        self.next = start;
        self.live = 0;
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.end != 0
    }

    /// Bytes consumed, including alignment padding.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.next - self.start
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.end - self.next
    }

    /// Number of allocations not yet released.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }

    /// Reserve memory for `layout`, or `None` if the arena is exhausted.
    pub fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let begin = self.next.checked_next_multiple_of(layout.align())?;
        let end = begin.checked_add(layout.size())?;
        if end > self.end {
            return None;
        }

        self.next = end;
        self.live += 1;
        NonNull::new(begin as *mut u8)
    }

    /// Release an allocation made with the same `layout`.
    ///
    /// The last allocation is rolled back; other space is reclaimed only
    /// once every allocation has been released.
    pub fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        let addr = ptr.as_ptr() as usize;
        debug_assert!(addr >= self.start && addr + layout.size() <= self.next);

        self.live = self.live.saturating_sub(1);
        if self.live == 0 {
            self.next = self.start;
        } else if addr + layout.size() == self.next {
            self.next = addr;
        }
    }
}
