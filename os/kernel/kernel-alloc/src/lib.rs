//! # Kernel Heap
//!
//! The kernel has no page tables of its own and no physical frame
//! allocator; everything it allocates comes out of one statically reserved
//! region in `.bss`:
//!
//! ```text
//! KernelHeap<SIZE>
//! ┌──────────────────────────────────────────────┐
//! │ allocated ...        │ free ...              │
//! └──────────────────────┴───────────────────────┘
//! ^ start                ^ next                  ^ start + SIZE
//! ```
//!
//! [`BumpArena`] hands out memory by moving `next` forward. Freeing the
//! most recent allocation moves it back; freeing everything resets the
//! arena. [`KernelHeap`] pairs the arena with its storage behind a
//! [`SpinLock`](kernel_sync::SpinLock) and implements `GlobalAlloc`, so the
//! kernel binary only needs:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static ALLOCATOR: kernel_alloc::DefaultHeap = kernel_alloc::DefaultHeap::new();
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod bump;
mod heap;

pub use bump::BumpArena;
pub use heap::{DefaultHeap, KernelHeap};
