//! # Kernel synchronization primitives
//!
//! The kernel is single-threaded while it discovers hardware, but its
//! process-wide state (the PCI registry, the heap cursor) is still reached
//! through a lock so that later subsystems can run concurrently with it.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
