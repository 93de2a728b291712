//! # Kernel Boot Interface
//!
//! The types in this crate are the contract between the UEFI loader and the
//! kernel. The loader builds them while boot services are still available,
//! the kernel reads them after it has been entered. Neither side can check
//! the other's view of these layouts at compile time, so every structure here
//! is `#[repr(C)]`, uses fixed-size integers, and pins its size and field
//! offsets with `const` assertions.
//!
//! ## Modules
//!
//! * [`boot`]: the handoff record ([`KernelBootInfo`](boot::KernelBootInfo)),
//!   the kernel entry signature ([`KernelEntryFn`](boot::KernelEntryFn)) and
//!   the framebuffer descriptor.
//! * [`font`]: the PSF1 bitmap font header and the font descriptor handed to
//!   the kernel.
//! * [`memory`]: physical layout constants shared with the kernel's linker
//!   script.
//!
//! ## Entry Convention
//!
//! ```rust
//! # use kernel_info::boot::KernelBootInfo;
//! pub type KernelEntryFn = extern "sysv64" fn(KernelBootInfo) -> !;
//! ```
//!
//! * **Calling convention**: System V AMD64, independent of the loader's
//!   own (PE/COFF, `win64`) default.
//! * **Parameter**: the handoff record, passed **by value**. At 40 bytes it
//!   is passed in memory on the caller's stack.
//! * **No return**: the kernel owns the machine from here on.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod font;
pub mod memory;
