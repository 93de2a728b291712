//! # x86 I/O Port Access
//!
//! Thin wrappers around the `in`/`out` instructions for devices that live in
//! the legacy 16-bit **I/O port space** rather than behind MMIO.
//!
//! Two users exist today:
//! * the QEMU debug console (`0x402`, byte writes), and
//! * PCI configuration mechanism #1 (`0xCF8` address / `0xCFC` data,
//!   double-word accesses).
//!
//! ## Safety
//!
//! Every function here is `unsafe`. Callers must
//! * run at CPL0 (or hold I/O permission for the port), otherwise the CPU
//!   raises `#GP`;
//! * target a port that belongs to the intended device, in a state where the
//!   access is valid;
//! * serialize multi-step register protocols (such as the PCI address/data
//!   pair) against any other user of the same ports.
//!
//! `in`/`out` are ordered with respect to each other but are not general
//! memory fences.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

/// Write one byte to an I/O port (`out dx, al`).
///
/// # Safety
/// See the [crate-level](crate) safety requirements.
#[inline]
pub unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val, options(nomem, nostack, preserves_flags));
    }
}

/// Write one double word to an I/O port (`out dx, eax`).
///
/// # Safety
/// See the [crate-level](crate) safety requirements.
#[inline]
pub unsafe fn outl(port: u16, val: u32) {
    unsafe {
        core::arch::asm!("out dx, eax", in("dx") port, in("eax") val, options(nomem, nostack, preserves_flags));
    }
}

/// Read one double word from an I/O port (`in eax, dx`).
///
/// # Safety
/// See the [crate-level](crate) safety requirements.
#[inline]
#[must_use]
pub unsafe fn inl(port: u16) -> u32 {
    let mut v: u32;
    unsafe {
        core::arch::asm!("in eax, dx", in("dx") port, out("eax") v, options(nomem, nostack, preserves_flags));
    }
    v
}
