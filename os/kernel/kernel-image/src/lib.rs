//! # Kernel Image Loading
//!
//! Validates an ELF64 kernel image and places its `PT_LOAD` segments at the
//! physical addresses they were linked for.
//!
//! ```text
//!  kernel.elf                            physical memory
//! ┌────────────┐  1. validate header
//! │ Elf64_Ehdr │──────────────┐
//! ├────────────┤              │
//! │ Elf64_Phdr │  2. one bulk read of the table
//! │ Elf64_Phdr │──────────────┤
//! ├────────────┤              │          p_paddr ┌──────────────┐
//! │  segment   │  3. allocate at p_paddr, copy   │ p_filesz     │
//! │   bytes    │─────────────────────────────────│ file bytes   │
//! └────────────┘  4. zero [p_filesz, p_memsz)    ├──────────────┤
//!                                                │ zeroes (BSS) │
//!                                    + p_memsz   └──────────────┘
//! ```
//!
//! Firmware is reached through two small traits so the same code runs under
//! UEFI and in host tests:
//!
//! * [`ImageFile`]: positioned reads from the kernel file.
//! * [`PhysicalMemory`]: page allocations at a fixed physical address.
//!
//! Every failure is fatal for the boot: there is no partial load, no
//! relocation and no retry.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod error;
mod file;
mod header;
mod loader;
mod memory;
mod program_header;

pub use error::{HeaderField, ImageError};
pub use file::{ImageFile, SliceFile, read_exact_at};
pub use header::ElfHeader;
pub use loader::{KernelImage, LoadedImage, LoadedSegment};
pub use memory::{AllocationError, PhysicalMemory};
pub use program_header::{PFlags, ProgramHeader, SegmentKind};
