//! # UEFI Kernel Loader
//!
//! Loads `\kernel\kernel.elf` from the boot volume to its physical link
//! address and calls it with a [`KernelBootInfo`]:
//!
//! ```text
//! UEFI firmware
//!     │
//!     ▼
//! ┌────────────────────────────────────────────┐
//! │ 1. validate ELF64 header                   │  kernel_image::KernelImage::read
//! │ 2. place PT_LOAD segments at p_paddr       │  kernel_image::KernelImage::load
//! │ 3. load \files\zap-light16.psf             │  font::load_psf1_font
//! │ 4. pick a GOP mode, describe framebuffer   │  framebuffer::get_framebuffer
//! │ 5. clear console, ExitBootServices, jump   │  handoff::jump_to_kernel
//! └────────────────────────────────────────────┘
//!     │  extern "sysv64" fn(KernelBootInfo) -> !
//!     ▼
//! kernel _start
//! ```
//!
//! Nothing is remapped: the firmware's identity mapping stays active and the
//! kernel runs at the physical addresses it was linked for. Any failure
//! before step 5 is reported on the console and returned to the firmware as
//! a [`Status`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
#![allow(unsafe_code)]
extern crate alloc;

mod error;
mod file_system;
mod font;
mod framebuffer;
mod handoff;
mod logger;
mod memory;

use crate::error::BootError;
use crate::file_system::open_file;
use crate::font::load_psf1_font;
use crate::framebuffer::get_framebuffer;
use crate::logger::UefiLogger;
use crate::memory::UefiPhysicalMemory;
use alloc::boxed::Box;
use core::convert::Infallible;
use kernel_image::KernelImage;
use kernel_info::boot::{FramebufferInfo, KernelBootInfo};
use log::{LevelFilter, error, info};
use uefi::prelude::*;
use uefi::{CStr16, cstr16};

const KERNEL_PATH: &CStr16 = cstr16!("\\kernel\\kernel.elf");
const FONT_PATH: &CStr16 = cstr16!("\\files\\zap-light16.psf");

static LOGGER: UefiLogger = UefiLogger::new(LevelFilter::Debug);

#[entry]
fn efi_main() -> Status {
    if uefi::helpers::init().is_err() {
        return Status::UNSUPPORTED;
    }

    if LOGGER.init().is_err() {
        return Status::ABORTED;
    }

    match boot() {
        Ok(never) => match never {},
        Err(e) => {
            error!("{e}");
            e.into()
        }
    }
}

fn boot() -> Result<Infallible, BootError> {
    info!("UEFI Loader reporting to QEMU");
    info!("Locating kernel file {KERNEL_PATH} ...");
    let mut kernel = open_file(KERNEL_PATH)?;

    let image = KernelImage::read(&mut kernel)?;
    info!("Kernel header successfully verified!");

    let loaded = image.load(&mut kernel, &mut UefiPhysicalMemory)?;
    info!(
        "Kernel loaded successfully: entry={:#x}, {:#x}..{:#x}, {} pages",
        loaded.entry,
        loaded.start(),
        loaded.end(),
        loaded.pages()
    );

    let font = load_psf1_font(FONT_PATH)?;
    let framebuffer: &'static FramebufferInfo = Box::leak(Box::new(get_framebuffer()?));

    let entry = handoff::entry_point(&loaded)?;
    let boot_info = KernelBootInfo::new(framebuffer, font, loaded.start(), loaded.end());

    // SAFETY: the image is loaded, the descriptors are leaked pool memory and
    // nothing below uses boot services.
    unsafe { handoff::jump_to_kernel(entry, boot_info, &LOGGER) }
}
