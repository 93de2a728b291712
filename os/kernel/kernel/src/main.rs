//! # Kernel Entry Point

#![no_std]
#![no_main]
#![allow(unsafe_code)]

mod pci;

use core::hint::spin_loop;
use kernel_info::boot::{FramebufferInfo, KernelBootInfo};
use kernel_info::font::FontInfo;
use kernel_qemu::{QemuLogger, qemu_trace};
use log::{LevelFilter, error, info};

#[global_allocator]
static ALLOCATOR: kernel_alloc::DefaultHeap = kernel_alloc::DefaultHeap::new();

static LOGGER: QemuLogger = QemuLogger::new(LevelFilter::Info);

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    qemu_trace!("Kernel panic: {info}\n");
    halt()
}

/// The kernel entry point.
///
/// # UEFI Interaction
/// The loader calls this after `ExitBootServices`, through
/// [`KernelEntryFn`](kernel_info::boot::KernelEntryFn). The record arrives
/// by value; the descriptors it points to stay valid for the lifetime of
/// the kernel.
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text._start")]
pub extern "sysv64" fn _start(boot_info: KernelBootInfo) -> ! {
    qemu_trace!("Kernel reporting to QEMU!\n");

    if LOGGER.init().is_err() {
        qemu_trace!("Logger was already installed\n");
    }

    trace_boot_info(&boot_info);

    match pci::init() {
        Ok(found) => info!("[PCI] {found} devices registered"),
        Err(e) => error!("[PCI] Discovery incomplete: {e}"),
    }
    pci::dump();

    info!("Kernel initialized, halting");
    halt()
}

fn trace_boot_info(boot_info: &KernelBootInfo) {
    info!(
        "Kernel image at {:#x}..{:#x} ({} bytes)",
        boot_info.kernel_start, boot_info.kernel_end, boot_info.kernel_size
    );

    // SAFETY: the loader hands over pointers to leaked loader-data allocations.
    let framebuffer: Option<&FramebufferInfo> = unsafe { boot_info.framebuffer.as_ref() };
    if let Some(fb) = framebuffer {
        info!(
            "Framebuffer {:#x} ({} bytes), {}x{} stride {} {:?}",
            fb.framebuffer_ptr,
            fb.framebuffer_size,
            fb.framebuffer_width,
            fb.framebuffer_height,
            fb.framebuffer_stride,
            fb.framebuffer_format
        );
    }

    // SAFETY: see above.
    let font: Option<&FontInfo> = unsafe { boot_info.font.as_ref() };
    if let Some(font) = font {
        info!(
            "PSF1 font: {} glyphs, {} bytes each",
            font.header.glyph_count(),
            font.header.charsize
        );
    }
}

fn halt() -> ! {
    loop {
        spin_loop();
    }
}
