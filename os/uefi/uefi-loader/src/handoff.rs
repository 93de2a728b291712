//! # Kernel Handoff

use crate::logger::UefiLogger;
use kernel_image::{ImageError, LoadedImage};
use kernel_info::boot::{KernelBootInfo, KernelEntryFn};
use kernel_qemu::qemu_trace;
use log::{info, warn};
use uefi::boot;

/// Turn the image's entry address into a callable entry point.
///
/// # Errors
/// [`ImageError::EntryOutsideImage`] if the entry lies outside every loaded
/// segment.
pub fn entry_point(image: &LoadedImage) -> Result<KernelEntryFn, ImageError> {
    let entry = image.checked_entry()?;
    let entry = usize::try_from(entry).map_err(|_| ImageError::AddressOverflow)?;
    // SAFETY: the address lies in a loaded segment of an x86-64 executable
    // whose entry symbol is declared as `KernelEntryFn`.
    Ok(unsafe { core::mem::transmute::<usize, KernelEntryFn>(entry) })
}

/// Leave the firmware behind and call the kernel.
///
/// # Safety
/// `entry` must come from [`entry_point`] for an image that is fully loaded,
/// and everything `boot_info` points to must be leaked `LOADER_DATA` memory.
/// No boot service may be used by anyone after this call begins.
pub unsafe fn jump_to_kernel(
    entry: KernelEntryFn,
    boot_info: KernelBootInfo,
    logger: &UefiLogger,
) -> ! {
    info!("UEFI is about to jump into Kernel land ...");
    // Logged outside the closure: the logger writes to stdout itself.
    if let Err(e) = uefi::system::with_stdout(|out| out.clear()) {
        warn!("Failed to clear the console: {e:?}");
    }
    logger.exit_boot_services();

    // The kernel never hands memory back to the firmware, so the map is not needed.
    let memory_map = unsafe { boot::exit_boot_services(None) };
    core::mem::forget(memory_map);

    trace_boot_info(&boot_info);
    entry(boot_info)
}

fn trace_boot_info(boot_info: &KernelBootInfo) {
    qemu_trace!("Boot Info in UEFI Loader:\n");
    qemu_trace!(
        "   FB ptr = {:018x}, font ptr = {:018x}\n",
        boot_info.framebuffer as usize,
        boot_info.font as usize
    );
    qemu_trace!(
        "   kernel = {:#x}..{:#x} ({} bytes)\n",
        boot_info.kernel_start,
        boot_info.kernel_end,
        boot_info.kernel_size
    );
}
