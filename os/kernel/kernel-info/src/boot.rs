//! # Kernel Boot Information

use crate::font::FontInfo;
use core::mem::{offset_of, size_of};

/// Kernel entry point.
///
/// # ABI
/// The loader is a PE/COFF image whose Rust default is `win64`; the kernel
/// is an ELF image. Both sides name the convention explicitly so that the
/// record below is placed identically: `sysv64`, one argument of type
/// [`KernelBootInfo`] passed by value.
///
/// This alias and the layout of [`KernelBootInfo`] are the only places where
/// the two binaries must agree without any compiler check across them.
pub type KernelEntryFn = extern "sysv64" fn(KernelBootInfo) -> !;

/// Everything the kernel receives from the loader.
///
/// Built once, right before the jump, and never mutated afterwards. The
/// descriptors behind the pointers live in loader-data memory that is never
/// freed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct KernelBootInfo {
    /// GOP framebuffer descriptor.
    pub framebuffer: *const FramebufferInfo,

    /// PSF1 console font.
    pub font: *const FontInfo,

    /// Bytes spanned by the loaded segments (`kernel_end - kernel_start`).
    pub kernel_size: u64,

    /// Lowest physical address occupied by a loaded segment.
    pub kernel_start: u64,

    /// One past the highest physical address occupied by a loaded segment.
    pub kernel_end: u64,
}

const _: () = {
    assert!(size_of::<KernelBootInfo>() == 40);
    assert!(offset_of!(KernelBootInfo, framebuffer) == 0);
    assert!(offset_of!(KernelBootInfo, font) == 8);
    assert!(offset_of!(KernelBootInfo, kernel_size) == 16);
    assert!(offset_of!(KernelBootInfo, kernel_start) == 24);
    assert!(offset_of!(KernelBootInfo, kernel_end) == 32);
};

impl KernelBootInfo {
    /// Assemble the handoff record.
    ///
    /// The descriptors must be `'static`: the kernel reads them long after
    /// the loader's stack frames are gone.
    #[must_use]
    pub fn new(
        framebuffer: &'static FramebufferInfo,
        font: &'static FontInfo,
        kernel_start: u64,
        kernel_end: u64,
    ) -> Self {
        debug_assert!(kernel_end >= kernel_start);
        Self {
            framebuffer: core::ptr::from_ref(framebuffer),
            font: core::ptr::from_ref(font),
            kernel_size: kernel_end.saturating_sub(kernel_start),
            kernel_start,
            kernel_end,
        }
    }
}

/// Linear framebuffer obtained from the UEFI Graphics Output Protocol.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct FramebufferInfo {
    /// Linear framebuffer base address (CPU physical address).
    pub framebuffer_ptr: u64,

    /// Total framebuffer size in **bytes**.
    pub framebuffer_size: u64,

    /// Visible width in **pixels**.
    pub framebuffer_width: u32,

    /// Visible height in **pixels**.
    pub framebuffer_height: u32,

    /// Pixels per scan line. May be larger than the width due to padding.
    pub framebuffer_stride: u32,

    /// Byte order of a pixel.
    pub framebuffer_format: BootPixelFormat,
}

const _: () = {
    assert!(size_of::<FramebufferInfo>() == 32);
    assert!(offset_of!(FramebufferInfo, framebuffer_width) == 16);
    assert!(offset_of!(FramebufferInfo, framebuffer_format) == 28);
};

/// Pixel format tag compatible with UEFI GOP.
/// We avoid Rust enums with payloads across the ABI boundary.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BootPixelFormat {
    /// 8:8:8 stored as R, G, B in low-to-high bytes.
    Rgb = 0,
    /// 8:8:8 stored as B, G, R in low-to-high bytes.
    Bgr = 1,
}
