//! # GOP for the Kernel

use crate::error::BootError;
use kernel_info::boot::{BootPixelFormat, FramebufferInfo};
use log::{debug, info, warn};
use uefi::boot::{self, ScopedProtocol};
use uefi::proto::console::gop::{GraphicsOutput, Mode, PixelFormat};

/// Vertical resolution picked when the firmware offers it.
const PREFERRED_HEIGHT: usize = 1080;

/// Switch to a linear RGB/BGR mode and describe its framebuffer.
///
/// # Errors
/// [`BootError::ProtocolNotFound`] without GOP,
/// [`BootError::UnsupportedPixelFormat`] if no mode has a linear framebuffer.
pub fn get_framebuffer() -> Result<FramebufferInfo, BootError> {
    let mut gop = get_gop()?;
    info!("GOP located!");

    let (width, height) = gop.current_mode_info().resolution();
    debug!("Current mode {width} x {height} px");

    if let Some(mode) = select_mode(&gop) {
        let (w, h) = mode.info().resolution();
        debug!("Switching to {w} x {h} px");
        if let Err(e) = gop.set_mode(&mode) {
            warn!("Failed to set GOP mode: {e:?}; keeping the current one");
        }
    }

    let mode = gop.current_mode_info();
    let framebuffer_format = match mode.pixel_format() {
        PixelFormat::Rgb => BootPixelFormat::Rgb,
        PixelFormat::Bgr => BootPixelFormat::Bgr,
        PixelFormat::Bitmask | PixelFormat::BltOnly => {
            return Err(BootError::UnsupportedPixelFormat);
        }
    };

    let (width, height) = mode.resolution();
    let mut fb = gop.frame_buffer();

    let info = FramebufferInfo {
        framebuffer_ptr: fb.as_mut_ptr() as u64,
        framebuffer_size: fb.size() as u64,
        framebuffer_width: to_u32(width)?,
        framebuffer_height: to_u32(height)?,
        framebuffer_stride: to_u32(mode.stride())?,
        framebuffer_format,
    };
    Ok(info)
}

/// The 1080p mode if there is one, otherwise the largest linear mode.
fn select_mode(gop: &ScopedProtocol<GraphicsOutput>) -> Option<Mode> {
    let linear = || {
        gop.modes().filter(|mode| {
            matches!(
                mode.info().pixel_format(),
                PixelFormat::Rgb | PixelFormat::Bgr
            )
        })
    };

    linear()
        .find(|mode| mode.info().resolution().1 == PREFERRED_HEIGHT)
        .or_else(|| {
            linear().max_by_key(|mode| {
                let (w, h) = mode.info().resolution();
                w * h
            })
        })
}

fn to_u32(value: usize) -> Result<u32, BootError> {
    u32::try_from(value).map_err(|_| BootError::UnsupportedPixelFormat)
}

/// Fetch the Graphics Output Protocol (GOP).
fn get_gop() -> Result<ScopedProtocol<GraphicsOutput>, BootError> {
    let handle = boot::get_handle_for_protocol::<GraphicsOutput>().map_err(|e| {
        warn!("Unable to locate GOP: {e:?}");
        BootError::ProtocolNotFound("GraphicsOutput")
    })?;

    boot::open_protocol_exclusive::<GraphicsOutput>(handle).map_err(|e| {
        warn!("Failed to open GOP exclusively: {e:?}");
        BootError::ProtocolNotFound("GraphicsOutput")
    })
}
