//! # PSF1 Console Font

use crate::error::BootError;
use crate::file_system::open_file;
use alloc::boxed::Box;
use kernel_info::font::{FontInfo, Psf1Header};
use log::{info, warn};
use uefi::CStr16;

/// Load a PSF1 font and leak it for the kernel.
///
/// Only the header and the `charsize * glyphs` bitmap bytes are kept; an
/// optional unicode table after the glyphs is ignored.
///
/// # Errors
/// [`BootError::FileNotFound`] if the file is missing,
/// [`BootError::InvalidHeader`] if the magic is wrong or the glyphs are
/// truncated, [`BootError::Read`] on firmware read errors.
pub fn load_psf1_font(path: &'static CStr16) -> Result<&'static FontInfo, BootError> {
    let bytes = open_file(path)?.read_to_end()?;

    let header = Psf1Header::parse(&bytes).ok_or_else(|| {
        warn!("{path} is not a PSF1 font");
        BootError::InvalidHeader("PSF1")
    })?;

    let glyphs = bytes
        .get(Psf1Header::SIZE..Psf1Header::SIZE + header.glyph_buffer_len())
        .ok_or(BootError::InvalidHeader("PSF1"))?;
    let glyphs: &'static [u8] = Box::leak(Box::from(glyphs));

    info!(
        "Font file {path} found and loaded! ({} glyphs of {} bytes)",
        header.glyph_count(),
        header.charsize
    );
    Ok(Box::leak(Box::new(FontInfo::new(header, glyphs))))
}
