//! # PSF1 Console Font
//!
//! A PSF1 file is a 4-byte header followed directly by the glyph bitmaps:
//!
//! ```text
//! offset 0   magic[0] = 0x36
//! offset 1   magic[1] = 0x04
//! offset 2   mode     (bit 0: 512 glyphs instead of 256)
//! offset 3   charsize (bytes per glyph = glyph cell height, 8 pixels wide)
//! offset 4   glyphs   (charsize * glyph count bytes)
//! ```

use core::mem::{offset_of, size_of};

/// The raw PSF1 header as it appears in the file.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Psf1Header {
    pub magic: [u8; 2],
    pub mode: u8,
    pub charsize: u8,
}

const _: () = assert!(size_of::<Psf1Header>() == Psf1Header::SIZE);

/// Bitfield view of [`Psf1Header::mode`].
#[bitfield_struct::bitfield(u8)]
pub struct Psf1Mode {
    /// The font carries 512 glyphs instead of 256.
    pub has_512_glyphs: bool,
    /// A unicode mapping table follows the glyphs.
    pub has_unicode_table: bool,
    /// The unicode table contains sequences.
    pub has_sequences: bool,
    #[bits(5)]
    __: u8,
}

impl Psf1Header {
    pub const MAGIC: [u8; 2] = [0x36, 0x04];
    pub const SIZE: usize = 4;

    /// Decode a header from the first bytes of a font file.
    ///
    /// Returns `None` if fewer than [`Self::SIZE`] bytes are given or the
    /// magic does not match; never a partially filled header.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let [m0, m1, mode, charsize, ..] = *bytes else {
            return None;
        };
        if [m0, m1] != Self::MAGIC {
            return None;
        }
        Some(Self {
            magic: [m0, m1],
            mode,
            charsize,
        })
    }

    #[must_use]
    pub const fn mode(&self) -> Psf1Mode {
        Psf1Mode::from_bits(self.mode)
    }

    #[must_use]
    pub const fn glyph_count(&self) -> usize {
        if self.mode().has_512_glyphs() {
            512
        } else {
            256
        }
    }

    /// Size of the glyph bitmap buffer that follows the header.
    #[must_use]
    pub const fn glyph_buffer_len(&self) -> usize {
        self.charsize as usize * self.glyph_count()
    }
}

/// The font handed to the kernel: header plus the loaded glyph bitmaps.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct FontInfo {
    pub header: Psf1Header,
    /// Physical (identity mapped) address of the glyph buffer.
    pub glyph_buffer: *const u8,
    /// Length of the glyph buffer in bytes.
    pub glyph_buffer_len: u64,
}

const _: () = {
    assert!(offset_of!(FontInfo, glyph_buffer) == 8);
    assert!(size_of::<FontInfo>() == 24);
};

impl FontInfo {
    #[must_use]
    pub fn new(header: Psf1Header, glyphs: &'static [u8]) -> Self {
        Self {
            header,
            glyph_buffer: glyphs.as_ptr(),
            glyph_buffer_len: glyphs.len() as u64,
        }
    }
}
