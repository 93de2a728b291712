use crate::ImageError;

/// A seekable, readable kernel image.
///
/// Mirrors the firmware file protocol: a position plus reads that may return
/// fewer bytes than requested. Short reads are turned into errors by
/// [`read_exact_at`], never silently accepted.
pub trait ImageFile {
    /// Move the read position to `position` bytes from the start of the file.
    ///
    /// # Errors
    /// Returns [`ImageError::Io`] if the underlying file cannot seek.
    fn seek(&mut self, position: u64) -> Result<(), ImageError>;

    /// Read up to `buf.len()` bytes at the current position and advance it.
    ///
    /// # Errors
    /// Returns [`ImageError::Io`] if the underlying read fails.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError>;
}

/// Fill `buf` completely from `offset`.
///
/// # Errors
/// [`ImageError::Read`] if the file ends before `buf` is full, or any error
/// of the underlying [`ImageFile`].
pub fn read_exact_at<F: ImageFile + ?Sized>(
    file: &mut F,
    offset: u64,
    buf: &mut [u8],
) -> Result<(), ImageError> {
    file.seek(offset)?;

    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled != buf.len() {
        return Err(ImageError::Read {
            offset,
            expected: buf.len(),
            actual: filled,
        });
    }
    Ok(())
}

/// An [`ImageFile`] over an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceFile<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceFile<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }
}

impl ImageFile for SliceFile<'_> {
    fn seek(&mut self, position: u64) -> Result<(), ImageError> {
        // Seeking past the end is allowed; the next read just returns 0.
        self.position = usize::try_from(position).map_err(|_| ImageError::AddressOverflow)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        let remaining = self.bytes.get(self.position..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}
