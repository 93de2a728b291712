//! # Files on the Boot Volume

use crate::error::BootError;
use alloc::vec;
use alloc::vec::Vec;
use kernel_image::{ImageError, ImageFile};
use log::{debug, warn};
use uefi::proto::media::file::{File, FileAttribute, FileMode, RegularFile};
use uefi::{CStr16, boot};

/// Open a regular file on the volume this image was loaded from.
///
/// # Errors
/// [`BootError::ProtocolNotFound`] without a file system on the boot
/// device, [`BootError::FileNotFound`] if `path` does not name a regular file.
pub fn open_file(path: &'static CStr16) -> Result<EspFile, BootError> {
    let mut sfs = boot::get_image_file_system(boot::image_handle()).map_err(|e| {
        warn!("Failed to get file system: {e:?}");
        BootError::ProtocolNotFound("SimpleFileSystem")
    })?;

    let mut root = sfs.open_volume().map_err(BootError::Read)?;

    let handle = root
        .open(path, FileMode::Read, FileAttribute::empty())
        .map_err(|e| {
            debug!("Opening {path} failed: {:?}", e.status());
            BootError::FileNotFound(path)
        })?;

    handle
        .into_regular_file()
        .map(EspFile)
        .ok_or(BootError::FileNotFound(path))
}

/// A regular file on the boot volume.
pub struct EspFile(RegularFile);

impl EspFile {
    /// Read the whole file.
    ///
    /// # Errors
    /// [`BootError::Read`] if the firmware fails to seek or read.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, BootError> {
        self.0
            .set_position(RegularFile::END_OF_FILE)
            .map_err(BootError::Read)?;
        let size = self.0.get_position().map_err(BootError::Read)?;
        self.0.set_position(0).map_err(BootError::Read)?;

        let size = usize::try_from(size)
            .map_err(|_| BootError::Read(uefi::Error::from(uefi::Status::BAD_BUFFER_SIZE)))?;

        let mut buf = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            let n = self
                .0
                .read(&mut buf[filled..])
                .map_err(|e| BootError::Read(e.to_err_without_payload()))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl ImageFile for EspFile {
    fn seek(&mut self, position: u64) -> Result<(), ImageError> {
        self.0
            .set_position(position)
            .map_err(|_| ImageError::Io("seek on boot volume failed"))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ImageError> {
        self.0
            .read(buf)
            .map_err(|_| ImageError::Io("read from boot volume failed"))
    }
}
