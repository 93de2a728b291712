use kernel_image::ImageError;
use uefi::{CStr16, Status};

/// Why the loader gave up. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("The {0} protocol is not available")]
    ProtocolNotFound(&'static str),
    #[error("Unable to locate file {0}")]
    FileNotFound(&'static CStr16),
    #[error("Invalid {0} header")]
    InvalidHeader(&'static str),
    #[error("No graphics mode with a supported pixel format")]
    UnsupportedPixelFormat,
    #[error("A firmware memory allocation failed")]
    AllocationFailed(#[source] uefi::Error),
    #[error("Failed to read from the boot volume")]
    Read(#[source] uefi::Error),
    #[error("Failed to load the kernel image: {0}")]
    Image(#[from] ImageError),
}

impl From<BootError> for Status {
    fn from(value: BootError) -> Self {
        match value {
            BootError::ProtocolNotFound(_) | BootError::UnsupportedPixelFormat => Self::UNSUPPORTED,
            BootError::FileNotFound(_) => Self::NOT_FOUND,
            BootError::InvalidHeader(_)
            | BootError::Image(
                ImageError::InvalidHeader(_) | ImageError::EntryOutsideImage { .. },
            ) => Self::LOAD_ERROR,
            BootError::AllocationFailed(_) | BootError::Image(ImageError::AllocationFailed { .. }) => {
                Self::OUT_OF_RESOURCES
            }
            BootError::Read(_) | BootError::Image(ImageError::Io(_)) => Self::DEVICE_ERROR,
            BootError::Image(ImageError::Read { .. }) => Self::END_OF_FILE,
            BootError::Image(ImageError::SegmentSize | ImageError::AddressOverflow) => {
                Self::BAD_BUFFER_SIZE
            }
        }
    }
}
