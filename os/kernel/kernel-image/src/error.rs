use core::fmt;
use kernel_memory_addresses::PhysicalAddress;

/// Why a kernel image could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("The ELF header is invalid: unexpected {0}")]
    InvalidHeader(HeaderField),
    #[error("Short read at offset {offset:#x}: expected {expected} bytes, got {actual}")]
    Read {
        offset: u64,
        expected: usize,
        actual: usize,
    },
    #[error("The image file could not be accessed: {0}")]
    Io(&'static str),
    #[error("Failed to allocate {pages} pages at {address}")]
    AllocationFailed {
        address: PhysicalAddress,
        pages: usize,
    },
    #[error("A segment's file size exceeds its memory size")]
    SegmentSize,
    #[error("A segment's address or size overflows the address space")]
    AddressOverflow,
    #[error("The entry point {entry:#x} lies outside every loaded segment")]
    EntryOutsideImage { entry: u64 },
}

/// The header field that failed validation, in the order they are checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderField {
    Magic,
    Class,
    Endianness,
    FileType,
    Machine,
    Version,
    ProgramHeaderSize,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Magic => "magic",
            Self::Class => "class (expected ELF64)",
            Self::Endianness => "byte order (expected little-endian)",
            Self::FileType => "file type (expected ET_EXEC)",
            Self::Machine => "machine (expected x86-64)",
            Self::Version => "version",
            Self::ProgramHeaderSize => "program header entry size",
        })
    }
}
