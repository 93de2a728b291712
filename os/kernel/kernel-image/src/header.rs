//! # ELF Header Validation

use crate::file::{ImageFile, read_exact_at};
use crate::program_header::Elf64Phdr;
use crate::{HeaderField, ImageError};
use core::mem::size_of;
use core::ptr::read_unaligned;

// Minimal ELF64 definitions
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
struct Elf64Ehdr {
    e_ident: [u8; 16],
    e_type: u16,
    e_machine: u16,
    e_version: u32,
    e_entry: u64,
    e_phoff: u64,
    e_shoff: u64,
    e_flags: u32,
    e_ehsize: u16,
    e_phentsize: u16,
    e_phnum: u16,
    e_shentsize: u16,
    e_shnum: u16,
    e_shstrndx: u16,
}

const _: () = assert!(size_of::<Elf64Ehdr>() == ElfHeader::SIZE);

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;

const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ET_EXEC: u16 = 2;
const EM_X86_64: u16 = 62;
const EV_CURRENT: u32 = 1;

/// The validated parts of an ELF64 executable header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    /// Entry point address; the kernel is linked to run where it is loaded.
    pub entry: u64,
    /// File offset of the program header table.
    pub phoff: u64,
    /// Size of one program header table entry.
    pub phentsize: u16,
    /// Number of program header table entries.
    pub phnum: u16,
}

impl ElfHeader {
    /// Size of `Elf64_Ehdr` in bytes.
    pub const SIZE: usize = 64;

    const MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

    /// Read and validate the header at the start of `file`.
    ///
    /// # Errors
    /// [`ImageError::Read`] on a short read, [`ImageError::InvalidHeader`] if
    /// validation fails.
    pub fn read<F: ImageFile + ?Sized>(file: &mut F) -> Result<Self, ImageError> {
        let mut bytes = [0u8; Self::SIZE];
        read_exact_at(file, 0, &mut bytes)?;
        Self::parse(&bytes)
    }

    /// Validate a raw 64-bit little-endian x86-64 executable header.
    ///
    /// The checks run in a fixed order (magic, class, byte order, type,
    /// machine, version) and the first mismatch is reported. Every field must
    /// match; there is no partial acceptance.
    ///
    /// # Errors
    /// Returns [`ImageError::InvalidHeader`] naming the offending field.
    pub fn parse(bytes: &[u8; Self::SIZE]) -> Result<Self, ImageError> {
        // SAFETY: `bytes` is exactly one header long; read_unaligned avoids alignment assumptions.
        let ehdr = unsafe { read_unaligned(bytes.as_ptr().cast::<Elf64Ehdr>()) };

        if ehdr.e_ident[0..4] != Self::MAGIC {
            return Err(ImageError::InvalidHeader(HeaderField::Magic));
        }
        if ehdr.e_ident[EI_CLASS] != ELFCLASS64 {
            return Err(ImageError::InvalidHeader(HeaderField::Class));
        }
        if ehdr.e_ident[EI_DATA] != ELFDATA2LSB {
            return Err(ImageError::InvalidHeader(HeaderField::Endianness));
        }

        // From here on fields are multi-byte; the image is little-endian like the host.
        let e_type = u16::from_le(ehdr.e_type);
        let e_machine = u16::from_le(ehdr.e_machine);
        let e_version = u32::from_le(ehdr.e_version);

        if e_type != ET_EXEC {
            return Err(ImageError::InvalidHeader(HeaderField::FileType));
        }
        if e_machine != EM_X86_64 {
            return Err(ImageError::InvalidHeader(HeaderField::Machine));
        }
        if e_version != EV_CURRENT {
            return Err(ImageError::InvalidHeader(HeaderField::Version));
        }

        let phentsize = u16::from_le(ehdr.e_phentsize);
        let phnum = u16::from_le(ehdr.e_phnum);
        if phnum != 0 && usize::from(phentsize) < size_of::<Elf64Phdr>() {
            return Err(ImageError::InvalidHeader(HeaderField::ProgramHeaderSize));
        }

        Ok(Self {
            entry: u64::from_le(ehdr.e_entry),
            phoff: u64::from_le(ehdr.e_phoff),
            phentsize,
            phnum,
        })
    }

    /// Size of the whole program header table in bytes.
    #[must_use]
    pub fn program_header_table_len(&self) -> usize {
        usize::from(self.phnum) * usize::from(self.phentsize)
    }
}
