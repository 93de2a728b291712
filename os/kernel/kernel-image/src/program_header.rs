//! # Program Header Table

use core::mem::size_of;
use core::ptr::read_unaligned;

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
pub(crate) struct Elf64Phdr {
    p_type: u32,
    p_flags: u32,
    p_offset: u64,
    p_vaddr: u64,
    p_paddr: u64,
    p_filesz: u64,
    p_memsz: u64,
    p_align: u64,
}

const _: () = assert!(size_of::<Elf64Phdr>() == 56);

const PT_NULL: u32 = 0;
const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;
const PT_INTERP: u32 = 3;
const PT_NOTE: u32 = 4;
const PT_PHDR: u32 = 6;
const PT_TLS: u32 = 7;

/// `p_type`, with the values the loader logs by name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Phdr,
    Tls,
    Other(u32),
}

impl From<u32> for SegmentKind {
    fn from(value: u32) -> Self {
        match value {
            PT_NULL => Self::Null,
            PT_LOAD => Self::Load,
            PT_DYNAMIC => Self::Dynamic,
            PT_INTERP => Self::Interp,
            PT_NOTE => Self::Note,
            PT_PHDR => Self::Phdr,
            PT_TLS => Self::Tls,
            other => Self::Other(other),
        }
    }
}

/// One decoded `Elf64_Phdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeader {
    pub kind: SegmentKind,
    pub flags: PFlags,
    pub offset: u64,
    pub vaddr: u64,
    pub paddr: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub align: u64,
}

impl ProgramHeader {
    /// Decode every `entsize`-strided entry of a program header table.
    ///
    /// `table` must hold `count * entsize` bytes and, unless it is empty,
    /// `entsize` must be at least the size of an `Elf64_Phdr`; both are
    /// guaranteed by a validated [`ElfHeader`](crate::ElfHeader).
    pub(crate) fn decode_table(
        table: &[u8],
        entsize: usize,
    ) -> impl Iterator<Item = Self> + '_ {
        // An empty table may declare a zero entry size.
        let entsize = entsize.max(size_of::<Elf64Phdr>());
        table
            .chunks_exact(entsize)
            .map(|entry| {
                // SAFETY: each chunk is at least one Elf64_Phdr long (checked above and at header validation).
                let ph = unsafe { read_unaligned(entry.as_ptr().cast::<Elf64Phdr>()) };
                Self {
                    kind: SegmentKind::from(u32::from_le(ph.p_type)),
                    flags: PFlags::from_bits(u32::from_le(ph.p_flags)),
                    offset: u64::from_le(ph.p_offset),
                    vaddr: u64::from_le(ph.p_vaddr),
                    paddr: u64::from_le(ph.p_paddr),
                    filesz: u64::from_le(ph.p_filesz),
                    memsz: u64::from_le(ph.p_memsz),
                    align: u64::from_le(ph.p_align),
                }
            })
    }

    #[must_use]
    pub const fn is_loadable(&self) -> bool {
        matches!(self.kind, SegmentKind::Load)
    }
}

/// Bitfield wrapper for `Elf64_Phdr.p_flags` (32-bit)
///
/// Layout (LSB→MSB):
/// - bit 0: execute
/// - bit 1: write
/// - bit 2: read
/// - bits 3..31: reserved (must be zero for standard flags)
#[bitfield_struct::bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PFlags {
    pub execute: bool,
    pub write: bool,
    pub read: bool,
    #[bits(29)]
    __: u32,
}
