//! # ELF Segment Loader

use crate::file::{ImageFile, read_exact_at};
use crate::{ElfHeader, ImageError, PhysicalMemory, ProgramHeader};
use alloc::vec;
use alloc::vec::Vec;
use kernel_memory_addresses::{PhysicalAddress, Size4K, checked_align_up, pages_for};
use log::{debug, info};

/// A validated kernel image whose program headers have been read.
#[derive(Debug, Clone)]
pub struct KernelImage {
    header: ElfHeader,
    program_headers: Vec<ProgramHeader>,
}

impl KernelImage {
    /// Validate the executable header and read the program header table in
    /// one bulk read of `phnum * phentsize` bytes.
    ///
    /// # Errors
    /// [`ImageError::InvalidHeader`] if validation fails, [`ImageError::Read`]
    /// if the file is too short for the header or the table.
    pub fn read<F: ImageFile + ?Sized>(file: &mut F) -> Result<Self, ImageError> {
        let header = ElfHeader::read(file)?;
        debug!(
            "ELF header valid: entry={:#x}, {} program headers at {:#x}",
            header.entry, header.phnum, header.phoff
        );

        let mut table = vec![0u8; header.program_header_table_len()];
        read_exact_at(file, header.phoff, &mut table)?;

        let program_headers =
            ProgramHeader::decode_table(&table, usize::from(header.phentsize)).collect();

        Ok(Self {
            header,
            program_headers,
        })
    }

    #[must_use]
    pub const fn header(&self) -> &ElfHeader {
        &self.header
    }

    #[must_use]
    pub fn program_headers(&self) -> &[ProgramHeader] {
        &self.program_headers
    }

    /// Place every `PT_LOAD` segment at its physical address.
    ///
    /// For each loadable segment the page-aligned window around
    /// `[p_paddr, p_paddr + p_memsz)` is allocated at exactly that address,
    /// the first `p_filesz` bytes are read from `p_offset` and the rest of
    /// the segment is zeroed. All other segment types are skipped.
    ///
    /// # Errors
    /// [`ImageError::SegmentSize`] / [`ImageError::AddressOverflow`] for
    /// malformed segments, [`ImageError::AllocationFailed`] if the firmware
    /// refuses the fixed address, [`ImageError::Read`] on a short read.
    pub fn load<F, M>(&self, file: &mut F, memory: &mut M) -> Result<LoadedImage, ImageError>
    where
        F: ImageFile + ?Sized,
        M: PhysicalMemory + ?Sized,
    {
        let mut segments = Vec::new();

        for ph in &self.program_headers {
            if !ph.is_loadable() {
                debug!("Skipping {:?} segment at offset {:#x}", ph.kind, ph.offset);
                continue;
            }
            if ph.memsz == 0 {
                debug!("Skipping empty PT_LOAD segment at {:#x}", ph.paddr);
                continue;
            }

            let segment = load_segment(ph, file, memory)?;
            info!(
                "Loaded segment {}..{:#x} ({} bytes from file, {} pages)",
                segment.paddr,
                segment.end(),
                segment.filesz,
                segment.pages
            );
            segments.push(segment);
        }

        Ok(LoadedImage {
            entry: self.header.entry,
            segments,
        })
    }
}

fn load_segment<F, M>(
    ph: &ProgramHeader,
    file: &mut F,
    memory: &mut M,
) -> Result<LoadedSegment, ImageError>
where
    F: ImageFile + ?Sized,
    M: PhysicalMemory + ?Sized,
{
    if ph.filesz > ph.memsz {
        return Err(ImageError::SegmentSize);
    }

    let paddr = PhysicalAddress::new(ph.paddr);
    let seg_end = paddr
        .checked_add(ph.memsz)
        .ok_or(ImageError::AddressOverflow)?;

    // Page-rounded allocation window; equals ceil(memsz / 4096) pages for aligned segments.
    let alloc_start = paddr.align_down::<Size4K>();
    let alloc_end =
        checked_align_up::<Size4K>(seg_end.as_u64()).ok_or(ImageError::AddressOverflow)?;
    let pages = usize::try_from(pages_for::<Size4K>(alloc_end - alloc_start.as_u64()))
        .map_err(|_| ImageError::AddressOverflow)?;

    let region = memory
        .allocate_at(alloc_start, pages)
        .map_err(|_| ImageError::AllocationFailed {
            address: alloc_start,
            pages,
        })?;

    let in_page = usize::try_from(paddr.offset::<Size4K>()).map_err(|_| ImageError::AddressOverflow)?;
    let filesz = usize::try_from(ph.filesz).map_err(|_| ImageError::AddressOverflow)?;
    let memsz = usize::try_from(ph.memsz).map_err(|_| ImageError::AddressOverflow)?;

    let segment_bytes = region
        .get_mut(in_page..in_page + memsz)
        .ok_or(ImageError::AddressOverflow)?;
    let (file_part, bss_part) = segment_bytes.split_at_mut(filesz);

    read_exact_at(file, ph.offset, file_part)?;
    bss_part.fill(0);

    Ok(LoadedSegment {
        paddr,
        filesz: ph.filesz,
        memsz: ph.memsz,
        pages,
    })
}

/// A segment that now lives at its physical address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedSegment {
    /// First byte of the segment.
    pub paddr: PhysicalAddress,
    /// Bytes copied from the file.
    pub filesz: u64,
    /// Bytes occupied in memory; `[filesz, memsz)` is zeroed.
    pub memsz: u64,
    /// 4 KiB pages allocated for the segment.
    pub pages: usize,
}

impl LoadedSegment {
    /// One past the last byte of the segment.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.paddr.as_u64() + self.memsz
    }
}

/// The result of loading: where execution starts and what was placed where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub entry: u64,
    pub segments: Vec<LoadedSegment>,
}

impl LoadedImage {
    /// Lowest physical address covered by a loaded segment, or 0 if none was loaded.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| s.paddr.as_u64())
            .min()
            .unwrap_or_default()
    }

    /// One past the highest physical address covered by a loaded segment, or 0.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.segments
            .iter()
            .map(LoadedSegment::end)
            .max()
            .unwrap_or_default()
    }

    /// Bytes spanned from [`start`](Self::start) to [`end`](Self::end).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.end() - self.start()
    }

    /// Whether [`entry`](Self::entry) falls inside one of the loaded segments.
    #[must_use]
    pub fn entry_in_image(&self) -> bool {
        self.segments
            .iter()
            .any(|s| (s.paddr.as_u64()..s.end()).contains(&self.entry))
    }

    /// The entry address, provided it lies inside the loaded image.
    ///
    /// # Errors
    /// [`ImageError::EntryOutsideImage`] if no loaded segment contains it.
    pub fn checked_entry(&self) -> Result<u64, ImageError> {
        if self.entry_in_image() {
            Ok(self.entry)
        } else {
            Err(ImageError::EntryOutsideImage { entry: self.entry })
        }
    }

    /// Total 4 KiB pages allocated across all segments.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.segments.iter().map(|s| s.pages).sum()
    }
}
