use kernel_image::{
    AllocationError, HeaderField, ImageError, KernelImage, PhysicalMemory, SliceFile,
};
use kernel_memory_addresses::PhysicalAddress;

const PAGE: usize = 4096;

/// A window of "physical RAM" starting at `base` that records every allocation.
struct FakeRam {
    base: u64,
    bytes: Vec<u8>,
    allocations: Vec<(u64, usize)>,
    deny: bool,
}

impl FakeRam {
    fn new(base: u64, pages: usize) -> Self {
        Self {
            base,
            // Stale content so that missing zero-fill would show up.
            bytes: vec![0xCC; pages * PAGE],
            allocations: Vec::new(),
            deny: false,
        }
    }

    fn at(&self, paddr: u64, len: usize) -> &[u8] {
        let start = usize::try_from(paddr - self.base).unwrap();
        &self.bytes[start..start + len]
    }

    fn pages_allocated(&self) -> usize {
        self.allocations.iter().map(|(_, pages)| pages).sum()
    }
}

impl PhysicalMemory for FakeRam {
    fn allocate_at(
        &mut self,
        base: PhysicalAddress,
        pages: usize,
    ) -> Result<&mut [u8], AllocationError> {
        assert_eq!(base.as_u64() % 4096, 0, "allocations must be page aligned");
        if self.deny || base.as_u64() < self.base {
            return Err(AllocationError);
        }
        let start = usize::try_from(base.as_u64() - self.base).unwrap();
        let end = start + pages * PAGE;
        if end > self.bytes.len() {
            return Err(AllocationError);
        }
        self.allocations.push((base.as_u64(), pages));
        Ok(&mut self.bytes[start..end])
    }
}

struct Segment {
    p_type: u32,
    paddr: u64,
    data: Vec<u8>,
    memsz: u64,
}

impl Segment {
    fn load(paddr: u64, data: Vec<u8>, memsz: u64) -> Self {
        Self {
            p_type: 1,
            paddr,
            data,
            memsz,
        }
    }
}

/// Assemble a minimal x86-64 `ET_EXEC` image: header, program headers, then segment data.
fn build_elf(entry: u64, segments: &[Segment]) -> Vec<u8> {
    let phoff = 64u64;
    let phentsize = 56u16;
    let mut data_offset = phoff + u64::from(phentsize) * segments.len() as u64;

    let mut image = vec![0u8; 64];
    image[0..4].copy_from_slice(b"\x7FELF");
    image[4] = 2;
    image[5] = 1;
    image[6] = 1;
    image[16..18].copy_from_slice(&2u16.to_le_bytes());
    image[18..20].copy_from_slice(&62u16.to_le_bytes());
    image[20..24].copy_from_slice(&1u32.to_le_bytes());
    image[24..32].copy_from_slice(&entry.to_le_bytes());
    image[32..40].copy_from_slice(&phoff.to_le_bytes());
    image[52..54].copy_from_slice(&64u16.to_le_bytes());
    image[54..56].copy_from_slice(&phentsize.to_le_bytes());
    image[56..58].copy_from_slice(&u16::try_from(segments.len()).unwrap().to_le_bytes());

    for seg in segments {
        let mut ph = [0u8; 56];
        ph[0..4].copy_from_slice(&seg.p_type.to_le_bytes());
        ph[4..8].copy_from_slice(&0b101u32.to_le_bytes());
        ph[8..16].copy_from_slice(&data_offset.to_le_bytes());
        ph[16..24].copy_from_slice(&seg.paddr.to_le_bytes());
        ph[24..32].copy_from_slice(&seg.paddr.to_le_bytes());
        ph[32..40].copy_from_slice(&(seg.data.len() as u64).to_le_bytes());
        ph[40..48].copy_from_slice(&seg.memsz.to_le_bytes());
        ph[48..56].copy_from_slice(&4096u64.to_le_bytes());
        image.extend_from_slice(&ph);
        data_offset += seg.data.len() as u64;
    }

    for seg in segments {
        image.extend_from_slice(&seg.data);
    }
    image
}

#[test]
fn loads_single_segment_at_its_physical_address() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 4096], 8192)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    let loaded = image.load(&mut file, &mut ram).unwrap();

    assert!(ram.at(0x10_0000, 4096).iter().all(|&b| b == 0xAA));
    assert_eq!(ram.allocations, vec![(0x10_0000, 2)]);
    assert_eq!(ram.pages_allocated(), loaded.pages());
    assert_eq!(loaded.pages(), 2);
    assert_eq!(loaded.entry, 0x10_0000);
}

#[test]
fn tail_beyond_file_size_is_zeroed() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 4096], 8192)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    image.load(&mut file, &mut ram).unwrap();

    assert!(ram.at(0x10_1000, 4096).iter().all(|&b| b == 0));
    // untouched memory after the segment keeps its old content
    assert!(ram.at(0x10_2000, 16).iter().all(|&b| b == 0xCC));
}

#[test]
fn page_count_rounds_memory_size_up() {
    let file_bytes: Vec<u8> = (0..100u8).collect();
    let elf = build_elf(
        0x10_0000,
        &[
            Segment::load(0x10_0000, file_bytes.clone(), 4097),
            Segment::load(0x10_4000, vec![], 1),
        ],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    let loaded = image.load(&mut file, &mut ram).unwrap();

    assert_eq!(ram.allocations, vec![(0x10_0000, 2), (0x10_4000, 1)]);
    assert_eq!(ram.at(0x10_0000, 100), file_bytes.as_slice());
    assert_eq!(ram.at(0x10_4000, 1), &[0]);
    assert_eq!(loaded.pages(), 3);
}

#[test]
fn unaligned_segment_spans_its_pages() {
    let file_bytes: Vec<u8> = (0..200u8).collect();
    let elf = build_elf(
        0x10_0F80,
        &[Segment::load(0x10_0F80, file_bytes.clone(), 0x200)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    let loaded = image.load(&mut file, &mut ram).unwrap();

    // [0x100F80, 0x101180) crosses into the second page
    assert_eq!(ram.allocations, vec![(0x10_0000, 2)]);
    assert_eq!(ram.at(0x10_0F80, 200), file_bytes.as_slice());
    assert!(ram.at(0x10_0F80 + 200, 0x200 - 200).iter().all(|&b| b == 0));
    assert!(ram.at(0x10_0000, 0xF80).iter().all(|&b| b == 0xCC));
    assert!(ram.at(0x10_1180, 16).iter().all(|&b| b == 0xCC));
    assert_eq!(loaded.start(), 0x10_0F80);
    assert_eq!(loaded.end(), 0x10_1180);
}

#[test]
fn bounds_span_all_loaded_segments() {
    let elf = build_elf(
        0x10_1000,
        &[
            Segment::load(0x10_3000, vec![1; 16], 0x800),
            Segment::load(0x10_0000, vec![2; 16], 0x1000),
        ],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    let loaded = image.load(&mut file, &mut ram).unwrap();

    assert_eq!(loaded.start(), 0x10_0000);
    assert_eq!(loaded.end(), 0x10_3800);
    assert_eq!(loaded.size(), 0x3800);
}

#[test]
fn non_loadable_segments_are_ignored() {
    let mut note = Segment::load(0x10_8000, vec![9; 32], 32);
    note.p_type = 4;
    let elf = build_elf(
        0x10_0000,
        &[note, Segment::load(0x10_0000, vec![7; 8], 8)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    assert_eq!(image.program_headers().len(), 2);

    let loaded = image.load(&mut file, &mut ram).unwrap();
    assert_eq!(ram.allocations, vec![(0x10_0000, 1)]);
    assert_eq!(loaded.segments.len(), 1);
    assert!(ram.at(0x10_8000, 32).iter().all(|&b| b == 0xCC));
}

#[test]
fn invalid_header_loads_nothing() {
    let mut elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 64], 64)],
    );
    elf[18] = 0x28; // EM_ARM

    let mut file = SliceFile::new(&elf);
    let ram = FakeRam::new(0x10_0000, 16);

    assert_eq!(
        KernelImage::read(&mut file).unwrap_err(),
        ImageError::InvalidHeader(HeaderField::Machine)
    );
    assert!(ram.allocations.is_empty());
}

#[test]
fn truncated_program_header_table_is_a_read_error() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 64], 64)],
    );
    let mut file = SliceFile::new(&elf[..100]);

    assert!(matches!(
        KernelImage::read(&mut file),
        Err(ImageError::Read { offset: 64, expected: 56, actual: 36 })
    ));
}

#[test]
fn truncated_segment_data_is_a_read_error() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 64], 64)],
    );
    let mut file = SliceFile::new(&elf[..elf.len() - 1]);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    assert!(matches!(
        image.load(&mut file, &mut ram),
        Err(ImageError::Read { expected: 64, actual: 63, .. })
    ));
}

#[test]
fn denied_allocation_is_fatal() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 64], 8192)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);
    ram.deny = true;

    let image = KernelImage::read(&mut file).unwrap();
    assert_eq!(
        image.load(&mut file, &mut ram).unwrap_err(),
        ImageError::AllocationFailed {
            address: PhysicalAddress::new(0x10_0000),
            pages: 2
        }
    );
}

#[test]
fn file_size_larger_than_memory_size_is_rejected() {
    let elf = build_elf(
        0x10_0000,
        &[Segment::load(0x10_0000, vec![0xAA; 64], 32)],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let image = KernelImage::read(&mut file).unwrap();
    assert_eq!(
        image.load(&mut file, &mut ram).unwrap_err(),
        ImageError::SegmentSize
    );
    assert!(ram.allocations.is_empty());
}

#[test]
fn entry_inside_a_later_segment_is_accepted() {
    let elf = build_elf(
        0x10_4010,
        &[
            Segment::load(0x10_0000, vec![1; 16], 0x1000),
            Segment::load(0x10_4000, vec![2; 16], 0x20),
        ],
    );
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let loaded = KernelImage::read(&mut file)
        .unwrap()
        .load(&mut file, &mut ram)
        .unwrap();

    assert!(loaded.entry_in_image());
    assert_eq!(loaded.checked_entry(), Ok(0x10_4010));
}

#[test]
fn entry_outside_loaded_segments_is_rejected() {
    let elf = build_elf(0x20_0000, &[Segment::load(0x10_0000, vec![0xAA; 8], 8)]);
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let loaded = KernelImage::read(&mut file)
        .unwrap()
        .load(&mut file, &mut ram)
        .unwrap();

    assert!(!loaded.entry_in_image());
    let err = loaded.checked_entry().unwrap_err();
    assert_eq!(err, ImageError::EntryOutsideImage { entry: 0x20_0000 });
    assert_eq!(
        err.to_string(),
        "The entry point 0x200000 lies outside every loaded segment"
    );
}

#[test]
fn entry_one_past_the_segment_end_is_rejected() {
    let elf = build_elf(0x10_0008, &[Segment::load(0x10_0000, vec![0xAA; 8], 8)]);
    let mut file = SliceFile::new(&elf);
    let mut ram = FakeRam::new(0x10_0000, 16);

    let loaded = KernelImage::read(&mut file)
        .unwrap()
        .load(&mut file, &mut ram)
        .unwrap();

    assert_eq!(
        loaded.checked_entry(),
        Err(ImageError::EntryOutsideImage { entry: 0x10_0008 })
    );
}
