//! Human-readable vendor and class names for discovery output.

use core::fmt;

/// Known vendors, sorted by ID.
static VENDORS: [(u16, &str); 4] = [
    (0x1022, "AMD"),
    (0x10DE, "NVIDIA Corporation"),
    (0x1234, "QEMU Emulator"),
    (0x8086, "Intel Corp."),
];

/// Class names indexed by class code.
static CLASSES: [&str; 20] = [
    "Unclassified",
    "Mass Storage Controller",
    "Network Controller",
    "Display Controller",
    "Multimedia Controller",
    "Memory Controller",
    "Bridge Device",
    "Simple Communication Controller",
    "Base System Peripheral",
    "Input Device Controller",
    "Docking Station",
    "Processor",
    "Serial Bus Controller",
    "Wireless Controller",
    "Intelligent Controller",
    "Satellite Communication Controller",
    "Encryption Controller",
    "Signal Processing Controller",
    "Processing Accelerator",
    "Non Essential Instrumentation",
];

pub const UNKNOWN_CLASS: &str = "Unknown Class";

/// Name of a vendor, or its ID in hex when unknown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VendorName {
    Known(&'static str),
    Unknown(u16),
}

impl fmt::Display for VendorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => f.write_str(name),
            Self::Unknown(id) => write!(f, "{id:04X}"),
        }
    }
}

#[must_use]
pub fn vendor_name(vendor_id: u16) -> VendorName {
    VENDORS
        .binary_search_by_key(&vendor_id, |&(id, _)| id)
        .map_or(VendorName::Unknown(vendor_id), |i| {
            VendorName::Known(VENDORS[i].1)
        })
}

#[must_use]
pub fn class_name(class: u8) -> &'static str {
    CLASSES
        .get(usize::from(class))
        .copied()
        .unwrap_or(UNKNOWN_CLASS)
}
