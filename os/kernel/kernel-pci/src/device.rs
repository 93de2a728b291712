use crate::PciLocation;
use crate::names::{class_name, vendor_name};
use core::fmt;

/// Index of a driver in the registry's driver arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverId(pub(crate) usize);

/// One PCI function that answered with a valid vendor ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciDevice {
    pub location: PciLocation,
    pub vendor_id: u16,
    pub device_id: u16,
    pub class: u8,
    pub subclass: u8,
    /// Driver bound by [`PciRegistry::bind_drivers`](crate::PciRegistry::bind_drivers).
    pub driver: Option<DriverId>,
}

impl PciDevice {
    /// Vendor ID that marks an empty slot or function.
    pub const ABSENT_VENDOR: u16 = 0xFFFF;

    #[must_use]
    pub const fn new(
        location: PciLocation,
        vendor_id: u16,
        device_id: u16,
        class: u8,
        subclass: u8,
    ) -> Self {
        Self {
            location,
            vendor_id,
            device_id,
            class,
            subclass,
            driver: None,
        }
    }
}

impl fmt::Display for PciDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ID: {:04X}, Vendor: {}, ClassName: {}, Class: {:02X}",
            self.location,
            self.device_id,
            vendor_name(self.vendor_id),
            class_name(self.class),
            self.class
        )
    }
}

/// A rule deciding whether a driver handles a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceMatch {
    /// Exact vendor and device ID.
    Id { vendor: u16, device: u16 },
    /// Any device of the vendor.
    Vendor(u16),
    /// Class code, optionally narrowed to one subclass.
    Class { class: u8, subclass: Option<u8> },
}

impl DeviceMatch {
    #[must_use]
    pub fn matches(&self, device: &PciDevice) -> bool {
        match *self {
            Self::Id { vendor, device: id } => {
                device.vendor_id == vendor && device.device_id == id
            }
            Self::Vendor(vendor) => device.vendor_id == vendor,
            Self::Class { class, subclass } => {
                device.class == class && subclass.is_none_or(|s| s == device.subclass)
            }
        }
    }
}

/// A named driver and the devices it claims.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PciDriver {
    pub name: &'static str,
    pub matches: &'static [DeviceMatch],
}

impl PciDriver {
    #[must_use]
    pub const fn new(name: &'static str, matches: &'static [DeviceMatch]) -> Self {
        Self { name, matches }
    }

    /// Whether any of the driver's rules accepts `device`.
    #[must_use]
    pub fn supports(&self, device: &PciDevice) -> bool {
        self.matches.iter().any(|rule| rule.matches(device))
    }
}
