//! # Device/Driver Registry

use crate::{DriverId, PciDevice, PciDriver, PciLocation};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;
use log::debug;

/// Device and driver capacity of [`PciRegistry::new`].
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry is full ({capacity} entries)")]
    CapacityExceeded { capacity: usize },
    #[error("A device at {0} is already registered")]
    DuplicateDevice(PciLocation),
}

/// Discovered devices keyed by location plus the registered drivers.
#[derive(Debug)]
pub struct PciRegistry {
    devices: BTreeMap<PciLocation, PciDevice>,
    drivers: Vec<PciDriver>,
    device_capacity: usize,
    driver_capacity: usize,
}

impl Default for PciRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PciRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_CAPACITY)
    }

    #[must_use]
    pub const fn with_capacity(devices: usize, drivers: usize) -> Self {
        Self {
            devices: BTreeMap::new(),
            drivers: Vec::new(),
            device_capacity: devices,
            driver_capacity: drivers,
        }
    }

    /// Record a discovered device.
    ///
    /// # Errors
    /// [`RegistryError::CapacityExceeded`] when the device store is full,
    /// [`RegistryError::DuplicateDevice`] when the location is already known.
    pub fn add_device(&mut self, device: PciDevice) -> Result<(), RegistryError> {
        if self.devices.contains_key(&device.location) {
            return Err(RegistryError::DuplicateDevice(device.location));
        }
        if self.devices.len() >= self.device_capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.device_capacity,
            });
        }
        self.devices.insert(device.location, device);
        Ok(())
    }

    /// Append a driver. Earlier registrations take precedence when binding.
    ///
    /// # Errors
    /// [`RegistryError::CapacityExceeded`] when the driver store is full.
    pub fn register_driver(&mut self, driver: PciDriver) -> Result<DriverId, RegistryError> {
        if self.drivers.len() >= self.driver_capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.driver_capacity,
            });
        }
        let id = DriverId(self.drivers.len());
        self.drivers.push(driver);
        Ok(id)
    }

    #[must_use]
    pub fn device(&self, location: PciLocation) -> Option<&PciDevice> {
        self.devices.get(&location)
    }

    /// Devices in ascending bus/slot/function order.
    pub fn devices(&self) -> impl Iterator<Item = &PciDevice> {
        self.devices.values()
    }

    pub fn drivers(&self) -> impl Iterator<Item = (DriverId, &PciDriver)> {
        self.drivers
            .iter()
            .enumerate()
            .map(|(i, driver)| (DriverId(i), driver))
    }

    #[must_use]
    pub fn driver(&self, id: DriverId) -> Option<&PciDriver> {
        self.drivers.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Bind every unbound device to the first driver that supports it.
    ///
    /// Returns the number of devices bound by this call.
    pub fn bind_drivers(&mut self) -> usize {
        let mut bound = 0;
        for device in self.devices.values_mut().filter(|d| d.driver.is_none()) {
            let Some(index) = self.drivers.iter().position(|d| d.supports(device)) else {
                continue;
            };
            debug!(
                "Binding {} to driver {}",
                device.location, self.drivers[index].name
            );
            device.driver = Some(DriverId(index));
            bound += 1;
        }
        bound
    }

    /// One entry per device: the bound driver's name, or the raw vendor ID.
    pub fn dump(&self) -> impl Iterator<Item = DumpEntry> + '_ {
        self.devices.values().map(|device| {
            match device.driver.and_then(|id| self.driver(id)) {
                Some(driver) => DumpEntry::Driver(driver.name),
                None => DumpEntry::Vendor(device.vendor_id),
            }
        })
    }
}

/// A line of [`PciRegistry::dump`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DumpEntry {
    Driver(&'static str),
    Vendor(u16),
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(name) => write!(f, "ProcDump Driver Name: {name}"),
            Self::Vendor(id) => write!(f, "ProcDump Vendor: {id:04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceMatch;

    fn dev(slot: u8, vendor: u16, device: u16, class: u8) -> PciDevice {
        PciDevice::new(PciLocation::new(0, slot, 0), vendor, device, class, 0)
    }

    static NET: [DeviceMatch; 1] = [DeviceMatch::Class {
        class: 0x02,
        subclass: None,
    }];
    static E1000: [DeviceMatch; 1] = [DeviceMatch::Id {
        vendor: 0x8086,
        device: 0x100E,
    }];
    static QEMU: [DeviceMatch; 1] = [DeviceMatch::Vendor(0x1234)];

    #[test]
    fn device_capacity_is_enforced() {
        let mut reg = PciRegistry::with_capacity(2, 1);
        reg.add_device(dev(0, 0x8086, 1, 6)).unwrap();
        reg.add_device(dev(1, 0x8086, 2, 6)).unwrap();
        assert_eq!(
            reg.add_device(dev(2, 0x8086, 3, 6)),
            Err(RegistryError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn driver_capacity_is_enforced() {
        let mut reg = PciRegistry::with_capacity(1, 1);
        assert_eq!(reg.register_driver(PciDriver::new("a", &NET)), Ok(DriverId(0)));
        assert_eq!(
            reg.register_driver(PciDriver::new("b", &NET)),
            Err(RegistryError::CapacityExceeded { capacity: 1 })
        );
    }

    #[test]
    fn default_capacity_is_32() {
        let mut reg = PciRegistry::new();
        for slot in 0..32 {
            reg.add_device(dev(slot, 0x1234, 0x1111, 3)).unwrap();
        }
        let extra = PciDevice::new(PciLocation::new(1, 0, 0), 0x1234, 0x1111, 3, 0);
        assert_eq!(
            reg.add_device(extra),
            Err(RegistryError::CapacityExceeded {
                capacity: DEFAULT_CAPACITY
            })
        );
    }

    #[test]
    fn duplicate_location_is_rejected() {
        let mut reg = PciRegistry::new();
        reg.add_device(dev(3, 0x8086, 0x100E, 2)).unwrap();
        assert_eq!(
            reg.add_device(dev(3, 0x1234, 0x1111, 3)),
            Err(RegistryError::DuplicateDevice(PciLocation::new(0, 3, 0)))
        );
        assert_eq!(reg.device(PciLocation::new(0, 3, 0)).map(|d| d.vendor_id), Some(0x8086));
    }

    #[test]
    fn devices_iterate_in_location_order() {
        let mut reg = PciRegistry::new();
        reg.add_device(dev(5, 1, 1, 0)).unwrap();
        reg.add_device(dev(1, 1, 1, 0)).unwrap();
        reg.add_device(dev(3, 1, 1, 0)).unwrap();
        let slots: Vec<_> = reg.devices().map(|d| d.location.slot).collect();
        assert_eq!(slots, [1, 3, 5]);
    }

    #[test]
    fn first_registered_matching_driver_wins() {
        let mut reg = PciRegistry::new();
        reg.add_device(dev(3, 0x8086, 0x100E, 2)).unwrap();
        reg.add_device(dev(4, 0x1234, 0x1111, 3)).unwrap();
        reg.add_device(dev(5, 0x1022, 0x2000, 1)).unwrap();

        let net = reg.register_driver(PciDriver::new("net", &NET)).unwrap();
        reg.register_driver(PciDriver::new("e1000", &E1000)).unwrap();
        let vga = reg.register_driver(PciDriver::new("bochs", &QEMU)).unwrap();

        assert_eq!(reg.bind_drivers(), 2);
        assert_eq!(reg.device(PciLocation::new(0, 3, 0)).unwrap().driver, Some(net));
        assert_eq!(reg.device(PciLocation::new(0, 4, 0)).unwrap().driver, Some(vga));
        assert_eq!(reg.device(PciLocation::new(0, 5, 0)).unwrap().driver, None);

        // already bound devices keep their driver
        assert_eq!(reg.bind_drivers(), 0);
    }

    #[test]
    fn drivers_registered_later_bind_remaining_devices() {
        let mut reg = PciRegistry::new();
        reg.add_device(dev(4, 0x1234, 0x1111, 3)).unwrap();
        assert_eq!(reg.bind_drivers(), 0);

        let id = reg.register_driver(PciDriver::new("bochs", &QEMU)).unwrap();
        assert_eq!(reg.bind_drivers(), 1);
        assert_eq!(reg.driver(id).map(|d| d.name), Some("bochs"));
        assert_eq!(reg.drivers().count(), 1);
    }

    #[test]
    fn dump_reports_driver_or_vendor() {
        let mut reg = PciRegistry::new();
        reg.add_device(dev(3, 0x8086, 0x100E, 2)).unwrap();
        reg.add_device(dev(4, 0x1AF4, 0x1000, 2)).unwrap();
        reg.register_driver(PciDriver::new("e1000", &E1000)).unwrap();
        reg.bind_drivers();

        let lines: Vec<_> = reg.dump().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            ["ProcDump Driver Name: e1000", "ProcDump Vendor: 1AF4"]
        );
    }
}
