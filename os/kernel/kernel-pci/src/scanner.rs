//! # Bus Scanner

use crate::{ConfigPorts, ConfigSpace, PciDevice, PciLocation, PciRegistry, RegistryError};
use log::{debug, error, info};

/// Brute-force enumeration of every bus/slot/function.
///
/// Each scan starts from `(0, 0, 0)` and touches only config space, so
/// repeated scans see the same devices in the same order.
#[derive(Debug)]
pub struct PciScanner<P> {
    config: ConfigSpace<P>,
}

impl<P: ConfigPorts> PciScanner<P> {
    pub const fn new(ports: P) -> Self {
        Self {
            config: ConfigSpace::new(ports),
        }
    }

    /// Identify the function at `location`, or `None` if nothing answers.
    pub fn probe(&mut self, location: PciLocation) -> Option<PciDevice> {
        let vendor_id = self.config.vendor_id(location);
        if vendor_id == PciDevice::ABSENT_VENDOR {
            return None;
        }
        let device_id = self.config.device_id(location);
        let (class, subclass) = self.config.class(location);
        Some(PciDevice::new(
            location, vendor_id, device_id, class, subclass,
        ))
    }

    /// Every present function in ascending location order.
    pub fn devices(&mut self) -> impl Iterator<Item = PciDevice> + '_ {
        PciLocation::all().filter_map(move |location| self.probe(location))
    }

    /// Scan all buses and record each newly discovered device in `registry`.
    ///
    /// Locations already present in the registry are left as they are, so a
    /// rescan only picks up functions that appeared since. Returns the number
    /// of devices added.
    ///
    /// # Errors
    /// Stops at the first [`RegistryError`]; devices found before it stay
    /// registered.
    pub fn scan_into(&mut self, registry: &mut PciRegistry) -> Result<usize, RegistryError> {
        let mut found = 0;
        for device in self.devices() {
            if registry.device(device.location).is_some() {
                debug!("[PCI] Already registered: {}", device.location);
                continue;
            }
            info!("[PCI] Device found! {device}");
            if let Err(e) = registry.add_device(device) {
                error!("[PCI] Scan aborted: {e}");
                return Err(e);
            }
            found += 1;
        }
        Ok(found)
    }

    pub const fn config(&self) -> &ConfigSpace<P> {
        &self.config
    }

    pub fn into_inner(self) -> P {
        self.config.into_inner()
    }
}
