//! # PCI Discovery

use kernel_pci::{DeviceMatch, PciDriver, PciRegistry, PciScanner, PortConfigSpace, RegistryError};
use kernel_sync::SpinLock;
use log::info;

/// Every device and driver the kernel knows about.
pub static PCI: SpinLock<PciRegistry> = SpinLock::new(PciRegistry::new());

/// Drivers known at build time, in matching priority.
static BUILTIN_DRIVERS: [PciDriver; 3] = [
    PciDriver::new(
        "bochs-display",
        &[DeviceMatch::Id {
            vendor: 0x1234,
            device: 0x1111,
        }],
    ),
    PciDriver::new(
        "ahci",
        &[DeviceMatch::Class {
            class: 0x01,
            subclass: Some(0x06),
        }],
    ),
    PciDriver::new(
        "e1000",
        &[
            DeviceMatch::Id {
                vendor: 0x8086,
                device: 0x100E,
            },
            DeviceMatch::Id {
                vendor: 0x8086,
                device: 0x10D3,
            },
        ],
    ),
];

/// Register the built-in drivers, scan every bus and bind what was found.
///
/// Returns the number of discovered devices.
pub fn init() -> Result<usize, RegistryError> {
    info!("[PCI] Initialized!");

    PCI.with_lock(|registry| {
        for driver in &BUILTIN_DRIVERS {
            registry.register_driver(*driver)?;
        }

        // SAFETY: we run at CPL0 and nothing else touches 0xCF8/0xCFC.
        let mut scanner = PciScanner::new(unsafe { PortConfigSpace::new() });
        let found = scanner.scan_into(registry);

        let bound = registry.bind_drivers();
        info!("[PCI] {bound} devices bound to drivers");
        found
    })
}

pub fn dump() {
    PCI.with_lock(|registry| {
        for entry in registry.dump() {
            info!("{entry}");
        }
    });
}
