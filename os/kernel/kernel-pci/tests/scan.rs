use kernel_pci::{
    ConfigAddress, ConfigPorts, DeviceMatch, PciDriver, PciLocation, PciRegistry, PciScanner,
    RegistryError,
};
use std::collections::HashMap;

/// Config space model: the first four dwords of each present function.
#[derive(Default)]
struct FakeConfigSpace {
    functions: HashMap<PciLocation, [u32; 4]>,
    selected: Option<ConfigAddress>,
    /// Locations whose vendor register was read, in order.
    visited: Vec<PciLocation>,
}

impl FakeConfigSpace {
    fn with(mut self, location: PciLocation, vendor: u16, device: u16, class: u8, subclass: u8) -> Self {
        let id = (u32::from(device) << 16) | u32::from(vendor);
        let class = (u32::from(class) << 24) | (u32::from(subclass) << 16);
        self.functions.insert(location, [id, 0, class, 0]);
        self
    }
}

impl ConfigPorts for FakeConfigSpace {
    fn write_address(&mut self, address: ConfigAddress) {
        assert!(address.enable());
        assert_eq!(address.register() & 3, 0);
        if address.register() == 0 {
            self.visited.push(address.location());
        }
        self.selected = Some(address);
    }

    fn read_data(&mut self) -> u32 {
        let address = self.selected.take().expect("data read without address");
        self.functions
            .get(&address.location())
            .map_or(u32::MAX, |regs| regs[usize::from(address.register() / 4)])
    }
}

fn qemu_q35() -> FakeConfigSpace {
    FakeConfigSpace::default()
        .with(PciLocation::new(0, 0, 0), 0x8086, 0x29C0, 0x06, 0x00)
        .with(PciLocation::new(0, 1, 0), 0x1234, 0x1111, 0x03, 0x00)
        .with(PciLocation::new(0, 2, 0), 0x8086, 0x10D3, 0x02, 0x00)
        .with(PciLocation::new(0, 0x1F, 0), 0x8086, 0x2918, 0x06, 0x01)
        .with(PciLocation::new(0, 0x1F, 2), 0x8086, 0x2922, 0x01, 0x06)
        .with(PciLocation::new(0, 0x1F, 3), 0x8086, 0x2930, 0x0C, 0x05)
}

#[test]
fn scan_visits_every_location_in_ascending_order() {
    let mut scanner = PciScanner::new(FakeConfigSpace::default());
    assert_eq!(scanner.devices().count(), 0);

    let visited = scanner.into_inner().visited;
    assert_eq!(visited.len(), 256 * 32 * 8);
    assert!(visited.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn scan_records_present_functions() {
    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::new();

    assert_eq!(scanner.scan_into(&mut registry), Ok(6));

    let vga = registry.device(PciLocation::new(0, 1, 0)).unwrap();
    assert_eq!((vga.vendor_id, vga.device_id), (0x1234, 0x1111));
    assert_eq!((vga.class, vga.subclass), (0x03, 0x00));
    assert_eq!(vga.driver, None);

    let sata = registry.device(PciLocation::new(0, 0x1F, 2)).unwrap();
    assert_eq!((sata.class, sata.subclass), (0x01, 0x06));

    assert!(registry.device(PciLocation::new(0, 3, 0)).is_none());
}

#[test]
fn absent_vendor_never_produces_a_device() {
    let fake = FakeConfigSpace::default().with(PciLocation::new(0, 4, 0), 0xFFFF, 0x1234, 0x02, 0x00);
    let mut scanner = PciScanner::new(fake);

    assert!(scanner.probe(PciLocation::new(0, 4, 0)).is_none());
    assert_eq!(scanner.devices().count(), 0);
}

#[test]
fn repeated_scans_are_identical() {
    let mut scanner = PciScanner::new(qemu_q35());
    let first: Vec<_> = scanner.devices().collect();
    let second: Vec<_> = scanner.devices().collect();
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|d| d.location).collect::<Vec<_>>(),
        [
            PciLocation::new(0, 0, 0),
            PciLocation::new(0, 1, 0),
            PciLocation::new(0, 2, 0),
            PciLocation::new(0, 0x1F, 0),
            PciLocation::new(0, 0x1F, 2),
            PciLocation::new(0, 0x1F, 3),
        ]
    );
}

#[test]
fn rescanning_into_the_same_registry_adds_nothing() {
    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::new();
    assert_eq!(scanner.scan_into(&mut registry), Ok(6));

    assert_eq!(scanner.scan_into(&mut registry), Ok(0));
    assert_eq!(registry.len(), 6);
}

#[test]
fn rescan_picks_up_only_new_functions() {
    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::new();
    scanner.scan_into(&mut registry).unwrap();

    let hotplugged = PciLocation::new(0, 4, 0);
    let ports = scanner
        .into_inner()
        .with(hotplugged, 0x8086, 0x100E, 0x02, 0x00);
    let mut scanner = PciScanner::new(ports);

    assert_eq!(scanner.scan_into(&mut registry), Ok(1));
    assert_eq!(registry.len(), 7);
    assert_eq!(registry.device(hotplugged).unwrap().device_id, 0x100E);
}

#[test]
fn rescan_keeps_existing_driver_bindings() {
    static BOCHS_VGA: [DeviceMatch; 1] = [DeviceMatch::Id {
        vendor: 0x1234,
        device: 0x1111,
    }];

    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::new();
    let bochs = registry
        .register_driver(PciDriver::new("bochs-display", &BOCHS_VGA))
        .unwrap();
    scanner.scan_into(&mut registry).unwrap();
    registry.bind_drivers();

    assert_eq!(scanner.scan_into(&mut registry), Ok(0));
    let vga = registry.device(PciLocation::new(0, 1, 0)).unwrap();
    assert_eq!(vga.driver, Some(bochs));
}

#[test]
fn overflowing_registry_stops_the_scan() {
    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::with_capacity(4, 1);

    assert_eq!(
        scanner.scan_into(&mut registry),
        Err(RegistryError::CapacityExceeded { capacity: 4 })
    );
    assert_eq!(registry.len(), 4);
    assert!(registry.device(PciLocation::new(0, 0x1F, 2)).is_none());
}

#[test]
fn scanned_devices_bind_and_dump() {
    static AHCI: [DeviceMatch; 1] = [DeviceMatch::Class {
        class: 0x01,
        subclass: Some(0x06),
    }];
    static BOCHS_VGA: [DeviceMatch; 1] = [DeviceMatch::Id {
        vendor: 0x1234,
        device: 0x1111,
    }];

    let mut scanner = PciScanner::new(qemu_q35());
    let mut registry = PciRegistry::new();
    scanner.scan_into(&mut registry).unwrap();
    registry.register_driver(PciDriver::new("ahci", &AHCI)).unwrap();
    registry.register_driver(PciDriver::new("bochs-display", &BOCHS_VGA)).unwrap();

    assert_eq!(registry.bind_drivers(), 2);

    let dump: Vec<_> = registry.dump().map(|e| e.to_string()).collect();
    assert_eq!(
        dump,
        [
            "ProcDump Vendor: 8086",
            "ProcDump Driver Name: bochs-display",
            "ProcDump Vendor: 8086",
            "ProcDump Vendor: 8086",
            "ProcDump Driver Name: ahci",
            "ProcDump Vendor: 8086",
        ]
    );
}
