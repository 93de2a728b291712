//! # Configuration Space Access (Mechanism #1)

use crate::PciLocation;

/// Offsets into the common configuration header.
pub mod register {
    pub const VENDOR_ID: u8 = 0x00;
    pub const DEVICE_ID: u8 = 0x02;
    /// Word holding the subclass (low byte) and the class code (high byte).
    pub const CLASS: u8 = 0x0A;
}

/// Value written to `CONFIG_ADDRESS` (`0xCF8`) to select a register.
///
/// Layout (LSB→MSB):
/// - bits 0..8: register offset, dword aligned (bits 0..2 are always zero)
/// - bits 8..11: function
/// - bits 11..16: slot (device)
/// - bits 16..24: bus
/// - bits 24..31: reserved
/// - bit 31: enable
#[bitfield_struct::bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ConfigAddress {
    #[bits(8)]
    pub register: u8,
    #[bits(3)]
    pub function: u8,
    #[bits(5)]
    pub slot: u8,
    #[bits(8)]
    pub bus: u8,
    #[bits(7)]
    __: u8,
    pub enable: bool,
}

impl ConfigAddress {
    /// Address of the dword containing `offset` in the config space of `location`.
    #[must_use]
    pub const fn for_register(location: PciLocation, offset: u8) -> Self {
        Self::new()
            .with_register(offset & 0xFC)
            .with_function(location.function)
            .with_slot(location.slot)
            .with_bus(location.bus)
            .with_enable(true)
    }

    #[must_use]
    pub const fn location(&self) -> PciLocation {
        PciLocation::new(self.bus(), self.slot(), self.function())
    }
}

/// The address/data port pair of configuration mechanism #1.
///
/// An access is always `write_address` followed by `read_data`; the pair
/// must not be interleaved with another user of the same ports.
pub trait ConfigPorts {
    fn write_address(&mut self, address: ConfigAddress);
    fn read_data(&mut self) -> u32;
}

/// [`ConfigPorts`] on the real `0xCF8`/`0xCFC` I/O ports.
#[derive(Debug)]
pub struct PortConfigSpace {
    _private: (),
}

impl PortConfigSpace {
    pub const CONFIG_ADDRESS: u16 = 0xCF8;
    pub const CONFIG_DATA: u16 = 0xCFC;

    /// # Safety
    /// The caller must run at CPL0 and must be the only user of the
    /// configuration ports for the lifetime of the returned value.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl ConfigPorts for PortConfigSpace {
    fn write_address(&mut self, address: ConfigAddress) {
        // SAFETY: exclusive port ownership is a precondition of `PortConfigSpace::new`.
        unsafe { kernel_ports::outl(Self::CONFIG_ADDRESS, address.into_bits()) }
    }

    fn read_data(&mut self) -> u32 {
        // SAFETY: see `write_address`.
        unsafe { kernel_ports::inl(Self::CONFIG_DATA) }
    }
}

/// Typed register reads on top of a [`ConfigPorts`] implementation.
#[derive(Debug)]
pub struct ConfigSpace<P> {
    ports: P,
}

impl<P: ConfigPorts> ConfigSpace<P> {
    pub const fn new(ports: P) -> Self {
        Self { ports }
    }

    /// Read the dword containing `offset`.
    pub fn read_dword(&mut self, location: PciLocation, offset: u8) -> u32 {
        self.ports
            .write_address(ConfigAddress::for_register(location, offset));
        self.ports.read_data()
    }

    /// Read the 16-bit register at `offset` (bit 1 of `offset` selects the half).
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_word(&mut self, location: PciLocation, offset: u8) -> u16 {
        let dword = self.read_dword(location, offset);
        let shift = u32::from(offset & 2) * 8;
        ((dword >> shift) & 0xFFFF) as u16
    }

    pub fn vendor_id(&mut self, location: PciLocation) -> u16 {
        self.read_word(location, register::VENDOR_ID)
    }

    pub fn device_id(&mut self, location: PciLocation) -> u16 {
        self.read_word(location, register::DEVICE_ID)
    }

    /// `(class, subclass)` of the function.
    pub fn class(&mut self, location: PciLocation) -> (u8, u8) {
        let [subclass, class] = self.read_word(location, register::CLASS).to_le_bytes();
        (class, subclass)
    }

    pub const fn ports(&self) -> &P {
        &self.ports
    }

    pub fn into_inner(self) -> P {
        self.ports
    }
}
