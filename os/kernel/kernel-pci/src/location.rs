use core::fmt;

/// Bus/slot/function coordinates of one PCI function.
///
/// Ordering is lexicographic by (bus, slot, function), which is also the
/// order in which the scanner visits locations.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PciLocation {
    pub bus: u8,
    pub slot: u8,
    pub function: u8,
}

impl PciLocation {
    pub const BUS_COUNT: u16 = 256;
    pub const SLOT_COUNT: u8 = 32;
    pub const FUNCTION_COUNT: u8 = 8;

    /// Create a location. `slot` must be below 32 and `function` below 8.
    #[must_use]
    pub const fn new(bus: u8, slot: u8, function: u8) -> Self {
        debug_assert!(slot < Self::SLOT_COUNT);
        debug_assert!(function < Self::FUNCTION_COUNT);
        Self {
            bus,
            slot,
            function,
        }
    }

    /// Every location in ascending (bus, slot, function) order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).flat_map(|bus| {
            (0..Self::SLOT_COUNT).flat_map(move |slot| {
                (0..Self::FUNCTION_COUNT).map(move |function| Self::new(bus, slot, function))
            })
        })
    }
}

impl fmt::Debug for PciLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for PciLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.slot, self.function)
    }
}
