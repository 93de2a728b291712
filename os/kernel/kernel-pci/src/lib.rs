//! # PCI Device Discovery
//!
//! Enumerates PCI functions over configuration mechanism #1 (I/O ports
//! `0xCF8`/`0xCFC`) and records what it finds in a bounded registry.
//!
//! ```text
//! PciLocation::all()          ConfigSpace              PciRegistry
//!  (0,0,0) .. (255,31,7) ──► read vendor @0x00 ──► skip 0xFFFF
//!                            read device @0x02
//!                            read class  @0x0A ──► add_device(PciDevice)
//!                                                   register_driver(PciDriver)
//!                                                   bind_drivers()
//! ```
//!
//! The hardware seam is [`ConfigPorts`]: the real implementation talks to
//! the I/O ports, tests substitute a model of config space.
//!
//! ```rust
//! use kernel_pci::{ConfigAddress, PciLocation};
//!
//! let address = ConfigAddress::for_register(PciLocation::new(0, 3, 0), 0x0A);
//! assert_eq!(address.into_bits(), 0x8000_1808);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod config;
mod device;
mod location;
pub mod names;
mod registry;
mod scanner;

pub use config::{ConfigAddress, ConfigPorts, ConfigSpace, PortConfigSpace, register};
pub use device::{DeviceMatch, DriverId, PciDevice, PciDriver};
pub use location::PciLocation;
pub use registry::{DEFAULT_CAPACITY, DumpEntry, PciRegistry, RegistryError};
pub use scanner::PciScanner;
