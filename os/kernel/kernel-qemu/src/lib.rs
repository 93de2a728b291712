//! # QEMU Debug Console Support
//!
//! Early-boot diagnostics for code running under QEMU. Bytes written to I/O
//! port `0x402` show up on the host when QEMU runs with `-debugcon stdio`
//! (or `-debugcon file:debug.log`).
//!
//! * [`qemu_trace!`] formats straight into the port without allocating.
//! * [`QemuLogger`] is a [`log::Log`] backend on top of the same sink.
//!
//! With the `enabled` feature off, the macro compiles to nothing and no port
//! access is emitted, which keeps the crate usable on real hardware.
//!
//! ```rust,no_run
//! use kernel_qemu::QemuLogger;
//! use log::{LevelFilter, info};
//!
//! static LOGGER: QemuLogger = QemuLogger::new(LevelFilter::Info);
//!
//! LOGGER.init().expect("logger initialization");
//! info!("PCI scan complete");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::QemuLogger;

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};

    /// QEMU's `-debugcon` port.
    const QEMU_DEBUG_PORT: u16 = 0x402;

    /// Byte sink onto the debug console.
    pub struct QemuSink;

    impl Write for QemuSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            for b in s.bytes() {
                // SAFETY: the debug port is write-only, side-effect free on
                // hardware that does not decode it, and we run at CPL0.
                unsafe { kernel_ports::outb(QEMU_DEBUG_PORT, b) };
            }
            Ok(())
        }
    }

    #[doc(hidden)]
    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best-effort output; a failing formatter has nowhere to report to.
        let _ = fmt::write(&mut QemuSink, args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub const fn qemu_write(_: fmt::Arguments) {}
}

/// Write `format!`-style output to the QEMU debug console.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
