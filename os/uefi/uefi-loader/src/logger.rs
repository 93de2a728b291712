use core::sync::atomic::{AtomicBool, Ordering};
use kernel_qemu::qemu_trace;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Logs to the QEMU debug port and, while boot services run, the UEFI console.
pub struct UefiLogger {
    max_level: LevelFilter,
    boot_services_available: AtomicBool,
}

impl UefiLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self {
            max_level,
            boot_services_available: AtomicBool::new(true),
        }
    }

    /// Install as the global logger. Call once during early init.
    ///
    /// # Errors
    /// Fails if another logger was installed before.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }

    /// Stop mirroring to the console; must be called before `ExitBootServices`.
    pub fn exit_boot_services(&self) {
        self.boot_services_available.store(false, Ordering::Release);
    }
}

impl Log for UefiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        qemu_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );

        if self.boot_services_available.load(Ordering::Acquire) {
            uefi::println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
