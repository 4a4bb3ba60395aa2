// Bridges the `log` facade onto the console, so kernel subsystems can use
// info!/debug!/warn!/error! instead of ad-hoc printf calls.

use log::{Level, LevelFilter, Metadata, Record};

use crate::printf;

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        printf!("[{}] {}\n", record.level(), record.args());
    }

    fn flush(&self) {}
}

pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Info))
        .expect("logger already initialized");
}
