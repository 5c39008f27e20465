use gloo::console;

use crate::domain::clock::Clock;
use crate::domain::logging::{LogEntry, LogLevel, Logger};

/// Logger implementation writing to the browser console.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new_development() -> Self {
        Self { min_level: LogLevel::Debug }
    }

    pub fn new_production() -> Self {
        Self { min_level: LogLevel::Info }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let line = format!("{} {}: {}", entry.level, entry.component, entry.message);
        match entry.level {
            LogLevel::Debug => console::debug!(line),
            LogLevel::Info => console::log!(line),
            LogLevel::Warn => console::warn!(line),
            LogLevel::Error => console::error!(line),
        }
    }
}

/// Wall clock backed by the browser's `Date.now()`.
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
