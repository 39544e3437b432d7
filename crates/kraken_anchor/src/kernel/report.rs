//! Report list
//!
//! An append-only diagnostic log consumed by the editor UI. Reports at or
//! above the print level are echoed through `log`; reports at or above the
//! store level are kept. The list is shared between threads behind a single
//! mutex.

use std::fmt::{self, Write as _};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Severity of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Developer detail
    Debug,
    /// Informational
    Info,
    /// Recoverable problem
    Warning,
    /// Operation failed
    Error,
    /// The application cannot continue
    Fatal,
}

impl ReportType {
    /// Every level, lowest first
    pub const ALL: [Self; 5] = [Self::Debug, Self::Info, Self::Warning, Self::Error, Self::Fatal];

    /// Label shown in the UI
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Fatal => "Fatal Error",
        }
    }

    fn log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error | Self::Fatal => log::Level::Error,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Report list behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReportListFlags: u32 {
        /// Echo reports through the logger
        const PRINT = 1 << 0;
        /// Keep reports in the list
        const STORE = 1 << 1;
    }
}

impl Default for ReportListFlags {
    fn default() -> Self {
        Self::PRINT | Self::STORE
    }
}

/// One stored report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Severity
    pub level: ReportType,
    /// Message text
    pub message: String,
}

#[derive(Debug)]
struct Inner {
    flags: ReportListFlags,
    print_level: ReportType,
    store_level: ReportType,
    reports: Vec<Report>,
}

/// Thread-safe list of reports
#[derive(Debug)]
pub struct ReportList {
    inner: Mutex<Inner>,
}

impl Default for ReportList {
    fn default() -> Self {
        Self::new(ReportListFlags::default())
    }
}

impl ReportList {
    /// Empty list printing warnings and storing everything from `Info` up
    pub fn new(flags: ReportListFlags) -> Self {
        Self {
            inner: Mutex::new(Inner {
                flags,
                print_level: ReportType::Warning,
                store_level: ReportType::Info,
                reports: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Reset to an empty list with new flags
    pub fn init(&self, flags: ReportListFlags) {
        let mut inner = self.lock();
        inner.flags = flags;
        inner.reports.clear();
    }

    /// Remove every stored report
    pub fn clear(&self) {
        self.lock().reports.clear();
    }

    /// Current flags
    pub fn flags(&self) -> ReportListFlags {
        self.lock().flags
    }

    /// Lowest level echoed through the logger
    pub fn set_print_level(&self, level: ReportType) {
        self.lock().print_level = level;
    }

    /// Lowest level kept in the list
    pub fn set_store_level(&self, level: ReportType) {
        self.lock().store_level = level;
    }

    /// Add a report
    pub fn report(&self, level: ReportType, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.lock();
        if inner.flags.contains(ReportListFlags::PRINT) && level >= inner.print_level {
            log::log!(level.log_level(), "{}: {}", level.name(), message);
        }
        if inner.flags.contains(ReportListFlags::STORE) && level >= inner.store_level {
            inner.reports.push(Report { level, message });
        }
    }

    /// Add a report built from format arguments
    ///
    /// Use with `format_args!`:
    /// `reports.format(ReportType::Error, format_args!("window {} failed", id))`.
    pub fn format(&self, level: ReportType, args: fmt::Arguments<'_>) {
        self.report(level, fmt::format(args));
    }

    /// Number of stored reports
    pub fn len(&self) -> usize {
        self.lock().reports.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.lock().reports.is_empty()
    }

    /// Stored reports at or above `level`
    pub fn reports(&self, level: ReportType) -> Vec<Report> {
        self.lock().reports.iter().filter(|r| r.level >= level).cloned().collect()
    }

    /// Stored reports at or above `level`, one `Type: message` line each
    pub fn to_string(&self, level: ReportType) -> String {
        let inner = self.lock();
        let mut out = String::new();
        for report in inner.reports.iter().filter(|r| r.level >= level) {
            let _ = writeln!(out, "{}: {}", report.level.name(), report.message);
        }
        out
    }

    /// UI label of a level
    pub fn type_name(level: ReportType) -> &'static str {
        level.name()
    }
}
