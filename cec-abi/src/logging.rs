//! `log` backend for build scripts.
//!
//! Cargo hides build script stdout unless the build fails, and shows
//! `cargo:warning=` lines to the user. Records at `warn` and above are turned
//! into such warnings; everything else is printed plainly so it ends up in the
//! build output log.

use std::str::FromStr;
use std::sync::RwLock;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::{Lazy, OnceCell};

use crate::error::LogError;

static BUILD_LOGGER: Lazy<BuildLogger> = Lazy::new(BuildLogger::new);
static INSTALLED: OnceCell<bool> = OnceCell::new();

#[derive(Clone, Debug, Eq, PartialEq)]
struct TargetFilter {
    target: String,
    level: LevelFilter,
}

impl FromStr for TargetFilter {
    type Err = LogError;

    /// `target=level`, or a bare `target` meaning every level.
    fn from_str(directive: &str) -> Result<Self, LogError> {
        let (target, level) = match directive.split_once('=') {
            Some((target, level)) => (target.trim(), Some(level.trim())),
            None => (directive, None),
        };
        if target.is_empty() {
            return Err(LogError::InvalidFilter(format!(
                "directive `{directive}` has no target"
            )));
        }
        let level = match level {
            Some("") => {
                return Err(LogError::InvalidFilter(format!(
                    "directive `{directive}` has no level"
                )));
            }
            Some(level) => parse_level(level)?,
            None => LevelFilter::Trace,
        };
        Ok(Self {
            target: target.to_string(),
            level,
        })
    }
}

/// `RUST_LOG`-style filter: comma separated `target=level` directives and an
/// optional bare default level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogFilter {
    default: LevelFilter,
    directives: Vec<TargetFilter>,
}

impl LogFilter {
    pub fn default_for_level(level: LevelFilter) -> Self {
        Self {
            default: LevelFilter::Off,
            directives: vec![TargetFilter {
                target: "cec_abi".to_string(),
                level,
            }],
        }
    }

    pub fn parse(filter: &str) -> Result<Self, LogError> {
        let mut parsed = Self {
            default: LevelFilter::Off,
            directives: Vec::new(),
        };
        for directive in filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            // A bare level sets the default; any other bare word is a target.
            match LevelFilter::from_str(directive) {
                Ok(level) => parsed.default = level,
                Err(_) => parsed.directives.push(directive.parse()?),
            }
        }
        Ok(parsed)
    }

    /// Whether a record for `target` at `level` passes; the longest matching
    /// target prefix wins, later directives breaking ties.
    pub fn allows(&self, target: &str, level: Level) -> bool {
        let threshold = self
            .directives
            .iter()
            .filter(|directive| target.starts_with(directive.target.as_str()))
            .max_by_key(|directive| directive.target.len())
            .map_or(self.default, |directive| directive.level);
        level <= threshold
    }

    pub fn max_level(&self) -> LevelFilter {
        self.directives
            .iter()
            .map(|directive| directive.level)
            .fold(self.default, std::cmp::max)
    }
}

struct BuildLogger {
    filter: RwLock<LogFilter>,
}

impl BuildLogger {
    fn new() -> Self {
        Self {
            filter: RwLock::new(LogFilter::default_for_level(LevelFilter::Info)),
        }
    }

    fn update(&self, filter: LogFilter) {
        let mut guard = self.filter.write().unwrap_or_else(|err| err.into_inner());
        *guard = filter;
    }

    fn with_filter<T>(&self, f: impl FnOnce(&LogFilter) -> T) -> T {
        let guard = self.filter.read().unwrap_or_else(|err| err.into_inner());
        f(&guard)
    }
}

impl Log for BuildLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.with_filter(|filter| filter.allows(metadata.target(), metadata.level()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "{}",
            format_line(record.level(), record.target(), &record.args().to_string())
        );
    }

    fn flush(&self) {}
}

/// Renders one record as a line of build script output.
pub fn format_line(level: Level, target: &str, message: &str) -> String {
    // Cargo warnings are single-line.
    let message = message.replace('\n', " ");
    match level {
        Level::Error | Level::Warn => format!("cargo:warning={target}: {message}"),
        _ => format!("{level} {target}: {message}"),
    }
}

fn parse_level(value: &str) -> Result<LevelFilter, LogError> {
    LevelFilter::from_str(value)
        .map_err(|_| LogError::InvalidFilter(format!("invalid level `{value}`")))
}

fn ensure_logger() -> Result<(), LogError> {
    let installed = *INSTALLED.get_or_init(|| log::set_logger(&*BUILD_LOGGER).is_ok());
    if installed {
        Ok(())
    } else {
        Err(LogError::AlreadyInitialized)
    }
}

/// Installs the build logger with the given filter.
///
/// May be called again to replace the filter.
pub fn init(filter: &str) -> Result<(), LogError> {
    let filter = LogFilter::parse(filter)?;
    ensure_logger()?;
    let max_level = filter.max_level();
    BUILD_LOGGER.update(filter);
    log::set_max_level(max_level);
    Ok(())
}
