//! Build-time libcec ABI detection for `libcec-sys`.
//!
//! Each supported libcec major version has a C smoke test ("probe") that only
//! compiles when `cecc.h` reports that major version and only links when
//! `libcec_initialise` resolves. The build script of `libcec-sys` uses these
//! probes, pkg-config and the vendored sources to decide what to link.

mod config;
mod detect;
mod diagnostic;
mod discovery;
mod error;
mod logging;
mod probe;
mod runner;
mod runtime;
mod vendored;
mod version;

pub use config::BuildConfig;
pub use detect::{Detection, Detector, LinkSource};
pub use diagnostic::classify;
pub use discovery::{InstalledLibrary, MIN_LIBCEC_VERSION, probe_pkg_config};
pub use error::{DetectError, LogError, ProbeError};
pub use logging::{LogFilter, format_line, init as init_logging};
pub use probe::{ENTRY_POINT, HEADER, LINK_NAME, Probe, ProbeOutcome, select};
pub use runner::ProbeRunner;
pub use vendored::{parse_cmake_major, rerun_files, source_dir, vendored_version};
pub use version::AbiVersion;

/// Environment variable names understood by the build script.
pub mod env {
    pub use crate::config::{FORCE_ABI, INCLUDE_DIR, LIB_DIR, NO_PKG_CONFIG, VENDORED};
}
