//! Error types for probes and library detection.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::probe::ProbeOutcome;

/// Why a single ABI probe did not compile and link.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("libcec major version is {actual}, not as expected ({expected})")]
    VersionMismatch { expected: u32, actual: String },
    #[error("libcec entry point `{symbol}` could not be linked (expected ABI {expected})")]
    MissingSymbol { expected: u32, symbol: &'static str },
    #[error("libcec header `{header}` was not found")]
    HeaderNotFound { header: &'static str },
    #[error("libcec library was not found by the linker")]
    LibraryNotFound,
    #[error("compiler exited with {status}: {stderr}")]
    CompilerFailed { status: String, stderr: String },
    #[error("failed to run compiler `{}`", compiler.display())]
    Spawn {
        compiler: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write probe source `{}`", path.display())]
    WriteSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why no usable libcec could be selected for linking.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("no supported libcec found ({})", summarize(attempts))]
    NoSupportedLibrary { attempts: Vec<ProbeOutcome> },
    #[error(
        "vendored libcec sources not found at `{}`; initialize the git submodules",
        path.display()
    )]
    VendoredSourcesMissing { path: PathBuf },
    #[error("could not read LIBCEC_VERSION_MAJOR from `{}`", path.display())]
    CmakeVersion { path: PathBuf },
    #[error("libcec major version {major} is not supported")]
    UnsupportedVersion { major: u32 },
    #[error("libcec major version is {actual}, not as expected ({expected})")]
    VersionMismatch { expected: u32, actual: u32 },
    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),
    #[error("invalid value `{value}` for `{var}`")]
    InvalidEnv { var: &'static str, value: String },
    #[error("vendored build step `{step}` failed")]
    VendoredBuild {
        step: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("no usable C compiler: {0}")]
    Compiler(String),
    #[error("failed to start probe runtime")]
    Runtime(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Why the build logger could not be installed.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("logging already initialized by another logger")]
    AlreadyInitialized,
}

fn summarize(attempts: &[ProbeOutcome]) -> String {
    if attempts.is_empty() {
        return "no probes were run".to_string();
    }
    attempts
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(()) => format!("abi{}: ok", outcome.version.major()),
            Err(err) => format!("abi{}: {err}", outcome.version.major()),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
