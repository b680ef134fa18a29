//! Build script settings read from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::DetectError;
use crate::version::AbiVersion;

pub const OUT_DIR: &str = "OUT_DIR";
pub const CARGO_MANIFEST_DIR: &str = "CARGO_MANIFEST_DIR";
pub const FEATURE_VENDORED: &str = "CARGO_FEATURE_VENDORED";
pub const VENDORED: &str = "LIBCEC_SYS_VENDORED";
pub const NO_PKG_CONFIG: &str = "LIBCEC_SYS_NO_PKG_CONFIG";
pub const FORCE_ABI: &str = "LIBCEC_SYS_ABI";
pub const INCLUDE_DIR: &str = "LIBCEC_INCLUDE_DIR";
pub const LIB_DIR: &str = "LIBCEC_LIB_DIR";
pub const LOG: &str = "LIBCEC_SYS_LOG";

/// Default log filter when `LIBCEC_SYS_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "cec_abi=info,build_script_build=info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildConfig {
    pub out_dir: PathBuf,
    pub manifest_dir: PathBuf,
    pub vendored: bool,
    pub use_pkg_config: bool,
    pub forced_abi: Option<AbiVersion>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub log_filter: String,
}

impl BuildConfig {
    pub fn from_env() -> Result<Self, DetectError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DetectError> {
        let out_dir = lookup(OUT_DIR).ok_or(DetectError::MissingEnv(OUT_DIR))?;
        let manifest_dir = lookup(CARGO_MANIFEST_DIR).unwrap_or_else(|| ".".to_string());

        let forced_abi = match lookup(FORCE_ABI) {
            Some(value) if !value.trim().is_empty() => {
                let major: u32 = value.trim().parse().map_err(|_| DetectError::InvalidEnv {
                    var: FORCE_ABI,
                    value: value.clone(),
                })?;
                Some(AbiVersion::from_major(major).ok_or(DetectError::UnsupportedVersion { major })?)
            }
            _ => None,
        };

        Ok(Self {
            out_dir: PathBuf::from(out_dir),
            manifest_dir: PathBuf::from(manifest_dir),
            vendored: lookup(FEATURE_VENDORED).is_some() || flag(lookup(VENDORED)),
            use_pkg_config: !flag(lookup(NO_PKG_CONFIG)),
            forced_abi,
            include_dirs: paths(lookup(INCLUDE_DIR)),
            lib_dirs: paths(lookup(LIB_DIR)),
            log_filter: lookup(LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Variables that should trigger a rerun of the build script when changed.
    pub fn rerun_env_vars() -> [&'static str; 6] {
        [VENDORED, NO_PKG_CONFIG, FORCE_ABI, INCLUDE_DIR, LIB_DIR, LOG]
    }

    /// Probe table for this build, honouring `LIBCEC_SYS_ABI`.
    pub fn candidate_versions(&self) -> Vec<AbiVersion> {
        match self.forced_abi {
            Some(version) => vec![version],
            None => AbiVersion::PREFERENCE.to_vec(),
        }
    }
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1" | "true" | "yes" | "on")
    )
}

fn paths(value: Option<String>) -> Vec<PathBuf> {
    value
        .map(|value| {
            env::split_paths(&value)
                .filter(|path| !path.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
