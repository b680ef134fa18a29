//! Chooses which libcec to link and with which ABI.
//!
//! Order: vendored when requested, then pkg-config, then the probes against
//! the compiler's default search paths, then vendored as a fallback.

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::BuildConfig;
use crate::discovery::{InstalledLibrary, probe_pkg_config};
use crate::error::DetectError;
use crate::probe::{LINK_NAME, Probe, select};
use crate::runner::ProbeRunner;
use crate::vendored;
use crate::version::AbiVersion;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkSource {
    PkgConfig,
    System,
    Vendored,
}

impl LinkSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PkgConfig => "pkg-config",
            Self::System => "system",
            Self::Vendored => "vendored",
        }
    }
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The libcec selected for linking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detection {
    pub version: AbiVersion,
    pub source: LinkSource,
    pub include_dirs: Vec<PathBuf>,
    pub link_search: Vec<PathBuf>,
    pub link_libs: Vec<String>,
}

impl Detection {
    /// `cargo:` lines describing this detection to cargo and dependents.
    pub fn cargo_directives(&self) -> Vec<String> {
        let mut lines: Vec<String> = AbiVersion::PREFERENCE
            .iter()
            .rev()
            .map(|version| format!("cargo:rustc-check-cfg=cfg({})", version.cfg_name()))
            .collect();
        lines.push(format!("cargo:rustc-cfg={}", self.version.cfg_name()));
        lines.push(format!("cargo:libcec_version_major={}", self.version.major()));
        if self.source == LinkSource::Vendored {
            lines.push("cargo:lib_vendored=true".to_string());
        }
        lines.extend(
            self.include_dirs
                .iter()
                .map(|dir| format!("cargo:include={}", dir.display())),
        );
        lines.extend(
            self.link_search
                .iter()
                .map(|dir| format!("cargo:rustc-link-search=native={}", dir.display())),
        );
        lines.extend(
            self.link_libs
                .iter()
                .map(|lib| format!("cargo:rustc-link-lib={lib}")),
        );
        lines.push(format!(
            "cargo:rustc-env=LIBCEC_SYS_LINK_SOURCE={}",
            self.source
        ));
        lines
    }
}

pub struct Detector<'a> {
    config: &'a BuildConfig,
    runner: ProbeRunner,
}

impl<'a> Detector<'a> {
    /// Detector compiling probes with the build target's C compiler.
    pub fn new(config: &'a BuildConfig) -> Result<Self, DetectError> {
        let runner = ProbeRunner::from_build_env(&config.out_dir)?;
        Ok(Self::with_runner(config, runner))
    }

    pub fn with_runner(config: &'a BuildConfig, runner: ProbeRunner) -> Self {
        Self { config, runner }
    }

    pub fn detect(&self) -> Result<Detection, DetectError> {
        if self.config.vendored {
            info!("vendored libcec requested");
            return self.vendored();
        }

        if self.config.use_pkg_config {
            match probe_pkg_config() {
                Ok(Some(library)) => {
                    if let Some(detection) = self.accept_installed(library)? {
                        return Ok(detection);
                    }
                }
                Ok(None) => {}
                Err(err) => warn!("ignoring pkg-config libcec: {err}"),
            }
        }

        match self.system() {
            Ok(detection) => Ok(detection),
            Err(DetectError::NoSupportedLibrary { attempts }) => {
                info!("no usable system libcec, falling back to vendored sources");
                match self.vendored() {
                    Err(DetectError::VendoredSourcesMissing { path }) => {
                        warn!("vendored sources not found at {}", path.display());
                        Err(DetectError::NoSupportedLibrary { attempts })
                    }
                    other => other,
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Accepts a pkg-config result once the matching probe compiles against it.
    ///
    /// Returns `Ok(None)` when the probe disagrees with pkg-config, so the
    /// caller can fall through to the next strategy.
    pub fn accept_installed(
        &self,
        library: InstalledLibrary,
    ) -> Result<Option<Detection>, DetectError> {
        self.check_forced(library.version)?;

        let runner = self
            .runner
            .clone()
            .include_dirs(library.include_paths.iter().cloned())
            .link_dirs(library.link_paths.iter().cloned());
        let outcome = runner.run(Probe::new(library.version))?;
        if let Err(err) = outcome.result {
            warn!(
                "pkg-config reports libcec {} but smoke_abi{} failed: {err}",
                library.version_string,
                library.version.major()
            );
            return Ok(None);
        }

        let link_libs = if library.libs.is_empty() {
            vec![LINK_NAME.to_string()]
        } else {
            library.libs
        };
        Ok(Some(Detection {
            version: library.version,
            source: LinkSource::PkgConfig,
            include_dirs: library.include_paths,
            link_search: library.link_paths,
            link_libs,
        }))
    }

    /// Runs every candidate probe against the configured search paths.
    pub fn system(&self) -> Result<Detection, DetectError> {
        let runner = self
            .runner
            .clone()
            .include_dirs(self.config.include_dirs.iter().cloned())
            .link_dirs(self.config.lib_dirs.iter().cloned());
        let probes: Vec<Probe> = self
            .config
            .candidate_versions()
            .into_iter()
            .map(Probe::new)
            .collect();
        let attempts = runner.run_all(&probes)?;

        match select(&attempts) {
            Some(version) => Ok(Detection {
                version,
                source: LinkSource::System,
                include_dirs: self.config.include_dirs.clone(),
                link_search: self.config.lib_dirs.clone(),
                link_libs: vec![LINK_NAME.to_string()],
            }),
            None => Err(DetectError::NoSupportedLibrary { attempts }),
        }
    }

    /// Builds the vendored sources.
    pub fn vendored(&self) -> Result<Detection, DetectError> {
        let src_dir = vendored::source_dir(&self.config.manifest_dir);
        let version = vendored::vendored_version(&src_dir)?;
        self.check_forced(version)?;
        info!("building vendored libcec {version}");
        let lib_dir = vendored::build(&src_dir, &self.config.out_dir)?;
        Ok(Detection {
            version,
            source: LinkSource::Vendored,
            include_dirs: vec![
                self.config
                    .out_dir
                    .join("libcec_build")
                    .join("include")
                    .join("libcec"),
            ],
            link_search: vec![lib_dir],
            link_libs: vec![LINK_NAME.to_string()],
        })
    }

    fn check_forced(&self, version: AbiVersion) -> Result<(), DetectError> {
        match self.config.forced_abi {
            Some(forced) if forced != version => Err(DetectError::VersionMismatch {
                expected: forced.major(),
                actual: version.major(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(source: LinkSource) -> Detection {
        Detection {
            version: AbiVersion::V6,
            source,
            include_dirs: Vec::new(),
            link_search: vec![PathBuf::from("/opt/cec/lib")],
            link_libs: vec!["cec".to_string()],
        }
    }

    #[test]
    fn system_directives() {
        let lines = detection(LinkSource::System).cargo_directives();
        assert_eq!(
            lines,
            vec![
                "cargo:rustc-check-cfg=cfg(abi4)",
                "cargo:rustc-check-cfg=cfg(abi5)",
                "cargo:rustc-check-cfg=cfg(abi6)",
                "cargo:rustc-check-cfg=cfg(abi7)",
                "cargo:rustc-cfg=abi6",
                "cargo:libcec_version_major=6",
                "cargo:rustc-link-search=native=/opt/cec/lib",
                "cargo:rustc-link-lib=cec",
                "cargo:rustc-env=LIBCEC_SYS_LINK_SOURCE=system",
            ]
        );
    }

    #[test]
    fn vendored_directives_mark_vendoring() {
        let lines = detection(LinkSource::Vendored).cargo_directives();
        assert!(lines.contains(&"cargo:lib_vendored=true".to_string()));
        assert!(lines.contains(&"cargo:rustc-env=LIBCEC_SYS_LINK_SOURCE=vendored".to_string()));
    }

    #[test]
    fn exactly_one_abi_cfg() {
        let lines = detection(LinkSource::PkgConfig).cargo_directives();
        let cfgs: Vec<&String> = lines
            .iter()
            .filter(|line| line.starts_with("cargo:rustc-cfg="))
            .collect();
        assert_eq!(cfgs, vec!["cargo:rustc-cfg=abi6"]);
    }
}
