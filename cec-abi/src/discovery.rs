//! Discovery of an installed libcec through pkg-config.

use std::path::PathBuf;

use log::{debug, info};

use crate::error::DetectError;
use crate::version::AbiVersion;

/// Oldest libcec release with a supported ABI.
pub const MIN_LIBCEC_VERSION: &str = "4.0.0";

/// pkg-config package name of libcec.
pub const PACKAGE: &str = "libcec";

/// An installed libcec reported by pkg-config.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstalledLibrary {
    pub version: AbiVersion,
    pub version_string: String,
    pub include_paths: Vec<PathBuf>,
    pub link_paths: Vec<PathBuf>,
    pub libs: Vec<String>,
}

impl InstalledLibrary {
    /// Builds a record from the version pkg-config reported.
    pub fn from_parts(
        version_string: &str,
        include_paths: Vec<PathBuf>,
        link_paths: Vec<PathBuf>,
        libs: Vec<String>,
    ) -> Result<Self, DetectError> {
        let version = AbiVersion::from_version_str(version_string).ok_or_else(|| {
            DetectError::UnsupportedVersion {
                major: leading_major(version_string).unwrap_or(0),
            }
        })?;
        Ok(Self {
            version,
            version_string: version_string.trim().to_string(),
            include_paths,
            link_paths,
            libs,
        })
    }
}

/// Looks libcec up with pkg-config.
///
/// Returns `Ok(None)` when pkg-config does not know libcec. Nothing is
/// printed for cargo; link directives come from the final detection.
pub fn probe_pkg_config() -> Result<Option<InstalledLibrary>, DetectError> {
    let library = match pkg_config::Config::new()
        .atleast_version(MIN_LIBCEC_VERSION)
        .cargo_metadata(false)
        .probe(PACKAGE)
    {
        Ok(library) => library,
        Err(err) => {
            debug!("pkg_config(>={MIN_LIBCEC_VERSION}) -> fail: {err}");
            return Ok(None);
        }
    };

    info!("pkg_config(>={MIN_LIBCEC_VERSION}) -> found {}", library.version);
    InstalledLibrary::from_parts(
        &library.version,
        library.include_paths,
        library.link_paths,
        library.libs,
    )
    .map(Some)
}

fn leading_major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_version_maps_to_abi() {
        let library = InstalledLibrary::from_parts(
            "6.0.2\n",
            vec![PathBuf::from("/usr/include/libcec")],
            vec![PathBuf::from("/usr/lib")],
            vec!["cec".to_string()],
        )
        .unwrap();
        assert_eq!(library.version, AbiVersion::V6);
        assert_eq!(library.version_string, "6.0.2");
        assert_eq!(library.include_paths, vec![PathBuf::from("/usr/include/libcec")]);
        assert_eq!(library.libs, vec!["cec".to_string()]);
    }

    #[test]
    fn unsupported_major_is_reported() {
        let err = InstalledLibrary::from_parts("9.1.0", Vec::new(), Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, DetectError::UnsupportedVersion { major: 9 }));
    }

    #[test]
    fn garbage_version_is_unsupported() {
        let err = InstalledLibrary::from_parts("unknown", Vec::new(), Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, DetectError::UnsupportedVersion { major: 0 }));
    }
}
