//! Building libcec from the `vendor/` git submodule.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::DetectError;
use crate::version::AbiVersion;

const P8_PLATFORM_DIR_ENV: &str = "p8-platform_DIR";
const LIBCEC_BUILD: &str = "libcec_build";
const PLATFORM_BUILD: &str = "platform_build";
const LIBCEC_SRC: &str = "vendor";
const MAJOR_DIRECTIVE: &str = "set(LIBCEC_VERSION_MAJOR ";

/// Location of the vendored sources relative to the crate root.
pub fn source_dir(manifest_dir: &Path) -> PathBuf {
    manifest_dir.join(LIBCEC_SRC)
}

/// Reads the major version from a line such as `set(LIBCEC_VERSION_MAJOR 6)`.
pub fn parse_cmake_major(cmakelists: &str) -> Option<u32> {
    cmakelists
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(MAJOR_DIRECTIVE))
        .and_then(|line| {
            let digits: String = line.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
}

/// Vendored files whose changes should rerun the build script.
///
/// Empty without a checkout: cargo reruns on every build when told to watch
/// a path that does not exist.
pub fn rerun_files(src_dir: &Path) -> Vec<PathBuf> {
    let cmakelists = src_dir.join("CMakeLists.txt");
    if cmakelists.exists() {
        vec![cmakelists]
    } else {
        Vec::new()
    }
}

/// ABI of the vendored sources under `src_dir`.
pub fn vendored_version(src_dir: &Path) -> Result<AbiVersion, DetectError> {
    let cmakelists = src_dir.join("CMakeLists.txt");
    if !cmakelists.exists() {
        return Err(DetectError::VendoredSourcesMissing { path: cmakelists });
    }
    let content = fs::read_to_string(&cmakelists)?;
    let major = parse_cmake_major(&content).ok_or(DetectError::CmakeVersion {
        path: cmakelists.clone(),
    })?;
    AbiVersion::from_major(major).ok_or(DetectError::UnsupportedVersion { major })
}

/// Copies the sources into `out_dir` and disables libcec's git build info.
pub fn prepare(src_dir: &Path, out_dir: &Path) -> Result<PathBuf, DetectError> {
    let dst_src = out_dir.join(LIBCEC_SRC);
    if dst_src.is_dir() {
        fs::remove_dir_all(&dst_src).map_err(|source| DetectError::VendoredBuild {
            step: "remove stale sources",
            source,
        })?;
    }
    let skipped = copy_dir::copy_dir(src_dir, &dst_src).map_err(|source| {
        DetectError::VendoredBuild {
            step: "copy sources",
            source,
        }
    })?;
    for err in skipped {
        warn!("vendored copy skipped an entry: {err}");
    }

    // LIB_INFO embeds the git revision, which breaks builds outside a checkout.
    let build_info = dst_src
        .join("src")
        .join("libcec")
        .join("cmake")
        .join("SetBuildInfo.cmake");
    fs::write(&build_info, b"set(LIB_INFO \"\")").map_err(|source| {
        DetectError::VendoredBuild {
            step: "rewrite SetBuildInfo.cmake",
            source,
        }
    })?;
    Ok(dst_src)
}

/// Builds p8-platform and libcec with cmake. Returns the library directory.
pub fn build(src_dir: &Path, out_dir: &Path) -> Result<PathBuf, DetectError> {
    let dst_src = prepare(src_dir, out_dir)?;
    let platform_build = out_dir.join(PLATFORM_BUILD);
    let libcec_build = out_dir.join(LIBCEC_BUILD);
    fs::create_dir_all(&platform_build)?;
    fs::create_dir_all(&libcec_build)?;

    info!("cmake platform");
    cmake::Config::new(dst_src.join("src").join("platform"))
        .out_dir(&platform_build)
        .env(P8_PLATFORM_DIR_ENV, &platform_build)
        .build();

    info!("cmake libcec");
    cmake::Config::new(&dst_src)
        .out_dir(&libcec_build)
        .env(P8_PLATFORM_DIR_ENV, &platform_build)
        .build();

    Ok(libcec_build.join("lib"))
}
