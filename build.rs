//! Build script for libcec-sys.
//!
//! Detects the libcec to link and its major ABI, then tells cargo how to link
//! it and which `abiN` cfg to set.

use cec_abi::{BuildConfig, DetectError, Detector};
use log::{error, info};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for var in BuildConfig::rerun_env_vars() {
        println!("cargo:rerun-if-env-changed={var}");
    }

    if let Err(err) = run() {
        error!("{err}");
        panic!("libcec-sys: {err}");
    }
}

fn run() -> Result<(), DetectError> {
    let config = BuildConfig::from_env()?;
    for path in cec_abi::rerun_files(&cec_abi::source_dir(&config.manifest_dir)) {
        println!("cargo:rerun-if-changed={}", path.display());
    }
    if let Err(err) = cec_abi::init_logging(&config.log_filter) {
        println!("cargo:warning=libcec-sys: {err}");
    }

    let detection = Detector::new(&config)?.detect()?;
    info!(
        "linking libcec ABI {} from {}",
        detection.version, detection.source
    );
    for line in detection.cargo_directives() {
        println!("{line}");
    }
    Ok(())
}
