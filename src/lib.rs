//! Raw FFI bindings to libcec.
//!
//! The build script selects the libcec to link and sets exactly one of the
//! `abi4`, `abi5`, `abi6` or `abi7` cfgs to the major ABI it verified. Crates
//! depending on `libcec-sys` can read the same value from the
//! `DEP_CEC_LIBCEC_VERSION_MAJOR` environment variable in their build scripts.

mod ffi;

pub use ffi::*;

#[cfg(not(any(abi4, abi5, abi6, abi7)))]
compile_error!("libcec ABI was not detected by the build script");

/// Major version of the linked libcec, as verified at build time.
#[cfg(abi4)]
pub const CEC_LIB_VERSION_MAJOR: u32 = 4;
#[cfg(abi5)]
pub const CEC_LIB_VERSION_MAJOR: u32 = 5;
#[cfg(abi6)]
pub const CEC_LIB_VERSION_MAJOR: u32 = 6;
#[cfg(abi7)]
pub const CEC_LIB_VERSION_MAJOR: u32 = 7;

#[cfg(abi4)]
pub const CEC_LIB_VERSION_MAJOR_STR: &str = "4";
#[cfg(abi5)]
pub const CEC_LIB_VERSION_MAJOR_STR: &str = "5";
#[cfg(abi6)]
pub const CEC_LIB_VERSION_MAJOR_STR: &str = "6";
#[cfg(abi7)]
pub const CEC_LIB_VERSION_MAJOR_STR: &str = "7";

/// Where the linked libcec came from: `pkg-config`, `system` or `vendored`.
pub const LINK_SOURCE: &str = env!("LIBCEC_SYS_LINK_SOURCE");
