//! libcec C entry points shared by every supported ABI.

use std::ffi::CStr;
use std::marker::{PhantomData, PhantomPinned};
use std::os::raw::{c_char, c_void};

/// Opaque libcec configuration. Its layout differs between ABIs, so it is
/// only ever handled by pointer.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct libcec_configuration {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Connection handle returned by `libcec_initialise`.
#[allow(non_camel_case_types)]
pub type libcec_connection_t = *mut c_void;

unsafe extern "C" {
    /// Creates a connection for `configuration`. Returns null on failure.
    pub fn libcec_initialise(configuration: *mut libcec_configuration) -> libcec_connection_t;

    /// Releases a connection created by `libcec_initialise`.
    pub fn libcec_destroy(connection: libcec_connection_t);

    /// Library build information. Owned by libcec.
    pub fn libcec_get_lib_info(connection: libcec_connection_t) -> *const c_char;
}

/// Returns the build information string of `connection`.
///
/// # Safety
///
/// `connection` must be null or a live handle returned by `libcec_initialise`.
pub unsafe fn lib_info(connection: libcec_connection_t) -> Option<String> {
    if connection.is_null() {
        return None;
    }
    // Safety: connection is a live handle per the caller's contract.
    let value = unsafe { libcec_get_lib_info(connection) };
    read_cstr(value)
}

pub(crate) fn read_cstr(value: *const c_char) -> Option<String> {
    if value.is_null() {
        return None;
    }
    // Safety: libcec returns NUL-terminated strings that outlive this call.
    let cstr = unsafe { CStr::from_ptr(value) };
    Some(cstr.to_string_lossy().into_owned())
}
