//! Known status codes and the Code Labeler.
//!
//! This table is the single source of truth for human-readable diagnostics.
//! It covers the general-purpose COM codes and the display-adapter (DXGI) and
//! Direct3D 12 error families seen by compute workloads.
//!
//! Labels are the constant names themselves; anything outside the table maps
//! to [`UNKNOWN_LABEL`]. Membership here says nothing about success or
//! failure: `S_OK` and `S_FALSE` are known and succeed, while a code absent
//! from the table can still fail.
//!
//! ```rust
//! use dx_status::{definitions, StatusCode};
//!
//! assert_eq!(definitions::label(definitions::E_INVALIDARG), "E_INVALIDARG");
//! assert_eq!(definitions::label(StatusCode::from_bits(0x8000_0FFF)), "UNKNOWN");
//! ```

use crate::{define_status_codes, StatusCode};

/// Sentinel label for codes outside the table.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

define_status_codes! {
    // Success
    /// Operation succeeded.
    S_OK = 0x0000_0000,
    /// Operation succeeded with an approximate or partial result.
    S_FALSE = 0x0000_0001,

    // General-purpose (FACILITY_NULL / FACILITY_WIN32)
    /// Not implemented.
    E_NOTIMPL = 0x8000_4001,
    /// Ran out of memory.
    E_OUTOFMEMORY = 0x8007_000E,
    /// One or more arguments are invalid.
    E_INVALIDARG = 0x8007_0057,
    /// Interface not supported.
    E_NOINTERFACE = 0x8000_4002,
    /// Invalid pointer.
    E_POINTER = 0x8000_4003,
    /// Invalid handle.
    E_HANDLE = 0x8007_0006,
    /// Operation aborted.
    E_ABORT = 0x8000_4004,
    /// Unspecified failure.
    E_FAIL = 0x8000_4005,
    /// General access denied.
    E_ACCESSDENIED = 0x8007_0005,
    /// Catastrophic failure.
    E_UNEXPECTED = 0x8000_FFFF,

    // DXGI (0x887A____)
    /// The application made a call that is invalid.
    DXGI_ERROR_INVALID_CALL = 0x887A_0001,
    /// The object was not found.
    DXGI_ERROR_NOT_FOUND = 0x887A_0002,
    /// The buffer supplied is not big enough to hold the requested data.
    DXGI_ERROR_MORE_DATA = 0x887A_0003,
    /// The requested functionality is not supported by the device or driver.
    DXGI_ERROR_UNSUPPORTED = 0x887A_0004,
    /// The adapter was physically removed or the driver upgraded.
    DXGI_ERROR_DEVICE_REMOVED = 0x887A_0005,
    /// The device failed due to a badly formed command.
    DXGI_ERROR_DEVICE_HUNG = 0x887A_0006,
    /// The device failed due to a badly formed command and was reset.
    DXGI_ERROR_DEVICE_RESET = 0x887A_0007,
    /// The GPU was busy when the operation was requested.
    DXGI_ERROR_WAS_STILL_DRAWING = 0x887A_000A,
    /// The driver encountered a problem and was put into the removed state.
    DXGI_ERROR_DRIVER_INTERNAL_ERROR = 0x887A_0020,

    // D3D12 (0x887E____)
    /// The specified cached adapter could not be found.
    D3D12_ERROR_ADAPTER_NOT_FOUND = 0x887E_0001,
    /// The driver version does not match the cached state.
    D3D12_ERROR_DRIVER_VERSION_MISMATCH = 0x887E_0002,
}

/// Reverse lookup from a label to its code.
///
/// The sentinel label never resolves.
pub fn lookup(name: &str) -> Option<StatusCode> {
    KNOWN_STATUS_CODES
        .iter()
        .copied()
        .find(|code| label(*code) == name)
}
