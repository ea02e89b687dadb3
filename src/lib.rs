//! # dx_status
//!
//! Status-code labeling and failure bridging for a DirectX compute runtime
//! binding.
//!
//! Every fallible call into the native compute API returns a 32-bit
//! [`StatusCode`]. This crate turns those codes into something a Rust caller
//! can act on:
//!
//! 1. **Code Labeler**: [`definitions::label`] maps each known code to a fixed
//!    label (`"E_INVALIDARG"`, `"DXGI_ERROR_DEVICE_REMOVED"`, ...) and every
//!    other code to `"UNKNOWN"`.
//! 2. **Failure Bridge**: [`check`], [`StatusCode::ok`] and [`check_status!`]
//!    return `Ok(())` on success and a [`Diagnostic`] on failure, carrying the
//!    code and the call site that observed it.
//! 3. **Collaborators**: the [`runtime`] module shows the contract for device,
//!    context, kernel and buffer wrappers: each owns exactly one native handle
//!    and routes every fallible native call through the bridge.
//!
//! ## Quick Start
//!
//! ```rust
//! use dx_status::{check, definitions, Result, StatusCode};
//!
//! fn create_device(native_status: StatusCode) -> Result<()> {
//!     check(native_status)?;
//!     Ok(())
//! }
//!
//! assert!(create_device(definitions::S_OK).is_ok());
//! assert!(create_device(definitions::S_FALSE).is_ok());
//!
//! let err = create_device(definitions::E_INVALIDARG).unwrap_err();
//! assert_eq!(err.code(), definitions::E_INVALIDARG);
//! assert!(err.message().ends_with("Failure with HRESULT of 80070057, E_INVALIDARG"));
//! ```
//!
//! ## Propagation Policy
//!
//! The bridge never recovers, retries, or interprets a failure beyond its
//! label. It always raises and leaves the decision to catch, enrich
//! ([`ResultExt`]), or re-raise to the nearest collaborator.
//!
//! ## Call Sites
//!
//! The recorded file and line are always those of the code that invoked the
//! bridge: `#[track_caller]` for the functions, invocation-site `file!()` /
//! `line!()` for the macros.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::result;
use std::sync::OnceLock;

pub mod codes;
pub mod context;
pub mod convenience;
pub mod definitions;
pub mod handle;
pub mod logging;
pub mod ring_buffer;
pub mod runtime;

pub use codes::*;
pub use context::*;
pub use handle::*;
pub use logging::*;
pub use ring_buffer::*;

/// Type alias for Results using the bridge's error type.
pub type Result<T> = result::Result<T, Diagnostic>;

/// Fixed marker between the call site and the description in diagnostic text.
pub const MESSAGE_MARKER: &str = " throw message - ";

// ============================================================================
// Diagnostic
// ============================================================================

/// Error raised when a native call returns a failing status code.
///
/// # Fields
///
/// - the originating [`StatusCode`], for programmatic handling
/// - the source file, line and column of the failing check
/// - optional collaborator context (see [`context`])
///
/// # Formatting
///
/// The one-line description is built on first request and stored in this
/// instance only:
///
/// ```text
/// {file}:{line} throw message - Failure with HRESULT of {hex}, {label}
/// ```
///
/// No buffer is shared between instances, so formatting from several threads
/// at once is safe.
///
/// # Ownership
///
/// Not `Clone`. A Diagnostic is created at the instant a failure is detected
/// and consumed by whichever frame handles it.
#[must_use = "diagnostics should be propagated or logged"]
pub struct Diagnostic {
    code: StatusCode,
    file: &'static str,
    line: u32,
    column: u32,
    context: DiagnosticContext,
    message: OnceLock<String>,
}

impl Diagnostic {
    /// Create a Diagnostic for `code` observed at `file:line:column`.
    ///
    /// Normally reached through [`check`] or [`check_status!`]; exposed for
    /// collaborators that capture their own site.
    #[inline]
    pub fn new(code: StatusCode, file: &'static str, line: u32, column: u32) -> Self {
        Self {
            code,
            file,
            line,
            column,
            context: DiagnosticContext::new(),
            message: OnceLock::new(),
        }
    }

    /// Create a Diagnostic from a captured [`Location`].
    #[inline]
    pub fn at(code: StatusCode, location: &'static Location<'static>) -> Self {
        Self::new(code, location.file(), location.line(), location.column())
    }

    /// Originating status code.
    #[inline]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Label of the originating code.
    #[inline]
    pub const fn label(&self) -> &'static str {
        self.code.label()
    }

    /// Source file of the failing check.
    #[inline]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Source line of the failing check.
    #[inline]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Source column of the failing check.
    #[inline]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Success, known failure, or unknown failure.
    #[inline]
    pub const fn outcome(&self) -> Outcome {
        self.code.outcome()
    }

    /// Operation attached by the first collaborator that named one.
    #[inline]
    pub fn operation(&self) -> Option<&str> {
        self.context.operation()
    }

    /// Collaborator context.
    #[inline]
    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    /// Formatted description, computed once per instance.
    pub fn message(&self) -> &str {
        self.message.get_or_init(|| {
            format!(
                "{}:{}{}Failure with HRESULT of {:x}, {}",
                self.file,
                self.line,
                MESSAGE_MARKER,
                self.code,
                self.code.label()
            )
        })
    }

    /// Name the operation that failed. Consumes and returns the Diagnostic.
    #[inline]
    pub fn with_operation(mut self, operation: impl Into<Cow<'static, str>>) -> Self {
        self.context.push_operation(operation);
        self
    }

    /// Attach a key/value pair. Consumes and returns the Diagnostic.
    #[inline]
    pub fn with_metadata(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.context.push_metadata(key, value);
        self
    }

    /// Structured log view borrowing from this Diagnostic.
    #[inline]
    pub fn log(&self) -> DiagnosticLog<'_> {
        DiagnosticLog {
            code: self.code,
            label: self.code.label(),
            file: self.file,
            line: self.line,
            column: self.column,
            operation: self.context.operation(),
            metadata: self.context.metadata(),
        }
    }

    /// Callback form of [`log`](Self::log); the view ends with the closure.
    #[inline]
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DiagnosticLog<'_>) -> R,
    {
        let log = self.log();
        f(&log)
    }
}

impl From<Diagnostic> for StatusCode {
    #[inline]
    fn from(err: Diagnostic) -> Self {
        err.code
    }
}

impl fmt::Debug for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostic")
            .field("code", &self.code)
            .field("label", &self.code.label())
            .field("file", &self.file)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("operation", &self.context.operation())
            .finish()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Diagnostic {}

// ============================================================================
// Failure Bridge
// ============================================================================

/// Raise a [`Diagnostic`] if `code` denotes failure.
///
/// Success codes, including the approximate-success `S_FALSE`, return
/// `Ok(())` without constructing anything. Failure codes are raised whether or
/// not they are in the label table. The recorded site is the caller's.
///
/// ```rust
/// use dx_status::{check, definitions, StatusCode};
///
/// assert!(check(definitions::S_FALSE).is_ok());
///
/// let line = line!() + 1;
/// let err = check(StatusCode::from_bits(0x8BAD_F00D)).unwrap_err();
/// assert_eq!(err.line(), line);
/// assert_eq!(err.label(), "UNKNOWN");
/// ```
#[track_caller]
#[inline]
pub fn check(code: StatusCode) -> Result<()> {
    if code.is_failure() {
        Err(Diagnostic::at(code, Location::caller()))
    } else {
        Ok(())
    }
}

impl StatusCode {
    /// Method form of [`check`].
    ///
    /// ```rust
    /// use dx_status::definitions;
    ///
    /// assert!(definitions::S_OK.ok().is_ok());
    /// assert!(definitions::E_ABORT.ok().is_err());
    /// ```
    #[track_caller]
    #[inline]
    pub fn ok(self) -> Result<()> {
        check(self)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn success_codes_are_noops() {
        assert!(check(definitions::S_OK).is_ok());
        assert!(check(definitions::S_FALSE).is_ok());
        assert!(check(StatusCode::new(0x7FFF_FFFF)).is_ok());
    }

    #[test]
    fn every_known_failure_is_raised() {
        for code in definitions::KNOWN_STATUS_CODES {
            assert_eq!(check(*code).is_err(), code.is_failure(), "{code}");
        }
    }

    #[test]
    fn unknown_failure_is_raised_with_sentinel() {
        let err = check(StatusCode::from_bits(0x8000_0FFF)).unwrap_err();
        assert_eq!(err.label(), definitions::UNKNOWN_LABEL);
        assert_eq!(err.outcome(), Outcome::UnknownFailure);
        assert!(err.message().ends_with("Failure with HRESULT of 80000fff, UNKNOWN"));
    }

    #[test]
    fn invalid_argument_scenario() {
        let line = line!() + 1;
        let err = check(definitions::E_INVALIDARG).unwrap_err();

        assert_eq!(err.label(), "E_INVALIDARG");
        assert_eq!(
            err.message(),
            format!(
                "{}:{} throw message - Failure with HRESULT of 80070057, E_INVALIDARG",
                file!(),
                line
            )
        );
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn method_form_tracks_its_caller() {
        let line = line!() + 1;
        let err = definitions::DXGI_ERROR_DEVICE_REMOVED.ok().unwrap_err();
        assert_eq!(err.line(), line);
        assert_eq!(err.file(), file!());
    }

    #[test]
    fn message_is_memoized_per_instance() {
        let err = check(definitions::E_FAIL).unwrap_err();
        let first = err.message() as *const str;
        let second = err.message() as *const str;
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn concurrent_formatting_does_not_mix_messages() {
        let codes = [
            definitions::E_OUTOFMEMORY,
            definitions::DXGI_ERROR_DEVICE_HUNG,
            definitions::E_ACCESSDENIED,
            StatusCode::from_bits(0x8123_4567),
        ];

        let handles: Vec<_> = codes
            .iter()
            .copied()
            .map(|code| {
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    for _ in 0..500 {
                        let err = check(code).unwrap_err();
                        seen.push(err.to_string());
                    }
                    (code, seen)
                })
            })
            .collect();

        for handle in handles {
            let (code, seen) = handle.join().expect("thread panicked");
            let suffix = format!("{:x}, {}", code, code.label());
            assert!(seen.iter().all(|m| m.ends_with(&suffix)));
        }
    }

    #[test]
    fn shared_diagnostic_formats_once_across_threads() {
        let err = Arc::new(check(definitions::DXGI_ERROR_DRIVER_INTERNAL_ERROR).unwrap_err());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let err = Arc::clone(&err);
                thread::spawn(move || err.message().to_owned())
            })
            .collect();

        for handle in handles {
            let message = handle.join().expect("thread panicked");
            assert_eq!(message, err.message());
            assert!(message.ends_with("887a0020, DXGI_ERROR_DRIVER_INTERNAL_ERROR"));
        }
    }

    #[test]
    fn debug_shows_code_and_site() {
        let err = check(definitions::E_NOINTERFACE)
            .map_err(|e| e.with_operation("query_interface"))
            .unwrap_err();
        let debug = format!("{:?}", err);

        assert!(debug.contains("E_NOINTERFACE"));
        assert!(debug.contains("query_interface"));
        assert!(debug.contains(file!()));
    }

    #[test]
    fn diagnostic_converts_back_to_code() {
        let err = check(definitions::E_UNEXPECTED).unwrap_err();
        assert_eq!(StatusCode::from(err), definitions::E_UNEXPECTED);
    }

    #[test]
    fn diagnostic_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Diagnostic>();
    }
}
