//! Collaborator context attached to a raised [`Diagnostic`](crate::Diagnostic).
//!
//! The bridge itself records only the code and the call site. Collaborators
//! that catch and re-raise may add what they were doing: an operation name
//! and a few key/value pairs (adapter index, buffer size, kernel entry point).
//! Context never changes the code, the site, or the formatted message; it only
//! shows up in the structured [`DiagnosticLog`](crate::DiagnosticLog).
//!
//! # Example
//!
//! ```rust
//! use dx_status::{check, definitions, ResultExt, Result};
//!
//! fn create_buffer(status: i32, size: u64) -> Result<()> {
//!     check(status.into())
//!         .context("create_buffer")
//!         .with_metadata("size", size.to_string())
//! }
//!
//! let err = create_buffer(definitions::E_OUTOFMEMORY.value(), 1 << 20).unwrap_err();
//! assert_eq!(err.operation(), Some("create_buffer"));
//! assert_eq!(err.code(), definitions::E_OUTOFMEMORY);
//! ```

use crate::{ContextField, Result};
use smallvec::SmallVec;
use std::borrow::Cow;
use zeroize::Zeroize;

/// Metadata key used when a second operation wraps an already-named failure.
pub const WITHIN_KEY: &str = "within";

/// Operation name and metadata carried by a Diagnostic.
///
/// # Capacity
///
/// Metadata is stored inline for up to four entries, which covers every
/// collaborator in this crate; more spill to the heap.
#[derive(Default)]
pub struct DiagnosticContext {
    operation: Option<Cow<'static, str>>,
    metadata: SmallVec<[(&'static str, ContextField); 4]>,
}

impl DiagnosticContext {
    /// Empty context.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation.
    ///
    /// The first operation wins; later ones are kept as `within` metadata so
    /// the innermost failing call stays the primary operation.
    pub fn push_operation(&mut self, operation: impl Into<Cow<'static, str>>) {
        let operation = operation.into();
        if self.operation.is_none() {
            self.operation = Some(operation);
        } else {
            self.metadata.push((WITHIN_KEY, ContextField::from(operation)));
        }
    }

    /// Append a key/value pair.
    #[inline]
    pub fn push_metadata(&mut self, key: &'static str, value: impl Into<Cow<'static, str>>) {
        self.metadata.push((key, ContextField::from(value.into())));
    }

    /// Primary operation, if one was recorded.
    #[inline]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Metadata in attachment order.
    #[inline]
    pub fn metadata(&self) -> &[(&'static str, ContextField)] {
        &self.metadata
    }

    /// Whether neither an operation nor metadata was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operation.is_none() && self.metadata.is_empty()
    }
}

impl Zeroize for DiagnosticContext {
    fn zeroize(&mut self) {
        if let Some(Cow::Owned(ref mut s)) = self.operation {
            s.zeroize();
        }
        for (_, value) in &mut self.metadata {
            value.zeroize();
        }
        self.metadata.clear();
    }
}

impl Drop for DiagnosticContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Context enrichment on `Result<T, Diagnostic>`.
///
/// Both methods are no-ops on `Ok` and move the Diagnostic through on `Err`,
/// so the raised error is propagated unchanged apart from its context.
pub trait ResultExt<T> {
    /// Name the operation that failed.
    fn context(self, operation: impl Into<Cow<'static, str>>) -> Result<T>;

    /// Attach a key/value pair.
    fn with_metadata(self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[inline]
    fn context(self, operation: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|err| err.with_operation(operation))
    }

    #[inline]
    fn with_metadata(self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|err| err.with_metadata(key, value))
    }
}
