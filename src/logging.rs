//! Structured log view of a raised [`Diagnostic`](crate::Diagnostic).
//!
//! # Properties
//!
//! - Borrows from the Diagnostic with an explicit lifetime and cannot outlive it
//! - Accessors never allocate
//! - `write_to` streams into any `fmt::Write` and truncates oversized fields
//!
//! The one-line [`message`](crate::Diagnostic::message) is the console form;
//! this view is for log pipelines that want the code, label, site and
//! collaborator context as separate fields.

use crate::StatusCode;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length for any individual field in formatted output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Metadata value attached by a collaborator, cleared on drop when owned.
///
/// Borrowed values are assumed static and are not zeroized.
#[derive(Debug)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// The stored value.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Structured log entry borrowing from a Diagnostic.
///
/// # Example
///
/// ```rust
/// use dx_status::{check, definitions, ResultExt};
///
/// let err = check(definitions::DXGI_ERROR_DEVICE_HUNG)
///     .context("synchronize")
///     .unwrap_err();
///
/// let log = err.log();
/// assert_eq!(log.label(), "DXGI_ERROR_DEVICE_HUNG");
/// assert_eq!(log.operation(), Some("synchronize"));
/// ```
#[derive(Debug)]
pub struct DiagnosticLog<'a> {
    /// Originating status code.
    pub code: StatusCode,
    /// Label of the code, or `UNKNOWN`.
    pub label: &'static str,
    /// Source file of the failing check.
    pub file: &'static str,
    /// Source line of the failing check.
    pub line: u32,
    /// Source column of the failing check.
    pub column: u32,
    /// Operation attached by a collaborator.
    pub operation: Option<&'a str>,
    /// Collaborator metadata in attachment order.
    pub metadata: &'a [(&'static str, ContextField)],
}

impl<'a> DiagnosticLog<'a> {
    /// Write the entry to a formatter without intermediate allocation.
    ///
    /// Layout:
    /// `[{code}] {label} at {file}:{line}:{column} operation='..' key='..'`.
    /// The operation segment is omitted when none was attached.
    ///
    /// ```rust
    /// # use dx_status::{check, definitions, ResultExt};
    /// let err = check(definitions::E_OUTOFMEMORY)
    ///     .context("create_buffer")
    ///     .with_metadata("size", "4096")
    ///     .unwrap_err();
    ///
    /// let mut line = String::new();
    /// err.with_log(|log| log.write_to(&mut line)).unwrap();
    /// assert!(line.starts_with("[0x8007000e] E_OUTOFMEMORY at "));
    /// assert!(line.ends_with(" operation='create_buffer' size='4096'"));
    /// ```
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}:{}:{}",
            self.code,
            self.label,
            truncate_with_indicator(self.file),
            self.line,
            self.column
        )?;

        if let Some(operation) = self.operation {
            write!(f, " operation='{}'", truncate_with_indicator(operation))?;
        }

        for (key, value) in self.metadata {
            write!(f, " {}='{}'", key, truncate_with_indicator(value.as_str()))?;
        }

        Ok(())
    }

    /// Originating status code.
    #[inline]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Label of the code.
    #[inline]
    pub const fn label(&self) -> &'static str {
        self.label
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

    /// Operation attached by a collaborator, if any.
    #[inline]
    pub const fn operation(&self) -> Option<&str> {
        self.operation
    }

    /// Collaborator metadata in attachment order.
    #[inline]
    pub const fn metadata(&self) -> &[(&'static str, ContextField)] {
        self.metadata
    }

    /// First metadata value stored under `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Truncate a string for display.
///
/// Returns `Cow::Borrowed` when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
