//! Native status codes and the success/failure predicate.
//!
//! A [`StatusCode`] is the 32-bit `HRESULT`-shaped value returned by every
//! fallible call into the compute API. Codes are partitioned into success and
//! failure by a single sign test on the value:
//!
//! - **Success**: the severity bit is clear (`value >= 0`). This covers `S_OK`
//!   and the "OK but approximate" `S_FALSE`, as well as any positive status.
//! - **Failure**: the severity bit is set (`value < 0`).
//!
//! The predicate is independent of the label table in
//! [`definitions`](crate::definitions): a code can be known and still succeed,
//! and an unknown code can still fail.
//!
//! # Example
//!
//! ```rust
//! use dx_status::{StatusCode, definitions};
//!
//! assert!(definitions::E_INVALIDARG.is_failure());
//! assert!(definitions::S_FALSE.is_success());
//! assert!(StatusCode::from_bits(0x8BAD_F00D).is_failure());
//!
//! assert_eq!(definitions::E_INVALIDARG.to_string(), "0x80070057");
//! assert_eq!(format!("{:x}", definitions::E_INVALIDARG), "80070057");
//! ```

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Status Code
// ============================================================================

/// A status code returned by a native compute API call.
///
/// Immutable and passed by value. The inner value is the signed
/// representation; [`bits`](Self::bits) gives the unsigned bit pattern used
/// when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StatusCode(i32);

impl StatusCode {
    /// Wrap a signed native value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Wrap an unsigned bit pattern, as codes are usually written (`0x8007_0057`).
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits as i32)
    }

    /// Signed value as returned by the native API.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Unsigned bit pattern.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    /// True when the severity bit is set.
    #[inline]
    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// True for `S_OK`, `S_FALSE` and every other non-negative status.
    #[inline]
    pub const fn is_success(self) -> bool {
        !self.is_failure()
    }

    /// Human-readable label from the known-code table, or `"UNKNOWN"`.
    #[inline]
    pub const fn label(self) -> &'static str {
        crate::definitions::label(self)
    }

    /// Whether the code has an entry in the known-code table.
    #[inline]
    pub const fn is_known(self) -> bool {
        crate::definitions::is_known(self)
    }

    /// Classify into the three-way outcome taxonomy.
    #[inline]
    pub const fn outcome(self) -> Outcome {
        if self.is_success() {
            Outcome::Success
        } else if self.is_known() {
            Outcome::KnownFailure
        } else {
            Outcome::UnknownFailure
        }
    }
}

impl From<i32> for StatusCode {
    #[inline]
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<StatusCode> for i32 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.value()
    }
}

impl fmt::Display for StatusCode {
    /// Renders `0x` followed by eight lower-case hex digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.bits())
    }
}

impl fmt::LowerHex for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.bits(), f)
    }
}

impl fmt::UpperHex for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.bits(), f)
    }
}

// ============================================================================
// Outcome Taxonomy
// ============================================================================

/// Three-way classification of a status code.
///
/// Whether a code is labeled never decides whether it propagates: both
/// failure variants are raised by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// No failure; nothing is raised.
    Success,
    /// Failure with an entry in the known-code table.
    KnownFailure,
    /// Failure absent from the table; raised with the sentinel label.
    UnknownFailure,
}

impl Outcome {
    /// Static name for logs.
    #[inline]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::KnownFailure => "known failure",
            Self::UnknownFailure => "unknown failure",
        }
    }

    /// True for both failure variants.
    #[inline]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Error returned when a string is not a recognizable status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatusCodeError {
    /// Input was empty or whitespace.
    Empty,
    /// `0x` prefix followed by something that is not a 32-bit hex number.
    InvalidHex,
    /// Neither a number nor a known label.
    Unrecognized,
}

impl fmt::Display for ParseStatusCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty status code"),
            Self::InvalidHex => f.write_str("invalid hexadecimal status code"),
            Self::Unrecognized => f.write_str("unrecognized status code or label"),
        }
    }
}

impl std::error::Error for ParseStatusCodeError {}

impl FromStr for StatusCode {
    type Err = ParseStatusCodeError;

    /// Accepts `0x`-prefixed hex, signed decimal, or a known label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseStatusCodeError::Empty);
        }

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let hex = hex.replace('_', "");
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseStatusCodeError::InvalidHex);
            }
            return u32::from_str_radix(&hex, 16)
                .map(Self::from_bits)
                .map_err(|_| ParseStatusCodeError::InvalidHex);
        }

        if let Ok(value) = s.parse::<i32>() {
            return Ok(Self::new(value));
        }

        crate::definitions::lookup(s).ok_or(ParseStatusCodeError::Unrecognized)
    }
}
