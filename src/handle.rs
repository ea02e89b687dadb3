//! Exclusive ownership of native handles.
//!
//! Device, context, kernel and buffer wrappers each own exactly one native
//! resource. Duplicating such a wrapper would lead to a double release, so
//! these types are move-only:
//!
//! - [`NonCopyable`]: zero-sized marker. A struct that embeds it cannot derive
//!   `Clone` or `Copy`.
//! - [`UniqueHandle`]: owns a [`RawHandle`] together with the API that issued
//!   it, and releases it exactly once.
//! - [`assert_unique_owner!`](crate::assert_unique_owner): compile-time check
//!   that a type does not implement `Clone`.
//!
//! ```rust,compile_fail
//! use dx_status::NonCopyable;
//!
//! #[derive(Clone)]
//! struct Wrapper {
//!     _owner: NonCopyable,
//! }
//! ```

use crate::runtime::ComputeApi;
use crate::{check, definitions, Diagnostic, Result};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Marker that forbids `Clone` and `Copy` on any struct embedding it.
///
/// Private field prevents construction by struct literal.
#[derive(Debug, Default, PartialEq, Eq, Hash)]
pub struct NonCopyable {
    _private: (),
}

impl NonCopyable {
    /// Create the marker.
    #[inline]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

/// Opaque native handle value.
///
/// Plain data: copying a `RawHandle` does not copy the resource. Ownership is
/// expressed by [`UniqueHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The null handle, written by the native API before a failed create.
    pub const NULL: Self = Self(0);

    /// Wrap a value written by the native API.
    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// The native value.
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Whether this is [`RawHandle::NULL`].
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Sole owner of a native handle.
///
/// Released through the issuing [`ComputeApi`] by [`close`](Self::close), or
/// best-effort on drop when `close` was never called. A release failure during
/// drop cannot be raised and is discarded; call `close` to observe it.
pub struct UniqueHandle {
    raw: RawHandle,
    api: Option<Arc<dyn ComputeApi>>,
    _owner: NonCopyable,
}

impl UniqueHandle {
    /// Take ownership of `raw`.
    ///
    /// A null handle reported alongside a success code is raised as
    /// `E_POINTER` at the caller's site.
    #[track_caller]
    pub fn new(api: Arc<dyn ComputeApi>, raw: RawHandle) -> Result<Self> {
        if raw.is_null() {
            return Err(Diagnostic::at(definitions::E_POINTER, Location::caller()));
        }
        Ok(Self {
            raw,
            api: Some(api),
            _owner: NonCopyable::new(),
        })
    }

    /// The owned handle, still owned.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Release now and raise the release status if it failed, at the
    /// caller's site.
    #[track_caller]
    pub fn close(mut self) -> Result<()> {
        match self.api.take() {
            Some(api) => check(api.release(self.raw)),
            None => Ok(()),
        }
    }

    /// Give up ownership without releasing.
    #[inline]
    pub fn into_raw(mut self) -> RawHandle {
        self.api = None;
        self.raw
    }
}

impl fmt::Debug for UniqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueHandle")
            .field("raw", &self.raw)
            .field("owned", &self.api.is_some())
            .finish()
    }
}

impl Drop for UniqueHandle {
    fn drop(&mut self) {
        if let Some(api) = self.api.take() {
            let _ = api.release(self.raw);
        }
    }
}

crate::assert_unique_owner!(NonCopyable, UniqueHandle);
