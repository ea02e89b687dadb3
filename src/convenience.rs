//! Macros shared by the bridge and its collaborators.
//!
//! - [`check_status!`]: run the Failure Bridge on a status expression, recording
//!   the invocation site.
//! - [`located_msg!`]: compose a `file:line`-prefixed contextual message.
//! - [`define_status_codes!`]: declare the known-code table and its labeler.
//! - [`assert_unique_owner!`]: compile-time proof that handle types cannot be
//!   duplicated.
//!
//! # Call-Site Capture
//!
//! `file!()`, `line!()` and `column!()` inside a `macro_rules!` body expand to
//! the location of the outermost invocation, so every macro here records the
//! line of the code that used it, never a line inside this file. The function
//! form of the bridge ([`check`](crate::check)) gets the same guarantee from
//! `#[track_caller]`.

/// Run the Failure Bridge on a status expression.
///
/// Evaluates to `Result<(), Diagnostic>`. Success codes (including `S_FALSE`)
/// yield `Ok(())` without constructing anything; failure codes yield a
/// [`Diagnostic`](crate::Diagnostic) carrying the invocation's file, line and
/// column. Accepts anything convertible into [`StatusCode`](crate::StatusCode).
///
/// # Example
///
/// ```rust
/// use dx_status::{check_status, definitions, Result};
///
/// fn allocate(native_status: i32) -> Result<()> {
///     check_status!(native_status)?;
///     Ok(())
/// }
///
/// assert!(allocate(0).is_ok());
/// let err = allocate(definitions::E_OUTOFMEMORY.value()).unwrap_err();
/// assert_eq!(err.code(), definitions::E_OUTOFMEMORY);
/// assert!(err.file().ends_with(".rs"));
/// ```
#[macro_export]
macro_rules! check_status {
    ($status:expr $(,)?) => {{
        let code: $crate::StatusCode = ::core::convert::Into::into($status);
        if code.is_failure() {
            ::core::result::Result::Err($crate::Diagnostic::new(
                code,
                file!(),
                line!(),
                column!(),
            ))
        } else {
            ::core::result::Result::Ok(())
        }
    }};
}

/// Compose a contextual message prefixed with the invocation's `file:line`.
///
/// Produces `"{file}:{line} throw message - {text}"`, where `text` is either a
/// literal or a `format!`-style template with arguments.
///
/// ```rust
/// use dx_status::located_msg;
///
/// let msg = located_msg!("buffer of {} bytes exceeds heap", 4096);
/// assert!(msg.contains(".rs:"));
/// assert!(msg.ends_with(" throw message - buffer of 4096 bytes exceeds heap"));
/// ```
#[macro_export]
macro_rules! located_msg {
    ($text:literal $(,)?) => {
        ::std::format!(
            "{}:{} throw message - {}",
            file!(),
            line!(),
            ::std::format_args!($text)
        )
    };
    ($fmt:literal, $($arg:tt)+) => {
        ::std::format!(
            "{}:{} throw message - {}",
            file!(),
            line!(),
            ::std::format_args!($fmt, $($arg)+)
        )
    };
}

/// Declare the known status codes and generate their labeler.
///
/// For every `NAME = bits` entry this emits `pub const NAME: StatusCode`, and
/// once for the whole table it emits:
///
/// - `pub const fn label(StatusCode) -> &'static str` returning `"NAME"` for
///   known codes and [`UNKNOWN_LABEL`](crate::definitions::UNKNOWN_LABEL)
///   otherwise,
/// - `pub const fn is_known(StatusCode) -> bool`,
/// - `pub const KNOWN_STATUS_CODES: &[StatusCode]` in declaration order.
///
/// The default arm keeps the labeler total.
#[macro_export]
macro_rules! define_status_codes {
    ($( $(#[$meta:meta])* $name:ident = $bits:literal ),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub const $name: $crate::StatusCode = $crate::StatusCode::from_bits($bits);
        )+

        /// Every known status code, in table order.
        pub const KNOWN_STATUS_CODES: &[$crate::StatusCode] = &[$($name),+];

        /// Label for `code`, or the sentinel when it is not in the table.
        #[inline]
        pub const fn label(code: $crate::StatusCode) -> &'static str {
            match code.bits() {
                $( $bits => stringify!($name), )+
                _ => $crate::definitions::UNKNOWN_LABEL,
            }
        }

        /// Whether `code` has an entry in the table.
        #[inline]
        pub const fn is_known(code: $crate::StatusCode) -> bool {
            matches!(code.bits(), $( $bits )|+)
        }
    };
}

/// Assert at compile time that none of the listed types implement `Clone`.
///
/// `Copy` requires `Clone`, so this also rules out implicit copies. Used on
/// every type that owns a native handle.
///
/// ```rust
/// use dx_status::assert_unique_owner;
///
/// struct Owner(u64);
/// assert_unique_owner!(Owner);
/// ```
///
/// ```rust,compile_fail
/// use dx_status::assert_unique_owner;
///
/// #[derive(Clone)]
/// struct Shared(u64);
/// assert_unique_owner!(Shared);
/// ```
#[macro_export]
macro_rules! assert_unique_owner {
    ($($ty:ty),+ $(,)?) => {
        $(
            const _: fn() = || {
                trait AmbiguousIfClone<A> {
                    fn some_item() {}
                }
                impl<T: ?Sized> AmbiguousIfClone<()> for T {}
                #[allow(dead_code)]
                struct Invalid;
                impl<T: ?Sized + ::core::clone::Clone> AmbiguousIfClone<Invalid> for T {}
                let _ = <$ty as AmbiguousIfClone<_>>::some_item;
            };
        )+
    };
}
