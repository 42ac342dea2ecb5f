//! # Symbolic Names
//!
//! Maps numeric codes coming out of the kernel (signal numbers, `si_code`
//! values, errno values, ptrace requests) to the names a human or a GDB client
//! expects to see.
//!
//! Every function here is total: a code without a known name produces a
//! generated fallback such as `"unknown signal 9999"`. Known names are handed
//! out as `Cow::Borrowed` static strings, fallbacks as `Cow::Owned`.
//!
//! The `lookup_*` variants return `None` instead of a fallback, which is what
//! callers enumerating the tables want.
//!
//! ## Example
//!
//! ```rust
//! use ironds_core::names::{errno_name, signal_code_name, signal_name};
//!
//! assert_eq!(signal_name(libc::SIGSEGV), "SIGSEGV");
//! assert_eq!(signal_code_name(libc::SIGSEGV, 1), "SEGV_MAPERR");
//! assert_eq!(errno_name(libc::ESRCH), "ESRCH");
//! assert_eq!(errno_name(9999), "unknown error 9999");
//! ```

pub mod errno;
pub mod request;
pub mod signal;

use std::borrow::Cow;

pub use errno::{errno_name, lookup_errno};
pub use request::{lookup_ptrace_request, ptrace_request_name};
pub use signal::{lookup_signal, lookup_signal_code, signal_code_name, signal_name};

/// Turn a table hit into a name, or generate `"<what> <value>"`.
fn name_or_fallback(name: Option<&'static str>, what: &str, value: i32) -> Cow<'static, str>
{
    match name {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("{what} {value}")),
    }
}
