//! # Error Types
//!
//! Errors surfaced by the register transfer layer.
//!
//! We use `thiserror` to derive `Error` and the display messages. Platform
//! failures arrive as a raw errno wrapped in [`PlatformError`] and are
//! translated into [`IrondsError`] at the point where they become fatal.

use thiserror::Error;

use crate::codec::CodecError;
use crate::names;
use crate::types::EntityId;

/// Raw failure reported by the tracing primitive
///
/// Holds the errno the kernel returned. Display renders the symbolic name so
/// log lines read `ESRCH (errno 3)` instead of a bare number.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{} (errno {})", describe_errno(.0), .0)]
pub struct PlatformError(pub i32);

impl PlatformError
{
    /// Wrap an errno value.
    pub const fn from_errno(errno: i32) -> Self
    {
        Self(errno)
    }

    /// Capture `errno` from the last failed libc call.
    pub fn last_os_error() -> Self
    {
        Self(std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO))
    }

    /// The errno value.
    pub const fn errno(self) -> i32
    {
        self.0
    }
}

#[cfg(target_os = "linux")]
impl From<nix::errno::Errno> for PlatformError
{
    fn from(errno: nix::errno::Errno) -> Self
    {
        Self(errno as i32)
    }
}

fn describe_errno(errno: &i32) -> std::borrow::Cow<'static, str>
{
    names::errno_name(*errno)
}

/// Main error type for register transfer operations
///
/// ## Error Categories
///
/// 1. **Resolution errors**: `EntityNotFound`
/// 2. **Primitive errors**: `Primitive`, `PermissionDenied`
/// 3. **Codec errors**: `Codec` (a mandatory bank had the wrong shape)
/// 4. **Caller errors**: `InvalidArgument`
/// 5. **I/O errors**: `Io`
///
/// Optional floating-point banks never produce an error; see
/// [`crate::accessor`] for the degradation rules.
#[derive(Error, Debug)]
pub enum IrondsError
{
    /// The entity doesn't map to a live thread
    ///
    /// This happens when:
    /// - The process or thread has exited
    /// - The identifier was never valid
    #[error("Traced entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The tracing primitive failed on a mandatory bank
    ///
    /// Common errno values:
    /// - `ESRCH`: the thread isn't traced by us or isn't stopped
    /// - `EIO`: the request isn't supported for this thread
    /// - `EFAULT`: the kernel couldn't copy the register buffer
    #[error("{operation} failed: {source}")]
    Primitive
    {
        /// What was being attempted, e.g. `"read general-purpose registers"`.
        operation: String,
        /// The errno reported by the kernel.
        source: PlatformError,
    },

    /// The kernel refused the trace request
    ///
    /// On Linux this is `EPERM`/`EACCES`: the caller isn't the tracer of
    /// record, YAMA `ptrace_scope` blocks it, or `CAP_SYS_PTRACE` is missing.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A register buffer didn't match the kernel structure it claims to be
    #[error("Register codec error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (procfs lookups, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IrondsError
{
    /// Translate a platform failure into the error taxonomy.
    ///
    /// ```rust
    /// use ironds_core::error::{IrondsError, PlatformError};
    ///
    /// let err = IrondsError::from_platform("read registers", PlatformError(libc::EPERM));
    /// assert!(matches!(err, IrondsError::PermissionDenied(_)));
    ///
    /// let err = IrondsError::from_platform("read registers", PlatformError(libc::ESRCH));
    /// assert!(err.to_string().contains("ESRCH"));
    /// ```
    pub fn from_platform(operation: impl Into<String>, error: PlatformError) -> Self
    {
        let operation = operation.into();
        match error.errno() {
            libc::EPERM | libc::EACCES => IrondsError::PermissionDenied(format!("{operation}: {error}")),
            _ => IrondsError::Primitive {
                operation,
                source: error,
            },
        }
    }
}

/// Convenience type alias for `Result<T, IrondsError>`
///
/// ```rust
/// use ironds_core::error::IrondsResult;
/// fn foo() -> IrondsResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type IrondsResult<T> = std::result::Result<T, IrondsError>;
