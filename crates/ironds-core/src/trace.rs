//! # Tracing Primitive Interface
//!
//! The seam between the register transfer logic and the operating system.
//!
//! The accessor never calls `ptrace(2)` directly. It talks to a
//! [`TracePrimitive`] that moves raw register banks in and out of a stopped
//! thread, and to an [`EntityResolver`] that turns an [`EntityId`] into the
//! kernel handle those requests target. The Linux implementations live in
//! [`crate::platform::linux`]; tests plug in scripted ones.
//!
//! ## Why traits?
//!
//! - The degradation rules (which bank failures are fatal and which are not)
//!   can be tested without a kernel
//! - The codec and accessor stay portable; only the backend is `cfg`-gated

use std::fmt;

use crate::error::{IrondsResult, PlatformError};
use crate::types::EntityId;

/// Which register bank a request moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind
{
    /// Integer and control registers (`user_regs_struct`).
    GeneralPurpose,
    /// x87-only floating-point state in FSAVE layout (`user_fpregs_struct` on i386).
    LegacyFloatingPoint,
    /// x87 + SSE state in FXSAVE layout (`user_fpxregs_struct` on i386,
    /// `user_fpregs_struct` on x86-64).
    ExtendedFloatingPoint,
}

impl fmt::Display for BankKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            BankKind::GeneralPurpose => write!(f, "general-purpose"),
            BankKind::LegacyFloatingPoint => write!(f, "legacy floating-point"),
            BankKind::ExtendedFloatingPoint => write!(f, "extended floating-point"),
        }
    }
}

/// Kernel-level handle for a traced thread
///
/// On Linux this is the TID passed as the `pid` argument of `ptrace(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceHandle(pub i32);

impl TraceHandle
{
    /// The raw kernel id.
    pub const fn raw(self) -> i32
    {
        self.0
    }
}

/// Moves raw register banks to and from a stopped thread
///
/// Buffers are the exact bytes of the kernel structure for the bank, in
/// native (little-endian) order. Implementations must not interpret them.
///
/// Both calls block until the kernel answers. The thread is expected to be
/// stopped and traced by the calling thread.
pub trait TracePrimitive
{
    /// Fetch one register bank.
    ///
    /// ## Errors
    ///
    /// The errno reported by the kernel, or `EIO` when the bank doesn't exist
    /// on this architecture.
    fn get_register_bank(&mut self, handle: TraceHandle, bank: BankKind) -> Result<Vec<u8>, PlatformError>;

    /// Store one register bank.
    ///
    /// ## Errors
    ///
    /// The errno reported by the kernel, or `EIO` when the bank doesn't exist
    /// on this architecture.
    fn set_register_bank(&mut self, handle: TraceHandle, bank: BankKind, bytes: &[u8]) -> Result<(), PlatformError>;
}

/// Maps an entity to the kernel handle of a live thread.
pub trait EntityResolver
{
    /// Resolve `entity`.
    ///
    /// ## Errors
    ///
    /// `IrondsError::EntityNotFound` when the entity is unknown or has exited.
    fn resolve(&self, entity: EntityId) -> IrondsResult<TraceHandle>;
}

impl<T: TracePrimitive + ?Sized> TracePrimitive for &mut T
{
    fn get_register_bank(&mut self, handle: TraceHandle, bank: BankKind) -> Result<Vec<u8>, PlatformError>
    {
        (**self).get_register_bank(handle, bank)
    }

    fn set_register_bank(&mut self, handle: TraceHandle, bank: BankKind, bytes: &[u8]) -> Result<(), PlatformError>
    {
        (**self).set_register_bank(handle, bank, bytes)
    }
}

impl<R: EntityResolver + ?Sized> EntityResolver for &R
{
    fn resolve(&self, entity: EntityId) -> IrondsResult<TraceHandle>
    {
        (**self).resolve(entity)
    }
}
