//! Register bank transfer over `ptrace(2)`.

use std::ptr;

use libc::{c_void, pid_t};

use crate::codec;
use crate::error::PlatformError;
use crate::names::request::{PTRACE_GETFPREGS, PTRACE_GETREGS, PTRACE_SETFPREGS, PTRACE_SETREGS};
#[cfg(target_arch = "x86")]
use crate::names::request::{PTRACE_GETFPXREGS, PTRACE_SETFPXREGS};
use crate::trace::{BankKind, TraceHandle, TracePrimitive};
use crate::types::Architecture;

#[cfg(target_arch = "x86_64")]
const NATIVE: Architecture = Architecture::X86_64;
#[cfg(target_arch = "x86")]
const NATIVE: Architecture = Architecture::X86;

/// Legacy FSAVE requests. On x86-64 the kernel only exposes FXSAVE.
#[cfg(target_arch = "x86")]
const LEGACY_REQUESTS: Option<(i32, i32)> = Some((PTRACE_GETFPREGS, PTRACE_SETFPREGS));
#[cfg(target_arch = "x86_64")]
const LEGACY_REQUESTS: Option<(i32, i32)> = None;

#[cfg(target_arch = "x86")]
const EXTENDED_REQUESTS: (i32, i32) = (PTRACE_GETFPXREGS, PTRACE_SETFPXREGS);
#[cfg(target_arch = "x86_64")]
const EXTENDED_REQUESTS: (i32, i32) = (PTRACE_GETFPREGS, PTRACE_SETFPREGS);

/// `(get, set)` request pair for a bank on this host.
const fn requests(bank: BankKind) -> Option<(i32, i32)>
{
    match bank {
        BankKind::GeneralPurpose => Some((PTRACE_GETREGS, PTRACE_SETREGS)),
        BankKind::LegacyFloatingPoint => LEGACY_REQUESTS,
        BankKind::ExtendedFloatingPoint => Some(EXTENDED_REQUESTS),
    }
}

/// [`TracePrimitive`] backed by `ptrace(2)`
///
/// Stateless; buffers are sized from the register codec's table for the
/// host architecture, so they always match the structure the kernel copies.
#[derive(Debug, Default, Clone, Copy)]
pub struct PtraceTracer;

impl PtraceTracer
{
    pub const fn new() -> Self
    {
        Self
    }

    /// Architecture of the threads this tracer can talk to.
    pub const fn architecture(&self) -> Architecture
    {
        NATIVE
    }
}

fn plan(bank: BankKind) -> Result<(i32, i32, usize), PlatformError>
{
    let unsupported = PlatformError::from_errno(libc::EIO);
    let (get, set) = requests(bank).ok_or(unsupported)?;
    let size = codec::bank_size(NATIVE, bank).ok_or(unsupported)?;
    Ok((get, set, size))
}

impl TracePrimitive for PtraceTracer
{
    #[allow(unsafe_code)]
    fn get_register_bank(&mut self, handle: TraceHandle, bank: BankKind) -> Result<Vec<u8>, PlatformError>
    {
        let (request, _, size) = plan(bank)?;
        let mut buffer = vec![0u8; size];

        // SAFETY: `buffer` is exactly the size of the structure `request`
        // copies out for this architecture.
        let result = unsafe {
            libc::ptrace(
                request as _,
                handle.raw() as pid_t,
                ptr::null_mut::<c_void>(),
                buffer.as_mut_ptr().cast::<c_void>(),
            )
        };
        if result == -1 {
            return Err(PlatformError::last_os_error());
        }

        Ok(buffer)
    }

    #[allow(unsafe_code)]
    fn set_register_bank(&mut self, handle: TraceHandle, bank: BankKind, bytes: &[u8]) -> Result<(), PlatformError>
    {
        let (_, request, size) = plan(bank)?;
        if bytes.len() != size {
            return Err(PlatformError::from_errno(libc::EINVAL));
        }

        // SAFETY: the kernel reads `size` bytes, and `bytes` has exactly that
        // many. The SET requests never write through the pointer.
        let result = unsafe {
            libc::ptrace(
                request as _,
                handle.raw() as pid_t,
                ptr::null_mut::<c_void>(),
                bytes.as_ptr().cast_mut().cast::<c_void>(),
            )
        };
        if result == -1 {
            return Err(PlatformError::last_os_error());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_every_codec_bank_has_requests()
    {
        for bank in [
            BankKind::GeneralPurpose,
            BankKind::LegacyFloatingPoint,
            BankKind::ExtendedFloatingPoint,
        ] {
            assert_eq!(
                requests(bank).is_some(),
                codec::bank_size(NATIVE, bank).is_some(),
                "{bank}"
            );
        }
    }

    #[test]
    fn test_wrong_size_write_is_rejected_before_syscall()
    {
        let mut tracer = PtraceTracer::new();
        let err = tracer
            .set_register_bank(TraceHandle(1), BankKind::GeneralPurpose, &[0u8; 3])
            .unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_legacy_bank_is_eio_on_x86_64()
    {
        let mut tracer = PtraceTracer::new();
        let err = tracer
            .get_register_bank(TraceHandle(1), BankKind::LegacyFloatingPoint)
            .unwrap_err();
        assert_eq!(err.errno(), libc::EIO);
    }

    #[test]
    fn test_untraced_thread_is_refused()
    {
        // We are not tracing ourselves, so the kernel answers ESRCH.
        let mut tracer = PtraceTracer::new();
        let me = TraceHandle(std::process::id() as i32);
        assert!(tracer.get_register_bank(me, BankKind::GeneralPurpose).is_err());
    }
}
