//! ptrace request names.
//!
//! The request numbers are part of the Linux ABI. Some exist only on certain
//! architectures (`PTRACE_GETREGS` is an x86 thing, `PTRACE_GETVFPREGS` an
//! ARM thing), so those entries are compiled in only where the kernel
//! defines them. The numbers come from `libc`; the ptrace backend issues
//! register requests with these same constants.

use std::borrow::Cow;

use super::name_or_fallback;

/// Re-export `libc` request numbers as `i32`; glibc types them `c_uint`,
/// musl `c_int`.
macro_rules! libc_requests {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[cfg(target_os = "linux")]
            #[allow(clippy::cast_possible_wrap, clippy::unnecessary_cast)]
            pub const $name: i32 = libc::$name as i32;
        )*
    };
}

libc_requests! {
    PTRACE_TRACEME,
    PTRACE_PEEKTEXT,
    PTRACE_PEEKDATA,
    PTRACE_PEEKUSER,
    PTRACE_POKETEXT,
    PTRACE_POKEDATA,
    PTRACE_POKEUSER,
    PTRACE_CONT,
    PTRACE_KILL,
    PTRACE_SINGLESTEP,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PTRACE_GETREGS,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PTRACE_SETREGS,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PTRACE_GETFPREGS,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    PTRACE_SETFPREGS,
    PTRACE_ATTACH,
    PTRACE_DETACH,
    #[cfg(target_arch = "x86")]
    PTRACE_GETFPXREGS,
    #[cfg(target_arch = "x86")]
    PTRACE_SETFPXREGS,
    PTRACE_SYSCALL,
    PTRACE_SETOPTIONS,
    PTRACE_GETEVENTMSG,
    PTRACE_GETSIGINFO,
    PTRACE_SETSIGINFO,
    PTRACE_GETREGSET,
    PTRACE_SETREGSET,
    PTRACE_SEIZE,
    PTRACE_INTERRUPT,
    PTRACE_LISTEN,
}

// libc has no constants for the ARM-only requests.
#[cfg(all(target_os = "linux", target_arch = "arm"))]
pub const PTRACE_GETVFPREGS: i32 = 27;
#[cfg(all(target_os = "linux", target_arch = "arm"))]
pub const PTRACE_SETVFPREGS: i32 = 28;
#[cfg(all(target_os = "linux", target_arch = "arm"))]
pub const PTRACE_GETHBPREGS: i32 = 29;
#[cfg(all(target_os = "linux", target_arch = "arm"))]
pub const PTRACE_SETHBPREGS: i32 = 30;

/// Name of a ptrace request, or `None` if this host has no such request.
pub fn lookup_ptrace_request(code: i32) -> Option<&'static str>
{
    #[cfg(target_os = "linux")]
    {
        let name = match code {
            PTRACE_ATTACH => "PTRACE_ATTACH",
            PTRACE_CONT => "PTRACE_CONT",
            PTRACE_DETACH => "PTRACE_DETACH",
            PTRACE_GETEVENTMSG => "PTRACE_GETEVENTMSG",
            #[cfg(target_arch = "arm")]
            PTRACE_GETHBPREGS => "PTRACE_GETHBPREGS",
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            PTRACE_GETREGS => "PTRACE_GETREGS",
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            PTRACE_GETFPREGS => "PTRACE_GETFPREGS",
            #[cfg(target_arch = "x86")]
            PTRACE_GETFPXREGS => "PTRACE_GETFPXREGS",
            PTRACE_GETREGSET => "PTRACE_GETREGSET",
            PTRACE_GETSIGINFO => "PTRACE_GETSIGINFO",
            #[cfg(target_arch = "arm")]
            PTRACE_GETVFPREGS => "PTRACE_GETVFPREGS",
            PTRACE_INTERRUPT => "PTRACE_INTERRUPT",
            PTRACE_KILL => "PTRACE_KILL",
            PTRACE_LISTEN => "PTRACE_LISTEN",
            PTRACE_PEEKDATA => "PTRACE_PEEKDATA",
            PTRACE_PEEKTEXT => "PTRACE_PEEKTEXT",
            PTRACE_PEEKUSER => "PTRACE_PEEKUSER",
            PTRACE_POKEDATA => "PTRACE_POKEDATA",
            PTRACE_POKETEXT => "PTRACE_POKETEXT",
            PTRACE_POKEUSER => "PTRACE_POKEUSER",
            PTRACE_SEIZE => "PTRACE_SEIZE",
            #[cfg(target_arch = "arm")]
            PTRACE_SETHBPREGS => "PTRACE_SETHBPREGS",
            PTRACE_SETOPTIONS => "PTRACE_SETOPTIONS",
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            PTRACE_SETREGS => "PTRACE_SETREGS",
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            PTRACE_SETFPREGS => "PTRACE_SETFPREGS",
            #[cfg(target_arch = "x86")]
            PTRACE_SETFPXREGS => "PTRACE_SETFPXREGS",
            PTRACE_SETREGSET => "PTRACE_SETREGSET",
            PTRACE_SETSIGINFO => "PTRACE_SETSIGINFO",
            #[cfg(target_arch = "arm")]
            PTRACE_SETVFPREGS => "PTRACE_SETVFPREGS",
            PTRACE_SINGLESTEP => "PTRACE_SINGLESTEP",
            PTRACE_SYSCALL => "PTRACE_SYSCALL",
            PTRACE_TRACEME => "PTRACE_TRACEME",
            _ => return None,
        };

        Some(name)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = code;
        None
    }
}

/// Name of a ptrace request.
///
/// Requests the host doesn't define, including architecture-specific ones
/// built for another architecture, yield `"unknown ptrace command <n>"`.
pub fn ptrace_request_name(code: i32) -> Cow<'static, str>
{
    name_or_fallback(lookup_ptrace_request(code), "unknown ptrace command", code)
}
