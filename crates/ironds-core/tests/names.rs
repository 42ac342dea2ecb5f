//! Tests for the symbolic name tables

use std::borrow::Cow;

use ironds_core::names::signal::{bus, ill, segv, trap, SignalCodeLookup};
use ironds_core::names::{
    errno_name, lookup_errno, lookup_signal, lookup_signal_code, ptrace_request_name, signal_code_name, signal_name,
};

#[test]
fn test_known_signals()
{
    assert_eq!(signal_name(libc::SIGSEGV), "SIGSEGV");
    assert_eq!(signal_name(libc::SIGTRAP), "SIGTRAP");
    assert_eq!(signal_name(libc::SIGKILL), "SIGKILL");
    assert_eq!(signal_name(libc::SIGXFSZ), "SIGXFSZ");
}

#[test]
fn test_known_names_are_borrowed()
{
    assert!(matches!(signal_name(libc::SIGABRT), Cow::Borrowed(_)));
    assert!(matches!(errno_name(libc::EPERM), Cow::Borrowed(_)));
    assert!(matches!(signal_name(9999), Cow::Owned(_)));
}

#[test]
fn test_unknown_signal()
{
    assert_eq!(signal_name(9999), "unknown signal 9999");
    assert_eq!(signal_name(-1), "unknown signal -1");
    assert_eq!(lookup_signal(0), None);
}

#[cfg(target_os = "linux")]
#[test]
fn test_linux_only_signals()
{
    assert_eq!(signal_name(libc::SIGPWR), "SIGPWR");
    assert_eq!(signal_name(libc::SIGSTKFLT), "SIGSTKFLT");
    assert_eq!(signal_name(libc::SIGRTMIN()), "SIGRTMIN");
}

#[test]
fn test_signal_codes()
{
    assert_eq!(signal_code_name(libc::SIGILL, ill::ILL_ILLOPC), "ILL_ILLOPC");
    assert_eq!(signal_code_name(libc::SIGILL, ill::ILL_BADSTK), "ILL_BADSTK");
    assert_eq!(signal_code_name(libc::SIGBUS, bus::BUS_ADRERR), "BUS_ADRERR");
    assert_eq!(signal_code_name(libc::SIGSEGV, segv::SEGV_ACCERR), "SEGV_ACCERR");
    assert_eq!(signal_code_name(libc::SIGTRAP, trap::TRAP_HWBKPT), "TRAP_HWBKPT");
}

#[test]
fn test_same_code_differs_by_signal()
{
    assert_eq!(signal_code_name(libc::SIGILL, 1), "ILL_ILLOPC");
    assert_eq!(signal_code_name(libc::SIGSEGV, 1), "SEGV_MAPERR");
    assert_eq!(signal_code_name(libc::SIGBUS, 1), "BUS_ADRALN");
}

#[test]
fn test_unknown_code_for_known_signal()
{
    assert_eq!(signal_code_name(libc::SIGSEGV, 99), "unknown code 99");
    assert_eq!(lookup_signal_code(libc::SIGSEGV, 99), SignalCodeLookup::UnknownCode);
}

#[test]
fn test_signal_without_codes()
{
    assert_eq!(signal_code_name(libc::SIGKILL, 1), format!("unknown signal {}", libc::SIGKILL));
    assert_eq!(lookup_signal_code(libc::SIGKILL, 1), SignalCodeLookup::NoCodes);
}

#[test]
fn test_errno_names()
{
    assert_eq!(errno_name(libc::ESRCH), "ESRCH");
    assert_eq!(errno_name(libc::EIO), "EIO");
    assert_eq!(errno_name(libc::EACCES), "EACCES");
    assert_eq!(errno_name(9999), "unknown error 9999");
    assert_eq!(lookup_errno(0), None);
}

#[cfg(target_os = "linux")]
#[test]
fn test_linux_only_errnos()
{
    assert_eq!(errno_name(libc::EBADFD), "EBADFD");
    assert_eq!(errno_name(libc::ECOMM), "ECOMM");
}

#[test]
fn test_unknown_ptrace_request()
{
    assert_eq!(ptrace_request_name(-5), "unknown ptrace command -5");
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
#[test]
fn test_x86_register_requests()
{
    assert_eq!(ptrace_request_name(12), "PTRACE_GETREGS");
    assert_eq!(ptrace_request_name(13), "PTRACE_SETREGS");
    assert_eq!(ptrace_request_name(15), "PTRACE_SETFPREGS");
}
