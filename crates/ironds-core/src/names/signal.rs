//! Signal and signal sub-code names.
//!
//! Signal numbers come from `libc` so the table always agrees with the host.
//! The `si_code` values are fixed by the Linux ABI and are the same on every
//! architecture, so they are spelled out here.

use std::borrow::Cow;

use super::name_or_fallback;

/// `si_code` values for `SIGILL`.
pub mod ill
{
    pub const ILL_ILLOPC: i32 = 1;
    pub const ILL_ILLOPN: i32 = 2;
    pub const ILL_ILLADR: i32 = 3;
    pub const ILL_ILLTRP: i32 = 4;
    pub const ILL_PRVOPC: i32 = 5;
    pub const ILL_PRVREG: i32 = 6;
    pub const ILL_COPROC: i32 = 7;
    pub const ILL_BADSTK: i32 = 8;
}

/// `si_code` values for `SIGFPE`.
pub mod fpe
{
    pub const FPE_INTDIV: i32 = 1;
    pub const FPE_INTOVF: i32 = 2;
    pub const FPE_FLTDIV: i32 = 3;
    pub const FPE_FLTOVF: i32 = 4;
    pub const FPE_FLTUND: i32 = 5;
    pub const FPE_FLTRES: i32 = 6;
    pub const FPE_FLTINV: i32 = 7;
    pub const FPE_FLTSUB: i32 = 8;
}

/// `si_code` values for `SIGSEGV`.
pub mod segv
{
    pub const SEGV_MAPERR: i32 = 1;
    pub const SEGV_ACCERR: i32 = 2;
}

/// `si_code` values for `SIGBUS`.
pub mod bus
{
    pub const BUS_ADRALN: i32 = 1;
    pub const BUS_ADRERR: i32 = 2;
    pub const BUS_OBJERR: i32 = 3;
}

/// `si_code` values for `SIGTRAP`.
pub mod trap
{
    pub const TRAP_BRKPT: i32 = 1;
    pub const TRAP_TRACE: i32 = 2;
    pub const TRAP_BRANCH: i32 = 3;
    pub const TRAP_HWBKPT: i32 = 4;
}

/// Name of a signal number, or `None` if the host doesn't define it.
pub fn lookup_signal(signal: i32) -> Option<&'static str>
{
    // SIGRTMIN is a libc call rather than a constant, so it can't be a match arm.
    #[cfg(target_os = "linux")]
    {
        if signal == libc::SIGRTMIN() {
            return Some("SIGRTMIN");
        }
    }

    let name = match signal {
        libc::SIGABRT => "SIGABRT",
        libc::SIGALRM => "SIGALRM",
        libc::SIGBUS => "SIGBUS",
        libc::SIGCHLD => "SIGCHLD",
        libc::SIGCONT => "SIGCONT",
        libc::SIGFPE => "SIGFPE",
        libc::SIGHUP => "SIGHUP",
        libc::SIGILL => "SIGILL",
        libc::SIGINT => "SIGINT",
        libc::SIGIO => "SIGIO",
        libc::SIGKILL => "SIGKILL",
        libc::SIGPIPE => "SIGPIPE",
        libc::SIGPROF => "SIGPROF",
        libc::SIGQUIT => "SIGQUIT",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGSTOP => "SIGSTOP",
        libc::SIGSYS => "SIGSYS",
        libc::SIGTERM => "SIGTERM",
        libc::SIGTRAP => "SIGTRAP",
        libc::SIGTSTP => "SIGTSTP",
        libc::SIGTTIN => "SIGTTIN",
        libc::SIGTTOU => "SIGTTOU",
        libc::SIGURG => "SIGURG",
        libc::SIGUSR1 => "SIGUSR1",
        libc::SIGUSR2 => "SIGUSR2",
        libc::SIGVTALRM => "SIGVTALRM",
        libc::SIGWINCH => "SIGWINCH",
        libc::SIGXCPU => "SIGXCPU",
        libc::SIGXFSZ => "SIGXFSZ",
        #[cfg(target_os = "linux")]
        libc::SIGPWR => "SIGPWR",
        #[cfg(target_os = "linux")]
        libc::SIGSTKFLT => "SIGSTKFLT",
        _ => return None,
    };

    Some(name)
}

/// Name of a signal number.
///
/// Unknown numbers yield `"unknown signal <n>"`.
pub fn signal_name(signal: i32) -> Cow<'static, str>
{
    name_or_fallback(lookup_signal(signal), "unknown signal", signal)
}

/// Result of looking up a `si_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalCodeLookup
{
    /// The code has a name for this signal.
    Known(&'static str),
    /// The signal has sub-codes, but not this one.
    UnknownCode,
    /// The signal defines no sub-codes at all.
    NoCodes,
}

/// Look up the name of `code` as a sub-code of `signal`.
///
/// The same numeric code means different things for different signals
/// (`1` is `ILL_ILLOPC` under `SIGILL` and `SEGV_MAPERR` under `SIGSEGV`).
pub fn lookup_signal_code(signal: i32, code: i32) -> SignalCodeLookup
{
    let name = match signal {
        libc::SIGILL => match code {
            ill::ILL_ILLOPC => Some("ILL_ILLOPC"),
            ill::ILL_ILLOPN => Some("ILL_ILLOPN"),
            ill::ILL_ILLADR => Some("ILL_ILLADR"),
            ill::ILL_ILLTRP => Some("ILL_ILLTRP"),
            ill::ILL_PRVOPC => Some("ILL_PRVOPC"),
            ill::ILL_PRVREG => Some("ILL_PRVREG"),
            ill::ILL_COPROC => Some("ILL_COPROC"),
            ill::ILL_BADSTK => Some("ILL_BADSTK"),
            _ => None,
        },
        libc::SIGFPE => match code {
            fpe::FPE_INTDIV => Some("FPE_INTDIV"),
            fpe::FPE_INTOVF => Some("FPE_INTOVF"),
            fpe::FPE_FLTDIV => Some("FPE_FLTDIV"),
            fpe::FPE_FLTOVF => Some("FPE_FLTOVF"),
            fpe::FPE_FLTUND => Some("FPE_FLTUND"),
            fpe::FPE_FLTRES => Some("FPE_FLTRES"),
            fpe::FPE_FLTINV => Some("FPE_FLTINV"),
            fpe::FPE_FLTSUB => Some("FPE_FLTSUB"),
            _ => None,
        },
        libc::SIGSEGV => match code {
            segv::SEGV_MAPERR => Some("SEGV_MAPERR"),
            segv::SEGV_ACCERR => Some("SEGV_ACCERR"),
            _ => None,
        },
        libc::SIGBUS => match code {
            bus::BUS_ADRALN => Some("BUS_ADRALN"),
            bus::BUS_ADRERR => Some("BUS_ADRERR"),
            bus::BUS_OBJERR => Some("BUS_OBJERR"),
            _ => None,
        },
        libc::SIGTRAP => match code {
            trap::TRAP_BRKPT => Some("TRAP_BRKPT"),
            trap::TRAP_TRACE => Some("TRAP_TRACE"),
            trap::TRAP_BRANCH => Some("TRAP_BRANCH"),
            trap::TRAP_HWBKPT => Some("TRAP_HWBKPT"),
            _ => None,
        },
        _ => return SignalCodeLookup::NoCodes,
    };

    match name {
        Some(name) => SignalCodeLookup::Known(name),
        None => SignalCodeLookup::UnknownCode,
    }
}

/// Name of a signal sub-code.
///
/// - Known pair: the `si_code` name, e.g. `"ILL_ILLOPC"`.
/// - Known signal, unknown code: `"unknown code <code>"`.
/// - Signal without sub-codes: `"unknown signal <signal>"`.
pub fn signal_code_name(signal: i32, code: i32) -> Cow<'static, str>
{
    match lookup_signal_code(signal, code) {
        SignalCodeLookup::Known(name) => Cow::Borrowed(name),
        SignalCodeLookup::UnknownCode => name_or_fallback(None, "unknown code", code),
        SignalCodeLookup::NoCodes => name_or_fallback(None, "unknown signal", signal),
    }
}
