//! Process, thread, and traced-entity identifiers.

use std::fmt;

/// Process identifier (PID)
///
/// A newtype over the kernel's PID so it can't be confused with a thread id,
/// a signal number, or any other integer flowing through the server.
///
/// ## Example
///
/// ```rust
/// use ironds_core::types::ProcessId;
///
/// let pid = ProcessId::from(12345);
/// assert_eq!(pid.0, 12345);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Thread identifier
///
/// On Linux this is the kernel TID, which is also what `ptrace(2)` operates on.
/// The main thread of a process has `tid == pid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u32);

impl ThreadId
{
    /// Get the raw kernel thread id.
    pub const fn raw(self) -> u32
    {
        self.0
    }
}

impl From<u32> for ThreadId
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

/// A traced entity: a whole process, or one thread inside it.
///
/// Register state always belongs to a thread. When `tid` is `None` the entity
/// designates the process' main thread, whose TID equals the PID.
///
/// ## Example
///
/// ```rust
/// use ironds_core::types::{EntityId, ProcessId, ThreadId};
///
/// let process = EntityId::process(ProcessId(100));
/// let thread = EntityId::thread(ProcessId(100), ThreadId(104));
///
/// assert_eq!(process.target_tid(), 100);
/// assert_eq!(thread.target_tid(), 104);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId
{
    /// Owning process.
    pub pid: ProcessId,
    /// Specific thread, if one was named.
    pub tid: Option<ThreadId>,
}

impl EntityId
{
    /// Entity naming a process (its main thread).
    pub const fn process(pid: ProcessId) -> Self
    {
        Self { pid, tid: None }
    }

    /// Entity naming one thread of a process.
    pub const fn thread(pid: ProcessId, tid: ThreadId) -> Self
    {
        Self { pid, tid: Some(tid) }
    }

    /// The kernel id that trace requests must target.
    ///
    /// A valid thread id wins; otherwise the process id is used, since the
    /// main thread shares it.
    pub const fn target_tid(self) -> u32
    {
        match self.tid {
            Some(ThreadId(tid)) if tid != 0 => tid,
            _ => self.pid.0,
        }
    }

    /// The one spelling of this entity used as a bookkeeping key.
    ///
    /// `process(p)`, `thread(p, 0)` and `thread(p, p)` all name the main
    /// thread and collapse to `process(p)`; any other thread is kept as is.
    ///
    /// ```rust
    /// use ironds_core::types::{EntityId, ProcessId, ThreadId};
    ///
    /// let main = EntityId::process(ProcessId(7));
    /// assert_eq!(EntityId::thread(ProcessId(7), ThreadId(7)).canonical(), main);
    /// assert_eq!(EntityId::thread(ProcessId(7), ThreadId(0)).canonical(), main);
    /// assert_ne!(EntityId::thread(ProcessId(7), ThreadId(8)).canonical(), main);
    /// ```
    #[must_use]
    pub const fn canonical(self) -> Self
    {
        if self.target_tid() == self.pid.0 {
            Self::process(self.pid)
        } else {
            self
        }
    }
}

impl From<ProcessId> for EntityId
{
    fn from(pid: ProcessId) -> Self
    {
        Self::process(pid)
    }
}

impl fmt::Display for EntityId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.tid {
            Some(tid) => write!(f, "{}.{}", self.pid.0, tid.0),
            None => write!(f, "{}", self.pid.0),
        }
    }
}

/// CPU architecture of a traced entity
///
/// Only the x86 family is handled by the register codec: 32-bit `X86` (i386)
/// and `X86_64`. The two differ in word size and in which kernel structures
/// exist for the floating-point banks.
///
/// ## Example
///
/// ```rust
/// use ironds_core::types::Architecture;
///
/// assert_eq!(Architecture::X86.word_size_bytes(), 4);
/// assert_eq!(Architecture::X86_64.to_string(), "x86_64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture
{
    /// 32-bit x86 (i386). The kernel exposes three register structures:
    /// general-purpose, legacy FSAVE-style floating point, and FXSAVE.
    X86,
    /// 64-bit x86. Floating-point state is only exposed in FXSAVE form.
    X86_64,
}

impl Architecture
{
    /// Architecture of the running server binary, if the codec supports it.
    ///
    /// Returns `None` on anything outside the x86 family.
    pub const fn current() -> Option<Self>
    {
        #[cfg(target_arch = "x86_64")]
        {
            Some(Architecture::X86_64)
        }

        #[cfg(target_arch = "x86")]
        {
            Some(Architecture::X86)
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
        {
            None
        }
    }

    /// Width of a general-purpose register in the kernel structures.
    #[must_use]
    pub const fn word_size_bytes(self) -> u8
    {
        match self {
            Architecture::X86 => 4,
            Architecture::X86_64 => 8,
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
        }
    }
}
