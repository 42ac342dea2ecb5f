//! # Linux Backend
//!
//! - [`PtraceTracer`]: moves register banks with `PTRACE_GETREGS` and friends
//! - [`ProcfsResolver`]: maps entities to TIDs through `/proc/<pid>/task`
//! - [`AttachGuard`]: `PTRACE_ATTACH` on one thread for the lifetime of a value
//!
//! The tracer only works on threads the calling thread has attached to and
//! that are currently in a ptrace stop. Establishing that is the job of the
//! caller; [`AttachGuard`] covers the simple one-thread-at-a-time case.

mod attach;
mod ptrace;
mod resolver;

pub use attach::AttachGuard;
pub use ptrace::PtraceTracer;
pub use resolver::ProcfsResolver;
