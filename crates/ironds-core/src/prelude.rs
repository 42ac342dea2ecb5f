//! Common module for library exports

pub use crate::accessor::{CpuStateAccessor, TransferPolicy};
pub use crate::error::{IrondsError, IrondsResult, PlatformError};
pub use crate::names::{errno_name, ptrace_request_name, signal_code_name, signal_name};
#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub use crate::platform::linux::*;
pub use crate::state::{TraceState, TraceStateTable};
pub use crate::trace::{BankKind, EntityResolver, TraceHandle, TracePrimitive};
pub use crate::types::{Architecture, CpuState, EntityId, ProcessId, ThreadId};
