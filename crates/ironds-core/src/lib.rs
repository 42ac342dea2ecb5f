//! # ironds-core
//!
//! Process-control backend of the ironds debug server.
//!
//! This crate provides:
//! - Symbolic names for signals, `si_code` values, errno values and ptrace
//!   requests ([`names`])
//! - An architecture-neutral [`CpuState`] and a codec to and from the Linux
//!   x86 kernel register structures ([`codec`])
//! - Whole-state register read/write with graceful floating-point
//!   degradation ([`accessor`])
//! - Per-entity bookkeeping for the hardware breakpoint manager ([`state`])
//!
//! ## Platform Support
//!
//! - **Linux x86 / x86-64**: `ptrace(2)` backend in [`platform::linux`]
//! - Everything else: names and codec only, no live backend
//!
//! ## Why unsafe code is needed
//!
//! The Linux backend calls `ptrace(2)` and `waitpid(2)` through `libc`. Those
//! calls hand raw buffers to the kernel. The register buffers are always sized
//! from the codec's structure table, which is what keeps them sound.

#![allow(unsafe_code)] // Required for ptrace(2) and waitpid(2)

pub mod accessor;
pub mod codec;
pub mod error;
pub mod names;
pub mod platform;
pub mod prelude;
pub mod state;
pub mod trace;
pub mod types;

pub use accessor::{CpuStateAccessor, TransferPolicy};
pub use error::{IrondsError, IrondsResult, PlatformError};
pub use types::{Architecture, CpuState, EntityId, ProcessId, ThreadId};
