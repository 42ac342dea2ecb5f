//! # Types
//!
//! Identifiers and the architecture-neutral CPU state shared by every layer of
//! the server.

pub mod process;
pub mod registers;

pub use process::{Architecture, EntityId, ProcessId, ThreadId};
pub use registers::{CpuState, GeneralRegisters, SseState, VectorRegister, X87Register, X87State};
