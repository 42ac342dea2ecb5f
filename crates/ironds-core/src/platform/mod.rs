//! # Platform-Specific Implementations
//!
//! Operating-system backends for the [`TracePrimitive`](crate::trace::TracePrimitive)
//! and [`EntityResolver`](crate::trace::EntityResolver) seams.
//!
//! - **Linux (x86, x86-64)**: `ptrace(2)` register requests and `/proc`
//!   thread lookup
//!   - See: [ptrace(2) man page](https://man7.org/linux/man-pages/man2/ptrace.2.html)
//!
//! Everything outside this module is portable. On other targets the crate
//! still builds (the symbolic tables and the codec are useful on their own),
//! it just has no live backend.

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub mod linux;
