//! Architecture-neutral CPU state.
//!
//! [`CpuState`] is what the rest of the debug server sees: a flat set of
//! register banks for the x86 family, independent of which kernel structure
//! the values came from. Every bank is always present. A bank the kernel could
//! not provide is simply left zero-filled.

use super::Architecture;

/// Number of x87 stack registers (ST0-ST7).
pub const X87_REGISTER_COUNT: usize = 8;

/// Size of one neutral x87 slot. Only the first [`X87_SIGNIFICANT_BYTES`] carry data.
pub const X87_SLOT_SIZE: usize = 16;

/// Significant bytes of an 80-bit extended-precision value.
pub const X87_SIGNIFICANT_BYTES: usize = 10;

/// Number of neutral vector slots (XMM0-XMM15).
pub const SSE_REGISTER_COUNT: usize = 16;

/// Size of a vector slot.
pub const SSE_SLOT_SIZE: usize = 16;

/// General-purpose register bank
///
/// Fields use the x86-64 names. For a 32-bit entity the `e*` registers live in
/// the low half of the matching `r*` field (`eax` in `rax`, `eip` in `rip`, and
/// so on); `r8`-`r15`, `fs_base` and `gs_base` have no i386 counterpart and
/// stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneralRegisters
{
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rsp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    /// Instruction pointer.
    pub rip: u64,
    /// RFLAGS / EFLAGS.
    pub rflags: u64,
    pub cs: u64,
    pub ss: u64,
    pub ds: u64,
    pub es: u64,
    pub fs: u64,
    pub gs: u64,
    pub fs_base: u64,
    pub gs_base: u64,
    /// Syscall number at syscall entry (`orig_rax` / `orig_eax`).
    ///
    /// The kernel uses this on the way out of a syscall to decide whether to
    /// restart it, so writes must preserve whatever was read.
    pub orig_rax: u64,
}

/// One x87 stack register slot.
///
/// The slot is 16 bytes wide to match the FXSAVE layout; the 80-bit value
/// occupies the first 10 bytes and the rest is padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct X87Register
{
    pub bytes: [u8; X87_SLOT_SIZE],
}

impl X87Register
{
    /// The 10 bytes holding the extended-precision value.
    #[must_use]
    pub fn significant(&self) -> &[u8]
    {
        &self.bytes[..X87_SIGNIFICANT_BYTES]
    }
}

/// x87 floating-point bank
///
/// Field names follow the GDB remote protocol register names, which is where
/// this state ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct X87State
{
    /// FPU status word.
    pub fstw: u16,
    /// FPU control word.
    pub fctw: u16,
    /// FPU tag word.
    pub ftag: u16,
    /// Last instruction opcode.
    pub fop: u16,
    /// Last instruction code segment.
    pub fiseg: u32,
    /// Last instruction offset.
    pub fioff: u64,
    /// Last operand segment.
    pub foseg: u32,
    /// Last operand offset.
    pub fooff: u64,
    /// ST0-ST7.
    pub regs: [X87Register; X87_REGISTER_COUNT],
}

/// 128-bit SIMD register value.
///
/// Stored little-endian, which is the in-memory order the kernel uses for XMM
/// registers on x86.
///
/// ## Example
///
/// ```rust
/// use ironds_core::types::VectorRegister;
///
/// let xmm = VectorRegister::from_u128(0x1234);
/// assert_eq!(xmm.bytes()[0], 0x34);
/// assert_eq!(xmm.as_u128(), 0x1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VectorRegister
{
    bytes: [u8; SSE_SLOT_SIZE],
}

impl VectorRegister
{
    /// Create a vector register from raw little-endian bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SSE_SLOT_SIZE]) -> Self
    {
        Self { bytes }
    }

    /// Create a vector register from a 128-bit integer.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self
    {
        Self {
            bytes: value.to_le_bytes(),
        }
    }

    /// Raw bytes, least significant first.
    #[must_use]
    pub const fn bytes(&self) -> &[u8; SSE_SLOT_SIZE]
    {
        &self.bytes
    }

    /// Mutable access to the raw bytes.
    pub fn bytes_mut(&mut self) -> &mut [u8; SSE_SLOT_SIZE]
    {
        &mut self.bytes
    }

    /// The value as a 128-bit integer.
    #[must_use]
    pub const fn as_u128(&self) -> u128
    {
        u128::from_le_bytes(self.bytes)
    }
}

/// SSE bank: MXCSR pair plus XMM registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SseState
{
    /// MXCSR control/status register.
    pub mxcsr: u32,
    /// Mask of MXCSR bits supported by the CPU.
    pub mxcsrmask: u32,
    /// XMM0-XMM15. i386 structures only carry XMM0-XMM7.
    pub regs: [VectorRegister; SSE_REGISTER_COUNT],
}

/// Complete CPU state of one thread
///
/// Built zero-filled by [`CpuState::new`] and then populated bank by bank by
/// the register codec. Absence of a bank on the source side is never visible
/// here as a missing field, only as zeros.
///
/// ## Example
///
/// ```rust
/// use ironds_core::types::{Architecture, CpuState};
///
/// let mut state = CpuState::new(Architecture::X86_64);
/// state.set_pc(0x401000);
/// assert_eq!(state.pc(), 0x401000);
/// assert_eq!(state.x87.fctw, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState
{
    architecture: Architecture,
    /// General-purpose bank.
    pub gp: GeneralRegisters,
    /// x87 bank.
    pub x87: X87State,
    /// SSE bank.
    pub sse: SseState,
}

impl CpuState
{
    /// Zero-filled state for the given architecture.
    pub fn new(architecture: Architecture) -> Self
    {
        Self {
            architecture,
            gp: GeneralRegisters::default(),
            x87: X87State::default(),
            sse: SseState::default(),
        }
    }

    /// Architecture this state was built for.
    pub fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    /// Program counter.
    pub fn pc(&self) -> u64
    {
        self.gp.rip
    }

    /// Set the program counter.
    pub fn set_pc(&mut self, value: u64)
    {
        self.gp.rip = value;
    }

    /// Stack pointer.
    pub fn sp(&self) -> u64
    {
        self.gp.rsp
    }

    /// Set the stack pointer.
    pub fn set_sp(&mut self, value: u64)
    {
        self.gp.rsp = value;
    }

    /// Frame pointer.
    pub fn fp(&self) -> u64
    {
        self.gp.rbp
    }

    /// Flags register.
    pub fn flags(&self) -> u64
    {
        self.gp.rflags
    }
}
