//! # Register Codec
//!
//! Conversion between [`CpuState`] and the register structures the Linux
//! kernel exchanges through `ptrace(2)` on x86.
//!
//! Each kernel structure is modelled explicitly, field by field, in its own
//! submodule:
//!
//! | Architecture | Bank | Kernel structure | Size |
//! |---|---|---|---|
//! | x86 | general-purpose | `user_regs_struct` | 68 |
//! | x86 | legacy FP | `user_fpregs_struct` (FSAVE) | 108 |
//! | x86 | extended FP | `user_fpxregs_struct` (FXSAVE) | 512 |
//! | x86-64 | general-purpose | `user_regs_struct` | 216 |
//! | x86-64 | extended FP | `user_fpregs_struct` (FXSAVE64) | 512 |
//!
//! x86-64 has no legacy bank; asking for one is [`CodecError::UnsupportedBank`].
//!
//! ## Lossy mappings
//!
//! Round-tripping through a kernel structure is not always the identity:
//!
//! - i386 fields are 32 bits wide. Decoding zero-extends, encoding keeps the
//!   low 32 bits of the neutral value.
//! - The legacy bank stores 10 bytes per x87 register. Decoding leaves the
//!   6 padding bytes of each neutral slot as they were, and it carries no SSE
//!   state at all.
//! - The legacy bank has no separate `fop` field. FSAVE packs the opcode into
//!   bits 16-26 of `fcs`, and `fos` carries 0xffff in its upper half. Both
//!   words are copied whole into `fiseg`/`foseg`; `fop` is left untouched.
//! - The x86-64 FXSAVE layout has no segment selectors for the last
//!   instruction and operand; `fiseg` and `foseg` are not written and decode
//!   as whatever the state already held.
//! - i386 FXSAVE only holds XMM0-XMM7.

use thiserror::Error;

use crate::trace::BankKind;
use crate::types::{Architecture, CpuState};

mod cursor;
pub mod x86;
pub mod x86_64;

/// Errors converting between raw register buffers and [`CpuState`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError
{
    /// The buffer size doesn't match the kernel structure
    #[error("{bank} bank for {architecture} must be {expected} bytes, got {actual}")]
    Length
    {
        architecture: Architecture,
        bank: BankKind,
        expected: usize,
        actual: usize,
    },

    /// The architecture has no such bank
    #[error("{architecture} has no {bank} bank")]
    UnsupportedBank
    {
        architecture: Architecture,
        bank: BankKind,
    },

    /// A field read ran past the end of the buffer
    #[error("{bank} bank for {architecture}: {len}-byte field at offset {offset} is out of bounds")]
    OutOfBounds
    {
        architecture: Architecture,
        bank: BankKind,
        offset: usize,
        len: usize,
    },
}

/// Size in bytes of the kernel structure for `bank`, or `None` if the
/// architecture has no such bank.
///
/// ```rust
/// use ironds_core::codec::bank_size;
/// use ironds_core::trace::BankKind;
/// use ironds_core::types::Architecture;
///
/// assert_eq!(bank_size(Architecture::X86, BankKind::LegacyFloatingPoint), Some(108));
/// assert_eq!(bank_size(Architecture::X86_64, BankKind::LegacyFloatingPoint), None);
/// ```
pub const fn bank_size(architecture: Architecture, bank: BankKind) -> Option<usize>
{
    match (architecture, bank) {
        (Architecture::X86, BankKind::GeneralPurpose) => Some(x86::UserRegs::SIZE),
        (Architecture::X86, BankKind::LegacyFloatingPoint) => Some(x86::UserFpRegs::SIZE),
        (Architecture::X86, BankKind::ExtendedFloatingPoint) => Some(x86::UserFpxRegs::SIZE),
        (Architecture::X86_64, BankKind::GeneralPurpose) => Some(x86_64::UserRegs::SIZE),
        (Architecture::X86_64, BankKind::LegacyFloatingPoint) => None,
        (Architecture::X86_64, BankKind::ExtendedFloatingPoint) => Some(x86_64::UserFpRegs::SIZE),
    }
}

/// Decode one raw bank into `state`, interpreted for `state.architecture()`.
///
/// Only the fields the kernel structure carries are touched.
///
/// ## Errors
///
/// [`CodecError::UnsupportedBank`] for a bank the architecture lacks,
/// [`CodecError::Length`] when `bytes` has the wrong size.
pub fn decode_bank(bank: BankKind, bytes: &[u8], state: &mut CpuState) -> Result<(), CodecError>
{
    match (state.architecture(), bank) {
        (Architecture::X86, BankKind::GeneralPurpose) => x86::UserRegs::parse(bytes)?.apply_to(state),
        (Architecture::X86, BankKind::LegacyFloatingPoint) => x86::UserFpRegs::parse(bytes)?.apply_to(state),
        (Architecture::X86, BankKind::ExtendedFloatingPoint) => x86::UserFpxRegs::parse(bytes)?.apply_to(state),
        (Architecture::X86_64, BankKind::GeneralPurpose) => x86_64::UserRegs::parse(bytes)?.apply_to(state),
        (Architecture::X86_64, BankKind::ExtendedFloatingPoint) => x86_64::UserFpRegs::parse(bytes)?.apply_to(state),
        (architecture @ Architecture::X86_64, bank @ BankKind::LegacyFloatingPoint) => {
            return Err(CodecError::UnsupportedBank { architecture, bank });
        }
    }

    Ok(())
}

/// Encode one bank of `state` as the raw kernel structure for its architecture.
///
/// ## Errors
///
/// [`CodecError::UnsupportedBank`] for a bank the architecture lacks.
pub fn encode_bank(bank: BankKind, state: &CpuState) -> Result<Vec<u8>, CodecError>
{
    let bytes = match (state.architecture(), bank) {
        (Architecture::X86, BankKind::GeneralPurpose) => x86::UserRegs::from_state(state).to_bytes(),
        (Architecture::X86, BankKind::LegacyFloatingPoint) => x86::UserFpRegs::from_state(state).to_bytes(),
        (Architecture::X86, BankKind::ExtendedFloatingPoint) => x86::UserFpxRegs::from_state(state).to_bytes(),
        (Architecture::X86_64, BankKind::GeneralPurpose) => x86_64::UserRegs::from_state(state).to_bytes(),
        (Architecture::X86_64, BankKind::ExtendedFloatingPoint) => x86_64::UserFpRegs::from_state(state).to_bytes(),
        (architecture @ Architecture::X86_64, bank @ BankKind::LegacyFloatingPoint) => {
            return Err(CodecError::UnsupportedBank { architecture, bank });
        }
    };

    Ok(bytes)
}
