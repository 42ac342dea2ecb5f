//! Bounds-checked field access over raw kernel register buffers.
//!
//! Kernel structures are read and written field by field, in declaration
//! order, with explicit little-endian conversion. Nothing is reinterpreted in
//! place, so a short or oversized buffer is an error instead of undefined
//! behavior.

use super::CodecError;
use crate::trace::BankKind;
use crate::types::Architecture;

/// Sequential little-endian reader over one register bank.
pub(crate) struct FieldReader<'a>
{
    bytes: &'a [u8],
    offset: usize,
    architecture: Architecture,
    bank: BankKind,
}

impl<'a> FieldReader<'a>
{
    /// Start reading `bytes`, which must be exactly `expected` bytes long.
    pub(crate) fn new(architecture: Architecture, bank: BankKind, bytes: &'a [u8], expected: usize) -> Result<Self, CodecError>
    {
        if bytes.len() != expected {
            return Err(CodecError::Length {
                architecture,
                bank,
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            bytes,
            offset: 0,
            architecture,
            bank,
        })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError>
    {
        let out_of_bounds = CodecError::OutOfBounds {
            architecture: self.architecture,
            bank: self.bank,
            offset: self.offset,
            len,
        };
        let end = self.offset.checked_add(len).ok_or(out_of_bounds.clone())?;
        let field = self.bytes.get(self.offset..end).ok_or(out_of_bounds)?;
        self.offset = end;
        Ok(field)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError>
    {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, CodecError>
    {
        self.array().map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CodecError>
    {
        self.array().map(u32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CodecError>
    {
        self.array().map(u64::from_le_bytes)
    }
}

/// Sequential little-endian writer producing one register bank.
pub(crate) struct FieldWriter
{
    bytes: Vec<u8>,
    size: usize,
}

impl FieldWriter
{
    pub(crate) fn new(size: usize) -> Self
    {
        Self {
            bytes: Vec::with_capacity(size),
            size,
        }
    }

    pub(crate) fn bytes(&mut self, value: &[u8]) -> &mut Self
    {
        self.bytes.extend_from_slice(value);
        self
    }

    pub(crate) fn u16(&mut self, value: u16) -> &mut Self
    {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self
    {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self
    {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn finish(self) -> Vec<u8>
    {
        debug_assert_eq!(self.bytes.len(), self.size, "register structure written with wrong size");
        self.bytes
    }
}

/// Copy slot contents out of a packed region.
///
/// `region` holds elements `stride` bytes apart. Each destination slot
/// receives the first `slot.len()` bytes of its element (never more than
/// `stride`); bytes of the slot beyond that are left untouched.
pub(crate) fn unpack_slots<'s>(region: &[u8], stride: usize, slots: impl IntoIterator<Item = &'s mut [u8]>)
{
    for (slot, element) in slots.into_iter().zip(region.chunks_exact(stride)) {
        let len = slot.len().min(stride);
        slot[..len].copy_from_slice(&element[..len]);
    }
}

/// Inverse of [`unpack_slots`]: pack slots into a region at `stride`.
pub(crate) fn pack_slots<'s>(region: &mut [u8], stride: usize, slots: impl IntoIterator<Item = &'s [u8]>)
{
    for (element, slot) in region.chunks_exact_mut(stride).zip(slots) {
        let len = slot.len().min(stride);
        element[..len].copy_from_slice(&slot[..len]);
    }
}
