//! i386 kernel register structures.
//!
//! Layouts follow `<sys/user.h>` for 32-bit x86. Every `long` there is 32 bits
//! and is kept as an unsigned raw bit pattern here.

use super::cursor::{pack_slots, unpack_slots, FieldReader, FieldWriter};
use super::CodecError;
use crate::trace::BankKind;
use crate::types::registers::{X87_SIGNIFICANT_BYTES, X87_SLOT_SIZE};
use crate::types::{Architecture, CpuState};

/// XMM registers present in the i386 FXSAVE image.
pub const XMM_REGISTER_COUNT: usize = 8;

/// `struct user_regs_struct`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserRegs
{
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub esi: u32,
    pub edi: u32,
    pub ebp: u32,
    pub eax: u32,
    pub xds: u32,
    pub xes: u32,
    pub xfs: u32,
    pub xgs: u32,
    pub orig_eax: u32,
    pub eip: u32,
    pub xcs: u32,
    pub eflags: u32,
    pub esp: u32,
    pub xss: u32,
}

impl UserRegs
{
    pub const SIZE: usize = 68;

    /// Parse the raw structure.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError>
    {
        let mut r = FieldReader::new(Architecture::X86, BankKind::GeneralPurpose, bytes, Self::SIZE)?;
        Ok(Self {
            ebx: r.u32()?,
            ecx: r.u32()?,
            edx: r.u32()?,
            esi: r.u32()?,
            edi: r.u32()?,
            ebp: r.u32()?,
            eax: r.u32()?,
            xds: r.u32()?,
            xes: r.u32()?,
            xfs: r.u32()?,
            xgs: r.u32()?,
            orig_eax: r.u32()?,
            eip: r.u32()?,
            xcs: r.u32()?,
            eflags: r.u32()?,
            esp: r.u32()?,
            xss: r.u32()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>
    {
        let mut w = FieldWriter::new(Self::SIZE);
        w.u32(self.ebx)
            .u32(self.ecx)
            .u32(self.edx)
            .u32(self.esi)
            .u32(self.edi)
            .u32(self.ebp)
            .u32(self.eax)
            .u32(self.xds)
            .u32(self.xes)
            .u32(self.xfs)
            .u32(self.xgs)
            .u32(self.orig_eax)
            .u32(self.eip)
            .u32(self.xcs)
            .u32(self.eflags)
            .u32(self.esp)
            .u32(self.xss);
        w.finish()
    }

    /// Build from the neutral bank, keeping the low 32 bits of each register.
    pub fn from_state(state: &CpuState) -> Self
    {
        let gp = &state.gp;
        Self {
            ebx: gp.rbx as u32,
            ecx: gp.rcx as u32,
            edx: gp.rdx as u32,
            esi: gp.rsi as u32,
            edi: gp.rdi as u32,
            ebp: gp.rbp as u32,
            eax: gp.rax as u32,
            xds: gp.ds as u32,
            xes: gp.es as u32,
            xfs: gp.fs as u32,
            xgs: gp.gs as u32,
            orig_eax: gp.orig_rax as u32,
            eip: gp.rip as u32,
            xcs: gp.cs as u32,
            eflags: gp.rflags as u32,
            esp: gp.rsp as u32,
            xss: gp.ss as u32,
        }
    }

    pub fn apply_to(&self, state: &mut CpuState)
    {
        let gp = &mut state.gp;
        gp.rbx = u64::from(self.ebx);
        gp.rcx = u64::from(self.ecx);
        gp.rdx = u64::from(self.edx);
        gp.rsi = u64::from(self.esi);
        gp.rdi = u64::from(self.edi);
        gp.rbp = u64::from(self.ebp);
        gp.rax = u64::from(self.eax);
        gp.ds = u64::from(self.xds);
        gp.es = u64::from(self.xes);
        gp.fs = u64::from(self.xfs);
        gp.gs = u64::from(self.xgs);
        gp.orig_rax = u64::from(self.orig_eax);
        gp.rip = u64::from(self.eip);
        gp.cs = u64::from(self.xcs);
        gp.rflags = u64::from(self.eflags);
        gp.rsp = u64::from(self.esp);
        gp.ss = u64::from(self.xss);
    }
}

/// `struct user_fpregs_struct`, the FSAVE image
///
/// x87 only. ST registers are packed at 10-byte stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFpRegs
{
    pub cwd: u32,
    pub swd: u32,
    pub twd: u32,
    pub fip: u32,
    /// FSAVE packing: code selector in bits 0-15, last opcode in bits 16-26.
    pub fcs: u32,
    pub foo: u32,
    /// Operand selector in bits 0-15; the kernel sets the upper half to 0xffff.
    pub fos: u32,
    pub st_space: [u8; 80],
}

impl Default for UserFpRegs
{
    fn default() -> Self
    {
        Self {
            cwd: 0,
            swd: 0,
            twd: 0,
            fip: 0,
            fcs: 0,
            foo: 0,
            fos: 0,
            st_space: [0; 80],
        }
    }
}

impl UserFpRegs
{
    pub const SIZE: usize = 108;

    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError>
    {
        let mut r = FieldReader::new(Architecture::X86, BankKind::LegacyFloatingPoint, bytes, Self::SIZE)?;
        Ok(Self {
            cwd: r.u32()?,
            swd: r.u32()?,
            twd: r.u32()?,
            fip: r.u32()?,
            fcs: r.u32()?,
            foo: r.u32()?,
            fos: r.u32()?,
            st_space: r.array()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>
    {
        let mut w = FieldWriter::new(Self::SIZE);
        w.u32(self.cwd)
            .u32(self.swd)
            .u32(self.twd)
            .u32(self.fip)
            .u32(self.fcs)
            .u32(self.foo)
            .u32(self.fos)
            .bytes(&self.st_space);
        w.finish()
    }

    pub fn from_state(state: &CpuState) -> Self
    {
        let x87 = &state.x87;
        let mut fp = Self {
            cwd: u32::from(x87.fctw),
            swd: u32::from(x87.fstw),
            twd: u32::from(x87.ftag),
            fip: x87.fioff as u32,
            fcs: x87.fiseg,
            foo: x87.fooff as u32,
            fos: x87.foseg,
            ..Self::default()
        };
        pack_slots(&mut fp.st_space, X87_SIGNIFICANT_BYTES, x87.regs.iter().map(|r| r.significant()));
        fp
    }

    /// Populate the x87 bank. `fop`, the slot padding and SSE are left alone.
    ///
    /// `fcs` and `fos` are copied whole into `fiseg`/`foseg`, so the opcode
    /// packed into `fcs` and the high half of `fos` stay in those fields.
    pub fn apply_to(&self, state: &mut CpuState)
    {
        let x87 = &mut state.x87;
        x87.fstw = self.swd as u16;
        x87.fctw = self.cwd as u16;
        x87.ftag = self.twd as u16;
        x87.fiseg = self.fcs;
        x87.fioff = u64::from(self.fip);
        x87.foseg = self.fos;
        x87.fooff = u64::from(self.foo);
        unpack_slots(
            &self.st_space,
            X87_SIGNIFICANT_BYTES,
            x87.regs.iter_mut().map(|r| &mut r.bytes[..X87_SIGNIFICANT_BYTES]),
        );
    }
}

/// `struct user_fpxregs_struct`, the FXSAVE image
///
/// x87 registers at 16-byte stride followed by XMM0-XMM7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFpxRegs
{
    pub cwd: u16,
    pub swd: u16,
    pub twd: u16,
    pub fop: u16,
    pub fip: u32,
    pub fcs: u32,
    pub foo: u32,
    pub fos: u32,
    pub mxcsr: u32,
    pub reserved: u32,
    pub st_space: [u8; 128],
    pub xmm_space: [u8; 128],
    pub padding: [u8; 224],
}

impl Default for UserFpxRegs
{
    fn default() -> Self
    {
        Self {
            cwd: 0,
            swd: 0,
            twd: 0,
            fop: 0,
            fip: 0,
            fcs: 0,
            foo: 0,
            fos: 0,
            mxcsr: 0,
            reserved: 0,
            st_space: [0; 128],
            xmm_space: [0; 128],
            padding: [0; 224],
        }
    }
}

impl UserFpxRegs
{
    pub const SIZE: usize = 512;

    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError>
    {
        let mut r = FieldReader::new(Architecture::X86, BankKind::ExtendedFloatingPoint, bytes, Self::SIZE)?;
        Ok(Self {
            cwd: r.u16()?,
            swd: r.u16()?,
            twd: r.u16()?,
            fop: r.u16()?,
            fip: r.u32()?,
            fcs: r.u32()?,
            foo: r.u32()?,
            fos: r.u32()?,
            mxcsr: r.u32()?,
            reserved: r.u32()?,
            st_space: r.array()?,
            xmm_space: r.array()?,
            padding: r.array()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>
    {
        let mut w = FieldWriter::new(Self::SIZE);
        w.u16(self.cwd)
            .u16(self.swd)
            .u16(self.twd)
            .u16(self.fop)
            .u32(self.fip)
            .u32(self.fcs)
            .u32(self.foo)
            .u32(self.fos)
            .u32(self.mxcsr)
            .u32(self.reserved)
            .bytes(&self.st_space)
            .bytes(&self.xmm_space)
            .bytes(&self.padding);
        w.finish()
    }

    pub fn from_state(state: &CpuState) -> Self
    {
        let (x87, sse) = (&state.x87, &state.sse);
        let mut fpx = Self {
            cwd: x87.fctw,
            swd: x87.fstw,
            twd: x87.ftag,
            fop: x87.fop,
            fip: x87.fioff as u32,
            fcs: x87.fiseg,
            foo: x87.fooff as u32,
            fos: x87.foseg,
            mxcsr: sse.mxcsr,
            reserved: sse.mxcsrmask,
            ..Self::default()
        };
        pack_slots(&mut fpx.st_space, X87_SLOT_SIZE, x87.regs.iter().map(|r| &r.bytes[..]));
        pack_slots(
            &mut fpx.xmm_space,
            16,
            sse.regs.iter().take(XMM_REGISTER_COUNT).map(|r| &r.bytes()[..]),
        );
        fpx
    }

    /// Populate the x87 and SSE banks. XMM8-XMM15 are left alone.
    pub fn apply_to(&self, state: &mut CpuState)
    {
        let x87 = &mut state.x87;
        x87.fstw = self.swd;
        x87.fctw = self.cwd;
        x87.ftag = self.twd;
        x87.fop = self.fop;
        x87.fiseg = self.fcs;
        x87.fioff = u64::from(self.fip);
        x87.foseg = self.fos;
        x87.fooff = u64::from(self.foo);
        unpack_slots(&self.st_space, X87_SLOT_SIZE, x87.regs.iter_mut().map(|r| &mut r.bytes[..]));

        let sse = &mut state.sse;
        sse.mxcsr = self.mxcsr;
        sse.mxcsrmask = self.reserved;
        unpack_slots(
            &self.xmm_space,
            16,
            sse.regs.iter_mut().take(XMM_REGISTER_COUNT).map(|r| &mut r.bytes_mut()[..]),
        );
    }
}
