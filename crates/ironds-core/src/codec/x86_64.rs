//! x86-64 kernel register structures.

use super::cursor::{pack_slots, unpack_slots, FieldReader, FieldWriter};
use super::CodecError;
use crate::trace::BankKind;
use crate::types::registers::{SSE_SLOT_SIZE, X87_SLOT_SIZE};
use crate::types::{Architecture, CpuState};

/// `struct user_regs_struct`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserRegs
{
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub rbp: u64,
    pub rbx: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rax: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub orig_rax: u64,
    pub rip: u64,
    pub cs: u64,
    pub eflags: u64,
    pub rsp: u64,
    pub ss: u64,
    pub fs_base: u64,
    pub gs_base: u64,
    pub ds: u64,
    pub es: u64,
    pub fs: u64,
    pub gs: u64,
}

impl UserRegs
{
    pub const SIZE: usize = 216;

    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError>
    {
        let mut r = FieldReader::new(Architecture::X86_64, BankKind::GeneralPurpose, bytes, Self::SIZE)?;
        Ok(Self {
            r15: r.u64()?,
            r14: r.u64()?,
            r13: r.u64()?,
            r12: r.u64()?,
            rbp: r.u64()?,
            rbx: r.u64()?,
            r11: r.u64()?,
            r10: r.u64()?,
            r9: r.u64()?,
            r8: r.u64()?,
            rax: r.u64()?,
            rcx: r.u64()?,
            rdx: r.u64()?,
            rsi: r.u64()?,
            rdi: r.u64()?,
            orig_rax: r.u64()?,
            rip: r.u64()?,
            cs: r.u64()?,
            eflags: r.u64()?,
            rsp: r.u64()?,
            ss: r.u64()?,
            fs_base: r.u64()?,
            gs_base: r.u64()?,
            ds: r.u64()?,
            es: r.u64()?,
            fs: r.u64()?,
            gs: r.u64()?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>
    {
        let mut w = FieldWriter::new(Self::SIZE);
        for value in [
            self.r15,
            self.r14,
            self.r13,
            self.r12,
            self.rbp,
            self.rbx,
            self.r11,
            self.r10,
            self.r9,
            self.r8,
            self.rax,
            self.rcx,
            self.rdx,
            self.rsi,
            self.rdi,
            self.orig_rax,
            self.rip,
            self.cs,
            self.eflags,
            self.rsp,
            self.ss,
            self.fs_base,
            self.gs_base,
            self.ds,
            self.es,
            self.fs,
            self.gs,
        ] {
            w.u64(value);
        }
        w.finish()
    }

    pub fn from_state(state: &CpuState) -> Self
    {
        let gp = &state.gp;
        Self {
            r15: gp.r15,
            r14: gp.r14,
            r13: gp.r13,
            r12: gp.r12,
            rbp: gp.rbp,
            rbx: gp.rbx,
            r11: gp.r11,
            r10: gp.r10,
            r9: gp.r9,
            r8: gp.r8,
            rax: gp.rax,
            rcx: gp.rcx,
            rdx: gp.rdx,
            rsi: gp.rsi,
            rdi: gp.rdi,
            orig_rax: gp.orig_rax,
            rip: gp.rip,
            cs: gp.cs,
            eflags: gp.rflags,
            rsp: gp.rsp,
            ss: gp.ss,
            fs_base: gp.fs_base,
            gs_base: gp.gs_base,
            ds: gp.ds,
            es: gp.es,
            fs: gp.fs,
            gs: gp.gs,
        }
    }

    pub fn apply_to(&self, state: &mut CpuState)
    {
        let gp = &mut state.gp;
        gp.r15 = self.r15;
        gp.r14 = self.r14;
        gp.r13 = self.r13;
        gp.r12 = self.r12;
        gp.rbp = self.rbp;
        gp.rbx = self.rbx;
        gp.r11 = self.r11;
        gp.r10 = self.r10;
        gp.r9 = self.r9;
        gp.r8 = self.r8;
        gp.rax = self.rax;
        gp.rcx = self.rcx;
        gp.rdx = self.rdx;
        gp.rsi = self.rsi;
        gp.rdi = self.rdi;
        gp.orig_rax = self.orig_rax;
        gp.rip = self.rip;
        gp.cs = self.cs;
        gp.rflags = self.eflags;
        gp.rsp = self.rsp;
        gp.ss = self.ss;
        gp.fs_base = self.fs_base;
        gp.gs_base = self.gs_base;
        gp.ds = self.ds;
        gp.es = self.es;
        gp.fs = self.fs;
        gp.gs = self.gs;
    }
}

/// `struct user_fpregs_struct`, the 64-bit FXSAVE image
///
/// Instruction and operand pointers are full 64-bit offsets; this layout
/// has no room for their segment selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFpRegs
{
    pub cwd: u16,
    pub swd: u16,
    pub ftw: u16,
    pub fop: u16,
    pub rip: u64,
    pub rdp: u64,
    pub mxcsr: u32,
    pub mxcr_mask: u32,
    pub st_space: [u8; 128],
    pub xmm_space: [u8; 256],
    pub padding: [u8; 96],
}

impl Default for UserFpRegs
{
    fn default() -> Self
    {
        Self {
            cwd: 0,
            swd: 0,
            ftw: 0,
            fop: 0,
            rip: 0,
            rdp: 0,
            mxcsr: 0,
            mxcr_mask: 0,
            st_space: [0; 128],
            xmm_space: [0; 256],
            padding: [0; 96],
        }
    }
}

impl UserFpRegs
{
    pub const SIZE: usize = 512;

    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError>
    {
        let mut r = FieldReader::new(Architecture::X86_64, BankKind::ExtendedFloatingPoint, bytes, Self::SIZE)?;
        Ok(Self {
            cwd: r.u16()?,
            swd: r.u16()?,
            ftw: r.u16()?,
            fop: r.u16()?,
            rip: r.u64()?,
            rdp: r.u64()?,
            mxcsr: r.u32()?,
            mxcr_mask: r.u32()?,
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
            .u16(self.ftw)
            .u16(self.fop)
            .u64(self.rip)
            .u64(self.rdp)
            .u32(self.mxcsr)
            .u32(self.mxcr_mask)
            .bytes(&self.st_space)
            .bytes(&self.xmm_space)
            .bytes(&self.padding);
        w.finish()
    }

    pub fn from_state(state: &CpuState) -> Self
    {
        let (x87, sse) = (&state.x87, &state.sse);
        let mut fp = Self {
            cwd: x87.fctw,
            swd: x87.fstw,
            ftw: x87.ftag,
            fop: x87.fop,
            rip: x87.fioff,
            rdp: x87.fooff,
            mxcsr: sse.mxcsr,
            mxcr_mask: sse.mxcsrmask,
            ..Self::default()
        };
        pack_slots(&mut fp.st_space, X87_SLOT_SIZE, x87.regs.iter().map(|r| &r.bytes[..]));
        pack_slots(&mut fp.xmm_space, SSE_SLOT_SIZE, sse.regs.iter().map(|r| &r.bytes()[..]));
        fp
    }

    /// Populate the x87 and SSE banks. `fiseg` and `foseg` are left alone.
    pub fn apply_to(&self, state: &mut CpuState)
    {
        let x87 = &mut state.x87;
        x87.fstw = self.swd;
        x87.fctw = self.cwd;
        x87.ftag = self.ftw;
        x87.fop = self.fop;
        x87.fioff = self.rip;
        x87.fooff = self.rdp;
        unpack_slots(&self.st_space, X87_SLOT_SIZE, x87.regs.iter_mut().map(|r| &mut r.bytes[..]));

        let sse = &mut state.sse;
        sse.mxcsr = self.mxcsr;
        sse.mxcsrmask = self.mxcr_mask;
        unpack_slots(&self.xmm_space, SSE_SLOT_SIZE, sse.regs.iter_mut().map(|r| &mut r.bytes_mut()[..]));
    }
}
