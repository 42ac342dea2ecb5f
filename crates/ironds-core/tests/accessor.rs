//! Tests for whole-state register transfer against a scripted primitive

use std::collections::{HashMap, HashSet};

use ironds_core::accessor::CpuStateAccessor;
use ironds_core::codec::{self, x86_64};
use ironds_core::error::{IrondsError, IrondsResult, PlatformError};
use ironds_core::trace::{BankKind, EntityResolver, TraceHandle, TracePrimitive};
use ironds_core::types::{Architecture, CpuState, EntityId, ProcessId, ThreadId, VectorRegister};

/// In-memory primitive: serves canned banks and records every store.
#[derive(Default)]
struct ScriptedPrimitive
{
    banks: HashMap<BankKind, Vec<u8>>,
    get_errors: HashMap<BankKind, i32>,
    set_errors: HashMap<BankKind, i32>,
    gets: Vec<BankKind>,
    set_attempts: Vec<BankKind>,
    stored: Vec<(TraceHandle, BankKind, Vec<u8>)>,
}

impl ScriptedPrimitive
{
    fn serve(mut self, bank: BankKind, bytes: Vec<u8>) -> Self
    {
        self.banks.insert(bank, bytes);
        self
    }

    fn fail_get(mut self, bank: BankKind, errno: i32) -> Self
    {
        self.get_errors.insert(bank, errno);
        self
    }

    fn fail_set(mut self, bank: BankKind, errno: i32) -> Self
    {
        self.set_errors.insert(bank, errno);
        self
    }

    fn stored_banks(&self) -> Vec<BankKind>
    {
        self.stored.iter().map(|(_, bank, _)| *bank).collect()
    }
}

impl TracePrimitive for ScriptedPrimitive
{
    fn get_register_bank(&mut self, _handle: TraceHandle, bank: BankKind) -> Result<Vec<u8>, PlatformError>
    {
        self.gets.push(bank);
        if let Some(&errno) = self.get_errors.get(&bank) {
            return Err(PlatformError(errno));
        }
        self.banks.get(&bank).cloned().ok_or(PlatformError(libc::EIO))
    }

    fn set_register_bank(&mut self, handle: TraceHandle, bank: BankKind, bytes: &[u8]) -> Result<(), PlatformError>
    {
        self.set_attempts.push(bank);
        if let Some(&errno) = self.set_errors.get(&bank) {
            return Err(PlatformError(errno));
        }
        self.stored.push((handle, bank, bytes.to_vec()));
        Ok(())
    }
}

/// Resolves a fixed set of entities to their target TID.
struct KnownEntities(HashSet<EntityId>);

impl KnownEntities
{
    fn of(entities: &[EntityId]) -> Self
    {
        Self(entities.iter().copied().collect())
    }
}

impl EntityResolver for KnownEntities
{
    fn resolve(&self, entity: EntityId) -> IrondsResult<TraceHandle>
    {
        if self.0.contains(&entity) {
            Ok(TraceHandle(entity.target_tid() as i32))
        } else {
            Err(IrondsError::EntityNotFound(entity))
        }
    }
}

const ENTITY: EntityId = EntityId::thread(ProcessId(4000), ThreadId(4001));

fn x86_64_state() -> CpuState
{
    let mut state = CpuState::new(Architecture::X86_64);
    state.gp.rax = 0x3c;
    state.gp.rdi = 0x7fff_ffff_e000;
    state.gp.r12 = 0xdead_beef_cafe_f00d;
    state.set_pc(0x5555_5555_5140);
    state.set_sp(0x7fff_ffff_dff0);
    state.gp.rflags = 0x246;
    state.gp.cs = 0x33;
    state.gp.ss = 0x2b;
    state.x87.fctw = 0x037f;
    state.x87.ftag = 0xffff;
    state.x87.fop = 0x0123;
    state.x87.fioff = 0x5555_5555_5200;
    state.x87.regs[0].bytes[..10].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0x80, 0xff, 0x3f]);
    state.sse.mxcsr = 0x1f80;
    state.sse.mxcsrmask = 0xffff;
    state.sse.regs[3] = VectorRegister::from_u128(0x4048_f5c3_0000_0000_3ff0_0000_0000_0000);
    state
}

fn x86_state() -> CpuState
{
    let mut state = CpuState::new(Architecture::X86);
    state.gp.rax = 0xfffffe00;
    state.gp.orig_rax = 162;
    state.set_pc(0x0804_9000);
    state.set_sp(0xbfff_f100);
    state.gp.rflags = 0x282;
    state.x87.fctw = 0x037f;
    state.x87.fstw = 0x4000;
    state.x87.fop = 0x07dd;
    state.x87.fiseg = 0x73;
    state.x87.foseg = 0x7b;
    state.x87.regs[1].bytes[..10].fill(0x5a);
    state.sse.mxcsr = 0x1f80;
    state.sse.regs[0] = VectorRegister::from_u128(1);
    state
}

fn encode(bank: BankKind, state: &CpuState) -> Vec<u8>
{
    codec::encode_bank(bank, state).unwrap()
}

#[test]
fn test_read_x86_64_full_state()
{
    let expected = x86_64_state();
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &expected))
        .serve(BankKind::ExtendedFloatingPoint, encode(BankKind::ExtendedFloatingPoint, &expected));
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let state = accessor.read_cpu_state(ENTITY).unwrap();

    assert_eq!(state, expected);
    assert_eq!(state.architecture(), Architecture::X86_64);
    assert!(accessor.trace_state(ENTITY).is_some());
    assert_eq!(
        primitive.gets,
        vec![BankKind::GeneralPurpose, BankKind::ExtendedFloatingPoint]
    );
}

#[test]
fn test_read_x86_extended_preferred()
{
    let expected = x86_state();
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &expected))
        .serve(BankKind::ExtendedFloatingPoint, encode(BankKind::ExtendedFloatingPoint, &expected))
        .serve(BankKind::LegacyFloatingPoint, vec![0xff; 108]);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    let state = accessor.read_cpu_state(ENTITY).unwrap();

    assert_eq!(state, expected);
    assert!(!primitive.gets.contains(&BankKind::LegacyFloatingPoint));
}

#[test]
fn test_read_x86_falls_back_to_legacy()
{
    let source = x86_state();
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &source))
        .fail_get(BankKind::ExtendedFloatingPoint, libc::EIO)
        .serve(BankKind::LegacyFloatingPoint, encode(BankKind::LegacyFloatingPoint, &source));
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    let state = accessor.read_cpu_state(ENTITY).unwrap();

    assert_eq!(state.gp, source.gp);
    assert_eq!(state.x87.fctw, source.x87.fctw);
    assert_eq!(state.x87.fstw, source.x87.fstw);
    assert_eq!(state.x87.fiseg, 0x73);
    assert_eq!(state.x87.regs[1], source.x87.regs[1]);
    // The legacy structure has neither fop nor SSE.
    assert_eq!(state.x87.fop, 0);
    assert_eq!(state.sse.mxcsr, 0);
    assert!(state.sse.regs.iter().all(|r| r.as_u128() == 0));
}

#[test]
fn test_read_without_any_fp_bank_still_succeeds()
{
    let source = x86_state();
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &source))
        .fail_get(BankKind::ExtendedFloatingPoint, libc::EIO)
        .fail_get(BankKind::LegacyFloatingPoint, libc::EINVAL);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    let state = accessor.read_cpu_state(ENTITY).unwrap();

    let mut expected = CpuState::new(Architecture::X86);
    expected.gp = source.gp;
    assert_eq!(state, expected);
}

#[test]
fn test_read_malformed_fp_bank_is_skipped()
{
    let source = x86_64_state();
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &source))
        .serve(BankKind::ExtendedFloatingPoint, vec![0xff; 100]);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let state = accessor.read_cpu_state(ENTITY).unwrap();

    assert_eq!(state.gp, source.gp);
    assert_eq!(state.x87, CpuState::new(Architecture::X86_64).x87);
}

#[test]
fn test_read_gp_failure_is_fatal()
{
    let mut primitive = ScriptedPrimitive::default()
        .fail_get(BankKind::GeneralPurpose, libc::ESRCH)
        .serve(BankKind::ExtendedFloatingPoint, vec![0; x86_64::UserFpRegs::SIZE]);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let err = accessor.read_cpu_state(ENTITY).unwrap_err();

    match err {
        IrondsError::Primitive { source, .. } => assert_eq!(source.errno(), libc::ESRCH),
        other => panic!("Expected Primitive error, got {other:?}"),
    }
    assert_eq!(primitive.gets, vec![BankKind::GeneralPurpose]);
}

#[test]
fn test_read_gp_permission_denied()
{
    let mut primitive = ScriptedPrimitive::default().fail_get(BankKind::GeneralPurpose, libc::EPERM);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    assert!(matches!(
        accessor.read_cpu_state(ENTITY),
        Err(IrondsError::PermissionDenied(_))
    ));
}

#[test]
fn test_read_gp_wrong_size_is_codec_error()
{
    let mut primitive = ScriptedPrimitive::default().serve(BankKind::GeneralPurpose, vec![0; 68]);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    assert!(matches!(accessor.read_cpu_state(ENTITY), Err(IrondsError::Codec(_))));
}

#[test]
fn test_unresolved_entity_creates_no_state()
{
    let mut primitive = ScriptedPrimitive::default();
    let resolver = KnownEntities::of(&[]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let err = accessor.read_cpu_state(ENTITY).unwrap_err();
    assert!(matches!(err, IrondsError::EntityNotFound(entity) if entity == ENTITY));
    assert!(matches!(
        accessor.write_cpu_state(ENTITY, &x86_64_state()),
        Err(IrondsError::EntityNotFound(_))
    ));
    assert!(accessor.trace_state(ENTITY).is_none());
    assert_eq!(accessor.tracked_entities(), 0);

    assert!(primitive.gets.is_empty());
    assert!(primitive.set_attempts.is_empty());
}

#[test]
fn test_write_x86_64_pushes_gp_then_extended()
{
    let state = x86_64_state();
    let mut primitive = ScriptedPrimitive::default();
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    accessor.write_cpu_state(ENTITY, &state).unwrap();
    assert!(accessor.trace_state(ENTITY).is_some());

    assert_eq!(
        primitive.stored_banks(),
        vec![BankKind::GeneralPurpose, BankKind::ExtendedFloatingPoint]
    );
    assert_eq!(primitive.stored[0].0, TraceHandle(4001));
    assert_eq!(primitive.stored[0].2, encode(BankKind::GeneralPurpose, &state));
    assert_eq!(primitive.stored[1].2, encode(BankKind::ExtendedFloatingPoint, &state));
}

#[test]
fn test_write_x86_stops_at_first_accepted_fp_bank()
{
    let mut primitive = ScriptedPrimitive::default().fail_set(BankKind::ExtendedFloatingPoint, libc::EIO);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    accessor.write_cpu_state(ENTITY, &x86_state()).unwrap();

    assert_eq!(
        primitive.set_attempts,
        vec![
            BankKind::GeneralPurpose,
            BankKind::ExtendedFloatingPoint,
            BankKind::LegacyFloatingPoint
        ]
    );
    assert_eq!(
        primitive.stored_banks(),
        vec![BankKind::GeneralPurpose, BankKind::LegacyFloatingPoint]
    );
}

#[test]
fn test_write_fp_failure_is_silent()
{
    let mut primitive = ScriptedPrimitive::default()
        .fail_set(BankKind::ExtendedFloatingPoint, libc::EIO)
        .fail_set(BankKind::LegacyFloatingPoint, libc::EIO);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86);
    assert!(accessor.write_cpu_state(ENTITY, &x86_state()).is_ok());

    assert_eq!(primitive.stored_banks(), vec![BankKind::GeneralPurpose]);
}

#[test]
fn test_write_gp_failure_skips_fp()
{
    let mut primitive = ScriptedPrimitive::default().fail_set(BankKind::GeneralPurpose, libc::ESRCH);
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let err = accessor.write_cpu_state(ENTITY, &x86_64_state()).unwrap_err();

    assert!(matches!(err, IrondsError::Primitive { .. }));
    assert_eq!(primitive.set_attempts, vec![BankKind::GeneralPurpose]);
    assert!(primitive.stored.is_empty());
}

#[test]
fn test_write_rejects_other_architecture()
{
    let mut primitive = ScriptedPrimitive::default();
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    let err = accessor.write_cpu_state(ENTITY, &x86_state()).unwrap_err();

    assert!(matches!(err, IrondsError::InvalidArgument(_)));
    assert!(accessor.trace_state(ENTITY).is_none());
    assert!(primitive.set_attempts.is_empty());
}

#[test]
fn test_write_then_read_round_trip()
{
    let state = x86_64_state();
    let resolver = KnownEntities::of(&[ENTITY]);

    let mut writer = ScriptedPrimitive::default();
    CpuStateAccessor::new(&mut writer, &resolver, Architecture::X86_64)
        .write_cpu_state(ENTITY, &state)
        .unwrap();

    let mut reader = ScriptedPrimitive::default();
    for (_, bank, bytes) in writer.stored {
        reader = reader.serve(bank, bytes);
    }
    let read = CpuStateAccessor::new(&mut reader, &resolver, Architecture::X86_64)
        .read_cpu_state(ENTITY)
        .unwrap();

    assert_eq!(read, state);
}

#[test]
fn test_trace_state_survives_repeated_reads_until_release()
{
    let source = x86_64_state();
    let other = EntityId::process(ProcessId(5000));
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &source))
        .serve(BankKind::ExtendedFloatingPoint, encode(BankKind::ExtendedFloatingPoint, &source));
    let resolver = KnownEntities::of(&[ENTITY, other]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    accessor.read_cpu_state(ENTITY).unwrap();
    accessor.read_cpu_state(other).unwrap();
    assert_eq!(accessor.tracked_entities(), 2);

    if let Some(state) = accessor.trace_state_mut(ENTITY) {
        state.breakpoint_count = 2;
        state.max_watchpoint_size = 8;
    }
    accessor.read_cpu_state(ENTITY).unwrap();
    assert_eq!(accessor.trace_state(ENTITY).map(|s| s.breakpoint_count), Some(2));

    let released = accessor.release(ENTITY);
    assert_eq!(released.map(|s| s.max_watchpoint_size), Some(8));
    assert!(accessor.trace_state(ENTITY).is_none());
    assert!(accessor.release(ENTITY).is_none());
    assert!(accessor.trace_state(other).is_some());
}

#[test]
fn test_main_thread_aliases_share_trace_state()
{
    let source = x86_64_state();
    let pid = ProcessId(500);
    let process = EntityId::process(pid);
    let by_tid = EntityId::thread(pid, ThreadId(500));
    let by_zero = EntityId::thread(pid, ThreadId(0));
    let mut primitive = ScriptedPrimitive::default()
        .serve(BankKind::GeneralPurpose, encode(BankKind::GeneralPurpose, &source))
        .serve(BankKind::ExtendedFloatingPoint, encode(BankKind::ExtendedFloatingPoint, &source));
    let resolver = KnownEntities::of(&[process, by_tid, by_zero]);

    let mut accessor = CpuStateAccessor::new(&mut primitive, &resolver, Architecture::X86_64);
    accessor.read_cpu_state(process).unwrap();
    if let Some(state) = accessor.trace_state_mut(process) {
        state.breakpoint_count = 3;
    }

    accessor.read_cpu_state(by_tid).unwrap();
    accessor.write_cpu_state(by_zero, &source).unwrap();

    assert_eq!(accessor.tracked_entities(), 1);
    assert_eq!(accessor.trace_state(by_tid).map(|s| s.breakpoint_count), Some(3));
    assert_eq!(accessor.trace_state(by_zero).map(|s| s.breakpoint_count), Some(3));

    assert_eq!(accessor.release(by_tid).map(|s| s.breakpoint_count), Some(3));
    assert!(accessor.trace_state(process).is_none());
    assert_eq!(accessor.tracked_entities(), 0);
}
