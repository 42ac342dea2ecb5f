//! # CPU State Accessor
//!
//! Reads and writes the complete [`CpuState`] of a traced entity through a
//! [`TracePrimitive`].
//!
//! ## Transfer plan
//!
//! Each architecture has a [`TransferPolicy`]: one mandatory bank (the
//! general-purpose registers) and an ordered chain of floating-point banks.
//!
//! | Architecture | Mandatory | Floating-point chain |
//! |---|---|---|
//! | x86 | general-purpose | extended (FXSAVE), then legacy (FSAVE) |
//! | x86-64 | general-purpose | extended (FXSAVE64) |
//!
//! A failure on the mandatory bank fails the whole operation. The
//! floating-point chain degrades instead:
//!
//! - **Read**: the first bank that can be fetched and decoded fills the x87
//!   (and, for FXSAVE, SSE) bank. If none can, those banks stay zero and the
//!   read still succeeds. An i386 kernel on a CPU without FXSAVE takes the
//!   legacy path.
//! - **Write**: the first bank the kernel accepts ends the walk. If none
//!   accepts, a warning is logged and the write still succeeds with only the
//!   general-purpose registers updated.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
//! # fn main() -> ironds_core::error::IrondsResult<()> {
//! use ironds_core::accessor::CpuStateAccessor;
//! use ironds_core::platform::linux::{AttachGuard, ProcfsResolver, PtraceTracer};
//! use ironds_core::types::{Architecture, EntityId, ProcessId};
//!
//! let pid = ProcessId(12345);
//! let _attached = AttachGuard::attach(pid)?;
//!
//! let mut accessor = CpuStateAccessor::new(PtraceTracer::new(), ProcfsResolver::new(), Architecture::X86_64);
//! let entity = EntityId::process(pid);
//! let mut state = accessor.read_cpu_state(entity)?;
//! state.set_pc(state.pc() + 1);
//! accessor.write_cpu_state(entity, &state)?;
//! accessor.release(entity);
//! # Ok(())
//! # }
//! # #[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
//! # fn main() {}
//! ```

use tracing::{debug, warn};

use crate::codec;
use crate::error::{IrondsError, IrondsResult};
use crate::state::{TraceState, TraceStateTable};
use crate::trace::{BankKind, EntityResolver, TraceHandle, TracePrimitive};
use crate::types::{Architecture, CpuState, EntityId};

/// Ordered bank plan for one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy
{
    mandatory: BankKind,
    floating_point: &'static [BankKind],
}

impl TransferPolicy
{
    /// The plan the kernel supports for `architecture`.
    ///
    /// ```rust
    /// use ironds_core::accessor::TransferPolicy;
    /// use ironds_core::trace::BankKind;
    /// use ironds_core::types::Architecture;
    ///
    /// let policy = TransferPolicy::for_architecture(Architecture::X86);
    /// assert_eq!(policy.mandatory(), BankKind::GeneralPurpose);
    /// assert_eq!(
    ///     policy.floating_point_chain(),
    ///     &[BankKind::ExtendedFloatingPoint, BankKind::LegacyFloatingPoint]
    /// );
    /// ```
    pub const fn for_architecture(architecture: Architecture) -> Self
    {
        match architecture {
            Architecture::X86 => Self {
                mandatory: BankKind::GeneralPurpose,
                floating_point: &[BankKind::ExtendedFloatingPoint, BankKind::LegacyFloatingPoint],
            },
            Architecture::X86_64 => Self {
                mandatory: BankKind::GeneralPurpose,
                floating_point: &[BankKind::ExtendedFloatingPoint],
            },
        }
    }

    /// Bank whose failure fails the whole transfer.
    pub const fn mandatory(&self) -> BankKind
    {
        self.mandatory
    }

    /// Floating-point banks in priority order.
    pub const fn floating_point_chain(&self) -> &'static [BankKind]
    {
        self.floating_point
    }
}

/// Register transfer for traced entities of one architecture
///
/// Owns the [`TraceStateTable`]: every successful resolution makes sure the
/// entity has a [`TraceState`], and [`release`](Self::release) drops it.
///
/// All operations take `&mut self`; the accessor is meant to be driven from
/// the single thread that is the ptrace tracer.
pub struct CpuStateAccessor<P, R>
{
    primitive: P,
    resolver: R,
    architecture: Architecture,
    policy: TransferPolicy,
    entities: TraceStateTable,
}

impl<P: TracePrimitive, R: EntityResolver> CpuStateAccessor<P, R>
{
    /// Create an accessor for entities of `architecture`.
    pub fn new(primitive: P, resolver: R, architecture: Architecture) -> Self
    {
        Self {
            primitive,
            resolver,
            architecture,
            policy: TransferPolicy::for_architecture(architecture),
            entities: TraceStateTable::new(),
        }
    }

    pub fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    pub fn policy(&self) -> TransferPolicy
    {
        self.policy
    }

    /// Read the complete CPU state of `entity`.
    ///
    /// ## Errors
    ///
    /// - `EntityNotFound`: the entity doesn't resolve to a live thread
    /// - `Primitive` / `PermissionDenied`: the general-purpose fetch failed
    /// - `Codec`: the general-purpose buffer had the wrong size
    ///
    /// Floating-point failures are never reported; see the module docs.
    pub fn read_cpu_state(&mut self, entity: EntityId) -> IrondsResult<CpuState>
    {
        let handle = self.resolve(entity)?;
        self.entities.ensure_initialized(entity);

        let mut state = CpuState::new(self.architecture);
        let mandatory = self.policy.mandatory();
        let raw = self
            .primitive
            .get_register_bank(handle, mandatory)
            .map_err(|err| IrondsError::from_platform(format!("read {mandatory} registers of {entity}"), err))?;
        codec::decode_bank(mandatory, &raw, &mut state)?;

        for &bank in self.policy.floating_point_chain() {
            match self.fetch_bank(handle, bank, &mut state) {
                Ok(()) => {
                    debug!(%entity, %bank, "read floating-point state");
                    return Ok(state);
                }
                Err(err) => debug!(%entity, %bank, "floating-point bank unavailable: {err}"),
            }
        }

        debug!(%entity, "no floating-point bank available, leaving x87/SSE zeroed");
        Ok(state)
    }

    /// Write `state` to `entity`.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: `state` was built for another architecture
    /// - `EntityNotFound`: the entity doesn't resolve to a live thread
    /// - `Primitive` / `PermissionDenied`: the general-purpose store failed
    ///
    /// Floating-point failures are logged and swallowed.
    pub fn write_cpu_state(&mut self, entity: EntityId, state: &CpuState) -> IrondsResult<()>
    {
        if state.architecture() != self.architecture {
            return Err(IrondsError::InvalidArgument(format!(
                "cannot write {} register state to {} entity {entity}",
                state.architecture(),
                self.architecture
            )));
        }

        let handle = self.resolve(entity)?;
        self.entities.ensure_initialized(entity);

        let mandatory = self.policy.mandatory();
        let raw = codec::encode_bank(mandatory, state)?;
        self.primitive
            .set_register_bank(handle, mandatory, &raw)
            .map_err(|err| IrondsError::from_platform(format!("write {mandatory} registers of {entity}"), err))?;

        for &bank in self.policy.floating_point_chain() {
            match self.store_bank(handle, bank, state) {
                Ok(()) => {
                    debug!(%entity, %bank, "wrote floating-point state");
                    return Ok(());
                }
                Err(err) => debug!(%entity, %bank, "floating-point bank rejected: {err}"),
            }
        }

        warn!(%entity, "floating-point state not written: no bank accepted it");
        Ok(())
    }

    /// Forget `entity`, e.g. after its thread exited or on detach.
    ///
    /// Returns the dropped record; releasing an unknown entity does nothing.
    pub fn release(&mut self, entity: EntityId) -> Option<TraceState>
    {
        self.entities.release(entity)
    }

    /// Debug-register bookkeeping for `entity`, if it has been touched.
    pub fn trace_state(&self, entity: EntityId) -> Option<&TraceState>
    {
        self.entities.get(entity)
    }

    pub fn trace_state_mut(&mut self, entity: EntityId) -> Option<&mut TraceState>
    {
        self.entities.get_mut(entity)
    }

    /// Number of entities with a live [`TraceState`].
    pub fn tracked_entities(&self) -> usize
    {
        self.entities.len()
    }

    fn resolve(&self, entity: EntityId) -> IrondsResult<TraceHandle>
    {
        self.resolver.resolve(entity).map_err(|err| {
            debug!(%entity, "entity resolution failed: {err}");
            IrondsError::EntityNotFound(entity)
        })
    }

    fn fetch_bank(&mut self, handle: TraceHandle, bank: BankKind, state: &mut CpuState) -> IrondsResult<()>
    {
        let raw = self
            .primitive
            .get_register_bank(handle, bank)
            .map_err(|err| IrondsError::from_platform(format!("read {bank} registers"), err))?;
        codec::decode_bank(bank, &raw, state)?;
        Ok(())
    }

    fn store_bank(&mut self, handle: TraceHandle, bank: BankKind, state: &CpuState) -> IrondsResult<()>
    {
        let raw = codec::encode_bank(bank, state)?;
        self.primitive
            .set_register_bank(handle, bank, &raw)
            .map_err(|err| IrondsError::from_platform(format!("write {bank} registers"), err))
    }
}
