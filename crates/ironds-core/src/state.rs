//! Per-entity trace bookkeeping.
//!
//! Every traced entity gets a small [`TraceState`] record the first time its
//! registers are touched. The hardware breakpoint manager keeps its slot
//! counters there. The record lives until the entity is released (thread exit
//! or detach).

use std::collections::HashMap;

use tracing::trace;

use crate::types::EntityId;

/// Hardware debug-register usage for one entity.
///
/// All counters start at zero. This crate never changes them; they belong to
/// whoever programs the debug registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceState
{
    /// Hardware breakpoints currently installed.
    pub breakpoint_count: u8,
    /// Hardware watchpoints currently installed.
    pub watchpoint_count: u8,
    /// Largest watch length the hardware accepted for this entity.
    pub max_watchpoint_size: u8,
}

/// Table of [`TraceState`] records keyed by entity.
///
/// Keys are [`EntityId::canonical`], so every spelling of the same kernel
/// thread shares one record.
///
/// Not synchronized; the owner is expected to hold it behind `&mut`.
#[derive(Debug, Default)]
pub struct TraceStateTable
{
    entries: HashMap<EntityId, TraceState>,
}

impl TraceStateTable
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Return the entity's record, creating a zeroed one if needed.
    ///
    /// Calling this again for the same entity returns the existing record
    /// unchanged.
    ///
    /// ```rust
    /// use ironds_core::state::TraceStateTable;
    /// use ironds_core::types::{EntityId, ProcessId};
    ///
    /// let mut table = TraceStateTable::new();
    /// let entity = EntityId::process(ProcessId(42));
    /// table.ensure_initialized(entity).breakpoint_count = 2;
    /// assert_eq!(table.ensure_initialized(entity).breakpoint_count, 2);
    /// ```
    pub fn ensure_initialized(&mut self, entity: EntityId) -> &mut TraceState
    {
        let entity = entity.canonical();
        self.entries.entry(entity).or_insert_with(|| {
            trace!(%entity, "creating trace state");
            TraceState::default()
        })
    }

    /// Drop the entity's record. Unknown entities are ignored.
    pub fn release(&mut self, entity: EntityId) -> Option<TraceState>
    {
        let entity = entity.canonical();
        let removed = self.entries.remove(&entity);
        if removed.is_some() {
            trace!(%entity, "released trace state");
        }
        removed
    }

    pub fn get(&self, entity: EntityId) -> Option<&TraceState>
    {
        self.entries.get(&entity.canonical())
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut TraceState>
    {
        self.entries.get_mut(&entity.canonical())
    }

    pub fn contains(&self, entity: EntityId) -> bool
    {
        self.entries.contains_key(&entity.canonical())
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{ProcessId, ThreadId};

    #[test]
    fn test_ensure_creates_zeroed_record()
    {
        let mut table = TraceStateTable::new();
        let entity = EntityId::thread(ProcessId(10), ThreadId(11));

        assert!(table.is_empty());
        assert_eq!(*table.ensure_initialized(entity), TraceState::default());
        assert!(table.contains(entity));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ensure_twice_keeps_counters()
    {
        let mut table = TraceStateTable::new();
        let entity = EntityId::process(ProcessId(10));

        let state = table.ensure_initialized(entity);
        state.watchpoint_count = 3;
        state.max_watchpoint_size = 8;

        let again = table.ensure_initialized(entity);
        assert_eq!(again.watchpoint_count, 3);
        assert_eq!(again.max_watchpoint_size, 8);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_release_then_ensure_starts_fresh()
    {
        let mut table = TraceStateTable::new();
        let entity = EntityId::process(ProcessId(10));
        table.ensure_initialized(entity).breakpoint_count = 1;

        let released = table.release(entity);
        assert_eq!(released.map(|s| s.breakpoint_count), Some(1));
        assert!(!table.contains(entity));
        assert_eq!(table.ensure_initialized(entity).breakpoint_count, 0);
    }

    #[test]
    fn test_release_unknown_is_noop()
    {
        let mut table = TraceStateTable::new();
        table.ensure_initialized(EntityId::process(ProcessId(1)));
        assert_eq!(table.release(EntityId::process(ProcessId(2))), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_process_and_thread_entities_are_distinct()
    {
        let mut table = TraceStateTable::new();
        table.ensure_initialized(EntityId::process(ProcessId(5))).breakpoint_count = 1;
        table.ensure_initialized(EntityId::thread(ProcessId(5), ThreadId(6)));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table
                .get(EntityId::thread(ProcessId(5), ThreadId(6)))
                .map(|s| s.breakpoint_count),
            Some(0)
        );
    }

    #[test]
    fn test_main_thread_spellings_share_one_record()
    {
        let mut table = TraceStateTable::new();
        let pid = ProcessId(500);
        table.ensure_initialized(EntityId::process(pid)).breakpoint_count = 3;

        let by_tid = EntityId::thread(pid, ThreadId(500));
        let by_zero = EntityId::thread(pid, ThreadId(0));
        assert_eq!(table.ensure_initialized(by_tid).breakpoint_count, 3);
        assert_eq!(table.get(by_zero).map(|s| s.breakpoint_count), Some(3));
        assert_eq!(table.len(), 1);

        assert!(table.release(by_zero).is_some());
        assert!(!table.contains(EntityId::process(pid)));
        assert!(table.is_empty());
    }
}
