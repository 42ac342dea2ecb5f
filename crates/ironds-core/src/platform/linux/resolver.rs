//! Entity resolution through procfs.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{IrondsError, IrondsResult};
use crate::trace::{EntityResolver, TraceHandle};
use crate::types::EntityId;

/// Resolves entities by checking `/proc/<pid>/task/<tid>`
///
/// The task directory only exists while the thread is alive and belongs to
/// that process, so a stale or mismatched pid/tid pair fails to resolve.
#[derive(Debug, Clone)]
pub struct ProcfsResolver
{
    root: PathBuf,
}

impl Default for ProcfsResolver
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl ProcfsResolver
{
    pub fn new() -> Self
    {
        Self::with_root("/proc")
    }

    /// Resolve against a procfs mounted somewhere other than `/proc`.
    pub fn with_root(root: impl AsRef<Path>) -> Self
    {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn task_dir(&self, entity: EntityId) -> PathBuf
    {
        self.root
            .join(entity.pid.0.to_string())
            .join("task")
            .join(entity.target_tid().to_string())
    }
}

impl EntityResolver for ProcfsResolver
{
    fn resolve(&self, entity: EntityId) -> IrondsResult<TraceHandle>
    {
        let tid = entity.target_tid();
        let raw = i32::try_from(tid).map_err(|_| IrondsError::EntityNotFound(entity))?;
        if raw <= 0 {
            return Err(IrondsError::EntityNotFound(entity));
        }

        let task = self.task_dir(entity);
        if !task.is_dir() {
            trace!(%entity, path = %task.display(), "no such task");
            return Err(IrondsError::EntityNotFound(entity));
        }

        Ok(TraceHandle(raw))
    }
}
