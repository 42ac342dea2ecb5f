//! RAII ptrace attachment.

use nix::errno::Errno;
use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use super::ProcfsResolver;
use crate::error::{IrondsError, IrondsResult};
use crate::trace::EntityResolver;
use crate::types::{EntityId, ProcessId};

/// RAII guard that attaches to a thread and detaches when dropped.
///
/// ptrace traces threads, not processes. Attaching makes the calling thread
/// the tracer of the one kernel thread the entity names (the main thread for
/// [`attach`](Self::attach)) and waits until it reports its attach stop.
/// While the guard is alive that thread stays stopped, which is what register
/// transfer needs. Other threads of the process keep running.
///
/// ## Example
///
/// ```rust,no_run
/// use ironds_core::platform::linux::AttachGuard;
/// use ironds_core::types::{EntityId, ProcessId, ThreadId};
///
/// let guard = AttachGuard::attach(ProcessId(12345))?;
/// println!("stopped with {}", guard.stop_signal().as_str());
/// guard.detach()?;
///
/// let worker = AttachGuard::attach_entity(EntityId::thread(ProcessId(12345), ThreadId(12347)))?;
/// worker.detach()?;
/// # Ok::<(), ironds_core::error::IrondsError>(())
/// ```
#[derive(Debug)]
pub struct AttachGuard
{
    entity: EntityId,
    tid: Pid,
    stop_signal: Signal,
    active: bool,
}

impl AttachGuard
{
    /// Attach to the main thread of `pid` and wait for it to stop.
    ///
    /// ## Errors
    ///
    /// See [`attach_entity`](Self::attach_entity).
    pub fn attach(pid: ProcessId) -> IrondsResult<Self>
    {
        Self::attach_entity(EntityId::process(pid))
    }

    /// Attach to the thread `entity` names and wait for it to stop.
    ///
    /// The thread must belong to the entity's process according to
    /// `/proc/<pid>/task`; nothing is attached otherwise.
    ///
    /// ## Errors
    ///
    /// - `EntityNotFound`: no such thread in that process, or it exited
    ///   before it stopped
    /// - `PermissionDenied`: YAMA `ptrace_scope`, missing `CAP_SYS_PTRACE`, or
    ///   the thread is already traced
    /// - `Primitive`: any other `ptrace`/`waitpid` failure
    pub fn attach_entity(entity: EntityId) -> IrondsResult<Self>
    {
        Self::attach_with(entity, &ProcfsResolver::new())
    }

    /// Like [`attach_entity`](Self::attach_entity), resolving through `resolver`.
    pub fn attach_with<R: EntityResolver>(entity: EntityId, resolver: &R) -> IrondsResult<Self>
    {
        let handle = resolver.resolve(entity)?;
        let tid = Pid::from_raw(handle.0);

        ptrace::attach(tid).map_err(|errno| IrondsError::from_platform(format!("attach to {entity}"), errno.into()))?;

        let mut guard = Self {
            entity,
            tid,
            stop_signal: Signal::SIGSTOP,
            active: true,
        };
        guard.stop_signal = guard.wait_for_stop()?;

        info!("Attached to {entity} (tid {tid}), stopped by {}", guard.stop_signal.as_str());
        Ok(guard)
    }

    /// The attached entity.
    pub fn entity(&self) -> EntityId
    {
        self.entity
    }

    /// Process owning the attached thread.
    pub fn pid(&self) -> ProcessId
    {
        self.entity.pid
    }

    /// Signal that reported the attach stop (normally `SIGSTOP`).
    pub fn stop_signal(&self) -> Signal
    {
        self.stop_signal
    }

    /// Detach now, reporting failure instead of logging it.
    pub fn detach(mut self) -> IrondsResult<()>
    {
        self.active = false;
        detach_thread(self.entity, self.tid)
    }

    fn wait_for_stop(&mut self) -> IrondsResult<Signal>
    {
        loop {
            // __WALL: the target may be a non-leader thread.
            match waitpid(self.tid, Some(WaitPidFlag::__WALL)) {
                Ok(WaitStatus::Stopped(_, signal)) => return Ok(signal),
                Ok(WaitStatus::Exited(..) | WaitStatus::Signaled(..)) => {
                    debug!("{} exited before the attach stop", self.entity);
                    self.active = false;
                    return Err(IrondsError::EntityNotFound(self.entity));
                }
                Ok(status) => debug!("Ignoring {status:?} while attaching to {}", self.entity),
                Err(Errno::EINTR) => {}
                Err(errno) => {
                    return Err(IrondsError::from_platform(
                        format!("wait for {}", self.entity),
                        errno.into(),
                    ));
                }
            }
        }
    }
}

impl Drop for AttachGuard
{
    fn drop(&mut self)
    {
        if self.active {
            if let Err(err) = detach_thread(self.entity, self.tid) {
                warn!("Failed to detach from {}: {err}", self.entity);
            }
        }
    }
}

fn detach_thread(entity: EntityId, tid: Pid) -> IrondsResult<()>
{
    ptrace::detach(tid, None).map_err(|errno| IrondsError::from_platform(format!("detach from {entity}"), errno.into()))?;

    debug!("Detached from {entity}");
    Ok(())
}
