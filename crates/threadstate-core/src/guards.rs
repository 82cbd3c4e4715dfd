//! # Scoped Exclusive Access to Thread Contexts
//!
//! RAII guards for mutating a context that may belong to a thread running on
//! another processor.
//!
//! ## Discipline
//!
//! A cross-thread mutation must:
//!
//! 1. raise the local processor to the scheduler interrupt level (`splsched`)
//! 2. take the target thread's scheduling lock
//! 3. mutate
//! 4. drop the lock
//! 5. restore the previous interrupt level (`splx`)
//!
//! [`ExclusiveContext`] performs 1-2 on construction and 4-5 on drop, in that
//! order, on every exit path including early `?` returns and panics.
//!
//! A thread acting on its own context skips the level raise; the lock is still
//! taken but is uncontended, since no other processor addresses a running
//! thread's save area.
//!
//! ## Example
//!
//! ```rust
//! use threadstate_core::guards::{SoftInterruptLevel, SplLevel, Thread};
//! use threadstate_core::types::ThreadId;
//!
//! let interrupts = SoftInterruptLevel::new();
//! let worker = Thread::new(ThreadId::from(2));
//! {
//!     let mut context = worker.exclusive(ThreadId::from(1), &interrupts);
//!     assert_eq!(interrupts.current(), SplLevel::SCHED);
//!     context.user_state_mut().pc = 0x8000;
//! }
//! // Lock released and level restored
//! assert_eq!(interrupts.current(), SplLevel::BASE);
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

use spin::{Mutex, MutexGuard};
use tracing::trace;

use crate::context::ThreadContext;
use crate::types::ThreadId;

/// Processor interrupt priority level (`spl_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SplLevel(pub u32);

impl SplLevel
{
    /// All interrupts enabled
    pub const BASE: Self = SplLevel(0);

    /// Scheduler level: preemption and device interrupts held off
    pub const SCHED: Self = SplLevel(7);
}

impl fmt::Display for SplLevel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "spl{}", self.0)
    }
}

/// Interrupt priority control of the local processor
///
/// Implemented by the platform layer. The state layer only ever raises to
/// [`SplLevel::SCHED`] and restores what it saw.
pub trait InterruptControl
{
    /// Raise to the scheduler level, returning the previous level (`splsched`)
    fn raise_to_sched(&self) -> SplLevel;

    /// Restore a level returned by [`raise_to_sched`](Self::raise_to_sched) (`splx`)
    fn restore(&self, previous: SplLevel);
}

/// Software model of a processor's interrupt level
///
/// Used on hosted targets and in tests. Raising never lowers the level.
#[derive(Debug, Default)]
pub struct SoftInterruptLevel
{
    level: AtomicU32,
}

impl SoftInterruptLevel
{
    /// Start at [`SplLevel::BASE`]
    pub const fn new() -> Self
    {
        Self {
            level: AtomicU32::new(SplLevel::BASE.0),
        }
    }

    /// Current level
    pub fn current(&self) -> SplLevel
    {
        SplLevel(self.level.load(Ordering::SeqCst))
    }
}

impl InterruptControl for SoftInterruptLevel
{
    fn raise_to_sched(&self) -> SplLevel
    {
        SplLevel(self.level.fetch_max(SplLevel::SCHED.0, Ordering::SeqCst))
    }

    fn restore(&self, previous: SplLevel)
    {
        self.level.store(previous.0, Ordering::SeqCst);
    }
}

/// RAII guard holding the local processor at [`SplLevel::SCHED`]
///
/// The previous level is restored on drop.
#[must_use = "if unused, the interrupt level is restored immediately"]
pub struct SplGuard<'a>
{
    interrupts: &'a dyn InterruptControl,
    previous: SplLevel,
}

impl<'a> SplGuard<'a>
{
    /// Raise to the scheduler level
    pub fn raise(interrupts: &'a dyn InterruptControl) -> Self
    {
        let previous = interrupts.raise_to_sched();
        Self { interrupts, previous }
    }

    /// Level that will be restored on drop
    pub fn previous(&self) -> SplLevel
    {
        self.previous
    }
}

impl Drop for SplGuard<'_>
{
    fn drop(&mut self)
    {
        self.interrupts.restore(self.previous);
    }
}

/// Kernel thread as seen by the state layer
///
/// Owns the thread's machine context behind its scheduling lock.
#[derive(Debug)]
pub struct Thread
{
    id: ThreadId,
    machine: Mutex<ThreadContext>,
}

impl Thread
{
    /// Create a thread with a zeroed, self-referencing context
    pub fn new(id: ThreadId) -> Self
    {
        Self::with_context(id, ThreadContext::new())
    }

    /// Create a thread owning `context`
    pub fn with_context(id: ThreadId, context: ThreadContext) -> Self
    {
        Self {
            id,
            machine: Mutex::new(context),
        }
    }

    /// Thread identifier
    pub fn id(&self) -> ThreadId
    {
        self.id
    }

    /// `true` while some caller holds the scheduling lock
    pub fn is_locked(&self) -> bool
    {
        self.machine.is_locked()
    }

    /// Acquire exclusive access to this thread's context on behalf of `current`
    ///
    /// When `current` is another thread the local interrupt level is raised to
    /// [`SplLevel::SCHED`] before the scheduling lock is taken. Both are undone
    /// when the returned guard drops.
    pub fn exclusive<'a>(&'a self, current: ThreadId, interrupts: &'a dyn InterruptControl) -> ExclusiveContext<'a>
    {
        let spl = (current != self.id).then(|| SplGuard::raise(interrupts));
        let context = self.machine.lock();
        trace!(target_thread = %self.id, caller = %current, cross_thread = spl.is_some(), "thread context locked");

        ExclusiveContext {
            context,
            spl,
            thread: self.id,
        }
    }

    /// Run `f` with exclusive access to this thread's context
    ///
    /// See [`exclusive`](Self::exclusive).
    pub fn with_exclusive<R>(
        &self,
        current: ThreadId,
        interrupts: &dyn InterruptControl,
        f: impl FnOnce(&mut ThreadContext) -> R,
    ) -> R
    {
        let mut context = self.exclusive(current, interrupts);
        f(&mut context)
    }

    /// Consume the thread, returning its context
    pub fn into_context(self) -> ThreadContext
    {
        self.machine.into_inner()
    }
}

/// Exclusive access to a thread's context
///
/// Field order matters: the lock guard drops before the interrupt level guard.
pub struct ExclusiveContext<'a>
{
    context: MutexGuard<'a, ThreadContext>,
    spl: Option<SplGuard<'a>>,
    thread: ThreadId,
}

impl ExclusiveContext<'_>
{
    /// Thread whose context is held
    pub fn thread(&self) -> ThreadId
    {
        self.thread
    }

    /// `true` if the interrupt level was raised for a cross-thread caller
    pub fn is_cross_thread(&self) -> bool
    {
        self.spl.is_some()
    }
}

impl Deref for ExclusiveContext<'_>
{
    type Target = ThreadContext;

    fn deref(&self) -> &ThreadContext
    {
        &self.context
    }
}

impl DerefMut for ExclusiveContext<'_>
{
    fn deref_mut(&mut self) -> &mut ThreadContext
    {
        &mut self.context
    }
}

impl Drop for ExclusiveContext<'_>
{
    fn drop(&mut self)
    {
        trace!(target_thread = %self.thread, "releasing thread context");
    }
}
