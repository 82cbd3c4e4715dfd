//! # Thread Machine Context
//!
//! The per-thread save area: general-purpose, VFP and exception state.
//!
//! ## Redirectable general-purpose state
//!
//! A context always owns its general-purpose storage (`user_regs`), but the
//! state that is *authoritative* for reads can be redirected elsewhere while a
//! fork or initial-thread setup is in progress. The redirection is a tagged
//! value rather than a pointer:
//!
//! - [`SavedStateRef::Owned`]: the context's own `user_regs` are active
//! - [`SavedStateRef::Redirected`]: a shared [`SavedStateCell`] is active
//!
//! The cell is reference counted, so the redirected storage always lives at
//! least as long as the context pointing at it.
//!
//! Reads (`get_state`, `thread_set_parent`) go through the active reference.
//! Writes from outside (`set_state`, the stack and entry point setters) land in
//! `user_regs`.

use std::sync::Arc;

use spin::Mutex;
use tracing::{error, trace};

use crate::types::{ExceptionState, FloatingPointState, GeneralPurposeState};

/// Shared general-purpose storage a context can be redirected to
///
/// Cloning the cell shares the storage; it is freed when the last holder drops.
#[derive(Debug, Clone)]
pub struct SavedStateCell(Arc<Mutex<GeneralPurposeState>>);

impl SavedStateCell
{
    /// Allocate a cell holding `state`
    pub fn new(state: GeneralPurposeState) -> Self
    {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Copy the current state out of the cell
    pub fn load(&self) -> GeneralPurposeState
    {
        *self.0.lock()
    }

    /// Replace the state held by the cell
    pub fn store(&self, state: GeneralPurposeState)
    {
        *self.0.lock() = state;
    }

    /// Mutate the state in place
    pub fn update<R>(&self, f: impl FnOnce(&mut GeneralPurposeState) -> R) -> R
    {
        f(&mut self.0.lock())
    }

    /// `true` if both cells share the same storage
    pub fn ptr_eq(&self, other: &SavedStateCell) -> bool
    {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for SavedStateCell
{
    fn default() -> Self
    {
        Self::new(GeneralPurposeState::ZERO)
    }
}

/// Which general-purpose storage is authoritative for a context
#[derive(Debug, Clone, Default)]
pub enum SavedStateRef
{
    /// The context's own inline storage
    #[default]
    Owned,
    /// Storage owned elsewhere, borrowed during fork or initial-thread setup
    Redirected(SavedStateCell),
}

/// Saved machine state of one thread
#[derive(Debug, Clone, Default)]
pub struct ThreadContext
{
    user_regs: GeneralPurposeState,
    active: SavedStateRef,
    vfp: FloatingPointState,
    exception: ExceptionState,
}

impl ThreadContext
{
    /// Create a zeroed, self-referencing context
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create a self-referencing context with the given general-purpose state
    pub fn with_user_state(state: GeneralPurposeState) -> Self
    {
        Self {
            user_regs: state,
            ..Self::default()
        }
    }

    /// Copy of the currently authoritative general-purpose state
    pub fn active_state(&self) -> GeneralPurposeState
    {
        match &self.active {
            SavedStateRef::Owned => self.user_regs,
            SavedStateRef::Redirected(cell) => cell.load(),
        }
    }

    /// Mutate the currently authoritative general-purpose state
    pub fn update_active<R>(&mut self, f: impl FnOnce(&mut GeneralPurposeState) -> R) -> R
    {
        match &self.active {
            SavedStateRef::Owned => f(&mut self.user_regs),
            SavedStateRef::Redirected(cell) => cell.update(f),
        }
    }

    /// The context's own general-purpose storage
    pub fn user_state(&self) -> &GeneralPurposeState
    {
        &self.user_regs
    }

    /// The context's own general-purpose storage, mutably
    pub fn user_state_mut(&mut self) -> &mut GeneralPurposeState
    {
        &mut self.user_regs
    }

    /// VFP state
    pub fn vfp_state(&self) -> &FloatingPointState
    {
        &self.vfp
    }

    /// VFP state, mutably
    pub fn vfp_state_mut(&mut self) -> &mut FloatingPointState
    {
        &mut self.vfp
    }

    /// Exception state of the last fault
    pub fn exception_state(&self) -> &ExceptionState
    {
        &self.exception
    }

    /// Exception state, mutably
    pub fn exception_state_mut(&mut self) -> &mut ExceptionState
    {
        &mut self.exception
    }

    /// Record a fault taken by this thread
    ///
    /// Called from the trap path; the previous fault, if any, is overwritten.
    pub fn record_fault(&mut self, fault: ExceptionState)
    {
        trace!(fsr = fault.fsr, far = fault.far, exception = fault.exception, "recording fault");
        self.exception = fault;
    }

    /// Current general-purpose reference
    pub fn saved_state_ref(&self) -> &SavedStateRef
    {
        &self.active
    }

    /// Make `cell` authoritative for general-purpose reads
    ///
    /// Returns the previous redirection target, if any.
    pub fn redirect(&mut self, cell: SavedStateCell) -> Option<SavedStateCell>
    {
        match std::mem::replace(&mut self.active, SavedStateRef::Redirected(cell)) {
            SavedStateRef::Owned => None,
            SavedStateRef::Redirected(previous) => Some(previous),
        }
    }

    /// Point the general-purpose reference back at the context's own storage
    ///
    /// Returns the redirection target that was dropped, if any.
    pub fn unredirect(&mut self) -> Option<SavedStateCell>
    {
        match std::mem::take(&mut self.active) {
            SavedStateRef::Owned => None,
            SavedStateRef::Redirected(previous) => Some(previous),
        }
    }

    /// `true` if the context's own storage is authoritative
    pub fn is_self_referencing(&self) -> bool
    {
        matches!(self.active, SavedStateRef::Owned)
    }

    /// Halt `operation` if the context is redirected
    ///
    /// A redirected context here means an upstream collaborator left fork or
    /// setup state behind; continuing would write registers nobody reads.
    ///
    /// ## Panics
    ///
    /// Panics if the general-purpose reference is redirected.
    pub(crate) fn assert_self_referencing(&self, operation: &str)
    {
        if !self.is_self_referencing() {
            error!(operation, "general-purpose state is redirected; refusing to continue");
            panic!("{operation}: thread context is not self-referencing");
        }
    }
}
