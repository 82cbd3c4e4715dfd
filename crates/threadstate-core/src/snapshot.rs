//! # Context Snapshots
//!
//! Save the running thread's general-purpose and VFP state into an owned
//! bundle and put it back later (`act_thread_csave` / `act_thread_catt`).
//!
//! ## Lifecycle
//!
//! ```text
//! save(&ctx) ──> ContextSnapshot ──> restore(&mut ctx, Some(snapshot))
//!     │                                   │
//!     └─ Err(AllocationFailed)            └─ storage released, always
//! ```
//!
//! [`ContextSnapshot`] is consumed by value, so it cannot be restored twice.
//! It is `#[must_use]`, and dropping one without restoring it logs a warning.
//!
//! Both operations act on the thread executing the call; the caller hands in
//! that thread's context explicitly.

use std::mem;

use tracing::{debug, warn};

use crate::constants::{ARM_THREAD_STATE_COUNT, ARM_VFP_STATE_COUNT};
use crate::context::ThreadContext;
use crate::error::{StateError, StateResult};
use crate::flavor::StateFlavor;
use crate::transfer::{get_state, set_state};
use crate::types::{FloatingPointState, GeneralPurposeState, StateWords};

/// Words held by one snapshot: general-purpose state followed by VFP state
const SNAPSHOT_WORDS: usize = ARM_THREAD_STATE_COUNT + ARM_VFP_STATE_COUNT;

/// Saved general-purpose and VFP state of one thread
#[must_use = "a context snapshot must be handed back to `restore`"]
#[derive(Debug)]
pub struct ContextSnapshot
{
    words: Vec<u32>,
    pending: bool,
}

impl ContextSnapshot
{
    /// Allocate zeroed snapshot storage without aborting on exhaustion
    fn allocate() -> StateResult<Self>
    {
        let mut words = Vec::new();
        words.try_reserve_exact(SNAPSHOT_WORDS).map_err(|err| {
            debug!(%err, "context snapshot allocation failed");
            StateError::AllocationFailed {
                bytes: SNAPSHOT_WORDS * mem::size_of::<u32>(),
            }
        })?;
        words.resize(SNAPSHOT_WORDS, 0);

        Ok(Self { words, pending: true })
    }

    /// Saved general-purpose state
    pub fn general_state(&self) -> GeneralPurposeState
    {
        GeneralPurposeState::read_fields(&self.words[..ARM_THREAD_STATE_COUNT])
    }

    /// Saved VFP state
    pub fn vfp_state(&self) -> FloatingPointState
    {
        FloatingPointState::read_fields(&self.words[ARM_THREAD_STATE_COUNT..])
    }

    /// Write the snapshot back into `current` and release it
    ///
    /// General-purpose state is restored first; VFP state is restored only if
    /// that succeeded. The snapshot is released either way.
    pub fn restore(mut self, current: &mut ThreadContext)
    {
        let (general, vfp) = self.words.split_at(ARM_THREAD_STATE_COUNT);

        match set_state(current, StateFlavor::GeneralPurpose, general) {
            Ok(()) => {
                if let Err(err) = set_state(current, StateFlavor::FloatingPoint, vfp) {
                    debug!(%err, "snapshot VFP restore failed");
                }
            }
            Err(err) => debug!(%err, "snapshot general-purpose restore failed; skipping VFP"),
        }

        self.pending = false;
        debug!("context snapshot restored");
    }
}

impl Drop for ContextSnapshot
{
    fn drop(&mut self)
    {
        if self.pending {
            warn!("context snapshot dropped without being restored");
        }
    }
}

/// Snapshot the general-purpose and VFP state of the running thread
///
/// `current` must be the context of the thread executing this call.
///
/// ## Errors
///
/// - `AllocationFailed`: no memory for the snapshot; no save occurred and the
///   caller must not attempt a restore
///
/// ## Example
///
/// ```rust
/// use threadstate_core::context::ThreadContext;
/// use threadstate_core::snapshot::{restore, save};
///
/// let mut context = ThreadContext::new();
/// let snapshot = save(&context)?;
/// context.user_state_mut().r[0] = 0xdead;
/// restore(&mut context, Some(snapshot));
/// assert_eq!(context.user_state().r[0], 0);
/// # Ok::<(), threadstate_core::error::StateError>(())
/// ```
pub fn save(current: &ThreadContext) -> StateResult<ContextSnapshot>
{
    let mut snapshot = ContextSnapshot::allocate()?;

    let (general, vfp) = snapshot.words.split_at_mut(ARM_THREAD_STATE_COUNT);
    let captured = get_state(current, StateFlavor::GeneralPurpose, general)
        .and_then(|_| get_state(current, StateFlavor::FloatingPoint, vfp));

    if let Err(err) = captured {
        // Nothing to restore from a half-filled bundle.
        snapshot.pending = false;
        return Err(err);
    }

    debug!("context snapshot saved");
    Ok(snapshot)
}

/// Restore a snapshot taken by [`save`] into the running thread
///
/// `None` is a no-op, matching a save that was never taken.
pub fn restore(current: &mut ThreadContext, snapshot: Option<ContextSnapshot>)
{
    if let Some(snapshot) = snapshot {
        snapshot.restore(current);
    }
}
