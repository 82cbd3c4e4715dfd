//! # Ancillary Accessors
//!
//! Narrow register accessors used by exec, fork and the work-queue (thread
//! pool) machinery.
//!
//! - **Not-yet-running state**: [`thread_userstack`], [`thread_entrypoint`]
//!   read SP/PC out of a raw general-purpose buffer, falling back to defaults
//! - **Live context setters**: [`thread_setuserstack`],
//!   [`thread_adjuserstack`], [`thread_setentrypoint`] write the context's own
//!   storage directly. These are kernel-internal call sites, so nothing is
//!   sanitized
//! - **Fork linkage**: [`thread_set_parent`], [`thread_set_child`] produce the
//!   two return values of a process duplication
//! - **Work-queue bring-up**: [`thread_set_wq_state`] installs the initial
//!   user-mode state of a pool worker, possibly from another thread

use tracing::{debug, trace};

use crate::constants::{RawFlavor, ARM_PC_INDEX, ARM_SP_INDEX, WQ_ARGUMENT_REGISTER_COUNT};
use crate::context::ThreadContext;
use crate::error::{StateError, StateResult};
use crate::flavor::StateFlavor;
use crate::guards::{InterruptControl, Thread};
use crate::sanitize::sanitize_cpsr;
use crate::types::{Address, GeneralPurposeState, StateWords, ThreadId};

/// Validate that `state` is a complete general-purpose buffer for `flavor`
fn general_purpose_words(flavor: RawFlavor, state: &[u32]) -> StateResult<&[u32]>
{
    match StateFlavor::try_from(flavor)? {
        StateFlavor::GeneralPurpose => {
            StateFlavor::GeneralPurpose.check_capacity(state.len())?;
            Ok(state)
        }
        other => {
            debug!(flavor = %other, "only general-purpose state carries SP/PC");
            Err(StateError::UnsupportedFlavor(other))
        }
    }
}

/// User stack pointer of a not-yet-running thread state
///
/// Returns the SP word of `state`, or [`Address::USER_STACK_TOP`] if it is zero.
///
/// ## Errors
///
/// - `UnknownFlavor`: `flavor` is not in the catalog
/// - `UnsupportedFlavor`: `flavor` is not the general-purpose flavor
/// - `BufferTooSmall`: `state` is shorter than 17 words
///
/// ## Example
///
/// ```rust
/// use threadstate_core::ancillary::thread_userstack;
/// use threadstate_core::constants::ARM_THREAD_STATE;
/// use threadstate_core::types::Address;
///
/// let mut state = [0u32; 17];
/// assert_eq!(thread_userstack(ARM_THREAD_STATE, &state)?, Address::USER_STACK_TOP);
///
/// state[13] = 0x7000_0000;
/// assert_eq!(thread_userstack(ARM_THREAD_STATE, &state)?, Address::from(0x7000_0000));
/// # Ok::<(), threadstate_core::error::StateError>(())
/// ```
pub fn thread_userstack(flavor: RawFlavor, state: &[u32]) -> StateResult<Address>
{
    let words = general_purpose_words(flavor, state)?;
    Ok(Address::from(words[ARM_SP_INDEX]).or(Address::USER_STACK_TOP))
}

/// Entry point of a not-yet-running thread state
///
/// Returns the PC word of `state`, or [`Address::MIN_USER`] if it is zero.
///
/// ## Errors
///
/// Same as [`thread_userstack`].
pub fn thread_entrypoint(flavor: RawFlavor, state: &[u32]) -> StateResult<Address>
{
    let words = general_purpose_words(flavor, state)?;
    Ok(Address::from(words[ARM_PC_INDEX]).or(Address::MIN_USER))
}

/// Default top of the user stack
pub const fn thread_userstackdefault() -> Address
{
    Address::USER_STACK_TOP
}

/// Set the user stack pointer of a live context
pub fn thread_setuserstack(context: &mut ThreadContext, user_stack: Address)
{
    context.user_state_mut().sp = user_stack.value();
}

/// Move the user stack pointer of a live context by `adjust` bytes
///
/// Returns the new stack pointer. The arithmetic wraps like the hardware SP.
pub fn thread_adjuserstack(context: &mut ThreadContext, adjust: i32) -> Address
{
    let state = context.user_state_mut();
    let sp = Address::from(state.sp).offset(adjust);
    state.sp = sp.value();
    sp
}

/// Set the user program counter of a live context
pub fn thread_setentrypoint(context: &mut ThreadContext, entry: Address)
{
    context.user_state_mut().pc = entry.value();
}

/// Produce the parent-side return of a process duplication
///
/// Writes the child's process id into R0 and 0 into R1 of the parent's
/// *active* general-purpose state, which may be redirected.
pub fn thread_set_parent(parent: &mut ThreadContext, child_pid: u32)
{
    parent.update_active(|state| {
        state.r[0] = child_pid;
        state.r[1] = 0;
    });
    trace!(child_pid, "fork parent linkage set");
}

/// Produce the child-side return of a process duplication
///
/// Writes `pid` into R0 and 1 into R1 of the child's own general-purpose state.
///
/// ## Panics
///
/// Panics if the child's general-purpose reference is redirected: a freshly
/// duplicated thread always owns its state, so this indicates a bug upstream.
pub fn thread_set_child(child: &mut ThreadContext, pid: u32)
{
    child.assert_self_referencing("thread_set_child");
    child.update_active(|state| {
        state.r[0] = pid;
        state.r[1] = 1;
    });
    trace!(pid, "fork child linkage set");
}

/// Install the initial user-mode state of a work-queue (thread pool) worker
///
/// `state` is a general-purpose buffer. The target's own storage is zeroed,
/// then R0-R5, SP, LR, PC and the sanitized CPSR are copied in. When `current`
/// is not `target` the write happens under [`Thread::exclusive`].
///
/// ## Errors
///
/// - `BufferTooSmall`: `state` is shorter than 17 words; nothing is locked or written
///
/// ## Panics
///
/// Panics if the target's general-purpose reference is redirected. The lock
/// and interrupt level are released during unwinding.
pub fn thread_set_wq_state(
    target: &Thread,
    current: ThreadId,
    interrupts: &dyn InterruptControl,
    state: &[u32],
) -> StateResult<()>
{
    let incoming = GeneralPurposeState::from_words(state)?;

    let mut context = target.exclusive(current, interrupts);
    context.assert_self_referencing("thread_set_wq_state");

    let saved = context.user_state_mut();
    *saved = GeneralPurposeState::ZERO;
    saved.r[..WQ_ARGUMENT_REGISTER_COUNT].copy_from_slice(&incoming.r[..WQ_ARGUMENT_REGISTER_COUNT]);
    saved.sp = incoming.sp;
    saved.lr = incoming.lr;
    saved.pc = incoming.pc;
    saved.cpsr = sanitize_cpsr(incoming.cpsr);

    debug!(thread = %target.id(), pc = saved.pc, sp = saved.sp, "work-queue initial state installed");
    Ok(())
}
