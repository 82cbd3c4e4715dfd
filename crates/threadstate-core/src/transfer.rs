//! # State Transfer
//!
//! Flavor-specific copies between a caller's word buffer and a thread's save
//! area (`machine_thread_get_state` / `machine_thread_set_state`).
//!
//! ## Ordering
//!
//! 1. Raw flavor code is resolved against the catalog
//! 2. Buffer size is validated against the flavor's required count
//! 3. Only then is any field read or written
//!
//! A failure in steps 1 or 2 leaves both the buffer and the context untouched.
//!
//! ## Flavors
//!
//! | Flavor            | Get                           | Set                              |
//! |-------------------|-------------------------------|----------------------------------|
//! | list flavors      | write flavor codes            | rejected                         |
//! | `GeneralPurpose`  | copy from active storage      | copy into own storage, sanitized |
//! | `FloatingPoint`   | copy                          | copy                             |
//! | `Exception`       | copy                          | copy                             |
//! | `Debug`           | no-op, reports 64 words       | no-op                            |

use tracing::{debug, trace};

use crate::constants::RawFlavor;
use crate::context::ThreadContext;
use crate::error::{StateError, StateResult};
use crate::flavor::{write_flavor_list, StateFlavor};
use crate::sanitize::sanitize_cpsr;
use crate::types::{ExceptionState, FloatingPointState, GeneralPurposeState, StateWords};

/// Read a thread's state for a raw flavor code
///
/// Resolves `flavor` and forwards to [`get_state`].
///
/// ## Errors
///
/// - `UnknownFlavor`: `flavor` is not in the catalog
/// - `BufferTooSmall`: `out` is shorter than the flavor requires
pub fn get_state_raw(context: &ThreadContext, flavor: RawFlavor, out: &mut [u32]) -> StateResult<usize>
{
    get_state(context, StateFlavor::try_from(flavor)?, out)
}

/// Write a thread's state for a raw flavor code
///
/// Resolves `flavor` and forwards to [`set_state`].
///
/// ## Errors
///
/// - `UnknownFlavor`: `flavor` is not in the catalog
/// - `UnsupportedFlavor`: `flavor` is a list pseudo-flavor
/// - `BufferTooSmall`: `words` is shorter than the flavor requires
pub fn set_state_raw(context: &mut ThreadContext, flavor: RawFlavor, words: &[u32]) -> StateResult<()>
{
    set_state(context, StateFlavor::try_from(flavor)?, words)
}

/// Copy a thread's saved state into `out`
///
/// The capacity is `out.len()`. On success returns the number of words the
/// flavor occupies (the exact required count, or the number of list entries).
/// This is a pure read: the context is never modified.
///
/// General-purpose state is read from the *active* storage, which may be
/// redirected during fork or initial-thread setup.
///
/// ## Errors
///
/// - `BufferTooSmall`: `out` is shorter than the flavor requires; `out` is untouched
///
/// ## Example
///
/// ```rust
/// use threadstate_core::context::ThreadContext;
/// use threadstate_core::flavor::StateFlavor;
/// use threadstate_core::transfer::get_state;
///
/// let context = ThreadContext::new();
/// let mut words = [0u32; 17];
/// assert_eq!(get_state(&context, StateFlavor::GeneralPurpose, &mut words), Ok(17));
/// ```
pub fn get_state(context: &ThreadContext, flavor: StateFlavor, out: &mut [u32]) -> StateResult<usize>
{
    flavor.check_capacity(out.len())?;

    let written = match flavor {
        StateFlavor::FlavorList | StateFlavor::FlavorListExtended => write_flavor_list(flavor, out)?,
        StateFlavor::GeneralPurpose => context.active_state().write_words(out)?,
        StateFlavor::FloatingPoint => context.vfp_state().write_words(out)?,
        StateFlavor::Exception => context.exception_state().write_words(out)?,
        // No debug registers are modeled.
        StateFlavor::Debug => flavor.required_count(),
    };

    trace!(%flavor, written, "thread state read");
    Ok(written)
}

/// Copy `words` into a thread's saved state
///
/// The capacity is `words.len()`. General-purpose state is written into the
/// context's own storage with the CPSR passed through
/// [`sanitize_cpsr`]; no other field is altered on the way in.
///
/// ## Errors
///
/// - `UnsupportedFlavor`: `flavor` is a list pseudo-flavor
/// - `BufferTooSmall`: `words` is shorter than the flavor requires
///
/// Either way the context is unchanged.
///
/// ## Example
///
/// ```rust
/// use threadstate_core::context::ThreadContext;
/// use threadstate_core::flavor::StateFlavor;
/// use threadstate_core::transfer::set_state;
///
/// let mut context = ThreadContext::new();
/// let mut words = [0u32; 17];
/// words[15] = 0x8000; // pc
/// words[16] = 0x1d3; // SVC mode, IRQ/FIQ masked
/// set_state(&mut context, StateFlavor::GeneralPurpose, &words)?;
///
/// assert_eq!(context.user_state().pc, 0x8000);
/// assert_eq!(context.user_state().cpsr, 0x110);
/// # Ok::<(), threadstate_core::error::StateError>(())
/// ```
pub fn set_state(context: &mut ThreadContext, flavor: StateFlavor, words: &[u32]) -> StateResult<()>
{
    if flavor.is_list() {
        debug!(%flavor, "list flavors cannot be written");
        return Err(StateError::UnsupportedFlavor(flavor));
    }
    flavor.check_capacity(words.len())?;

    match flavor {
        StateFlavor::GeneralPurpose => {
            let mut incoming = GeneralPurposeState::from_words(words)?;
            incoming.cpsr = sanitize_cpsr(incoming.cpsr);
            *context.user_state_mut() = incoming;
        }
        StateFlavor::FloatingPoint => {
            *context.vfp_state_mut() = FloatingPointState::from_words(words)?;
        }
        StateFlavor::Exception => {
            *context.exception_state_mut() = ExceptionState::from_words(words)?;
        }
        StateFlavor::Debug => {}
        StateFlavor::FlavorList | StateFlavor::FlavorListExtended => {
            return Err(StateError::UnsupportedFlavor(flavor));
        }
    }

    trace!(%flavor, "thread state written");
    Ok(())
}

/// Typed read of a concrete flavor
///
/// ```rust
/// use threadstate_core::context::ThreadContext;
/// use threadstate_core::transfer::read_state;
/// use threadstate_core::types::ExceptionState;
///
/// let context = ThreadContext::new();
/// let fault: ExceptionState = read_state(&context)?;
/// assert_eq!(fault, ExceptionState::default());
/// # Ok::<(), threadstate_core::error::StateError>(())
/// ```
///
/// ## Errors
///
/// Never fails for the records in [`crate::types`]; the buffer is sized from
/// the record's own count.
pub fn read_state<S: StateWords>(context: &ThreadContext) -> StateResult<S>
{
    let mut words = vec![0; S::COUNT];
    get_state(context, S::FLAVOR, &mut words)?;
    S::from_words(&words)
}

/// Typed write of a concrete flavor
///
/// ## Errors
///
/// Never fails for the records in [`crate::types`].
pub fn write_state<S: StateWords>(context: &mut ThreadContext, state: &S) -> StateResult<()>
{
    set_state(context, S::FLAVOR, &state.to_words())
}
