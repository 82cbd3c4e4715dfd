//! Common module for library exports

pub use crate::ancillary::{
    thread_adjuserstack, thread_entrypoint, thread_set_child, thread_set_parent, thread_set_wq_state,
    thread_setentrypoint, thread_setuserstack, thread_userstack, thread_userstackdefault,
};
pub use crate::context::{SavedStateCell, SavedStateRef, ThreadContext};
pub use crate::error::{KernReturn, StateError, StateResult};
pub use crate::flavor::{write_flavor_list, StateFlavor};
pub use crate::guards::{ExclusiveContext, InterruptControl, SoftInterruptLevel, SplLevel, Thread};
pub use crate::sanitize::{is_user_cpsr, sanitize_cpsr};
pub use crate::snapshot::{restore, save, ContextSnapshot};
pub use crate::transfer::{get_state, get_state_raw, read_state, set_state, set_state_raw, write_state};
pub use crate::types::{Address, ExceptionState, FloatingPointState, GeneralPurposeState, StateWords, ThreadId};
