//! # threadstate-core
//!
//! Validated, race-safe access to the saved register state of 32-bit ARM
//! kernel threads.
//!
//! This crate sits between external callers (debuggers, signal delivery,
//! fork/exec, thread-pool bring-up) and the in-kernel save area of a thread:
//!
//! - [`flavor`]: the closed catalog of state flavors and their buffer sizes
//! - [`transfer`]: flavor-specific get/set between word buffers and contexts
//! - [`sanitize`]: the CPSR scrubber every foreign control word passes through
//! - [`snapshot`]: save/restore of the running thread's GP and VFP state
//! - [`ancillary`]: stack, entry point, fork linkage and work-queue accessors
//! - [`guards`]: scoped exclusive access to another thread's context
//!
//! ## What this crate does not do
//!
//! It never decides when state is captured by a trap or where a thread runs
//! next. The trap path fills the save area; the scheduler owns the run queue.
//! Both reach this crate only through [`context::ThreadContext`] and
//! [`guards::InterruptControl`].
//!
//! ## Example
//!
//! ```rust
//! use threadstate_core::prelude::*;
//!
//! let mut context = ThreadContext::new();
//! let mut words = [0u32; 17];
//! words[16] = 0x1d3; // SVC mode with interrupts masked
//! set_state(&mut context, StateFlavor::GeneralPurpose, &words)?;
//!
//! let mut out = [0u32; 17];
//! get_state(&context, StateFlavor::GeneralPurpose, &mut out)?;
//! assert!(is_user_cpsr(out[16]));
//! # Ok::<(), StateError>(())
//! ```

pub mod ancillary;
pub mod constants;
pub mod context;
pub mod error;
pub mod flavor;
pub mod guards;
pub mod prelude;
pub mod sanitize;
pub mod snapshot;
pub mod transfer;
pub mod types;

// Re-export commonly used types
pub use context::ThreadContext;
pub use error::{KernReturn, StateError, StateResult};
pub use flavor::StateFlavor;
pub use types::{Address, ThreadId};
