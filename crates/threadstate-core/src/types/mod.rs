//! # Types
//!
//! Register state records and small identifier types used throughout the
//! thread state layer.
//!
//! The state records mirror the architected register file one flavor at a
//! time. Each converts to and from the flat `u32` word layout that caller
//! buffers carry, see [`StateWords`].

pub mod address;
pub mod process;
pub mod state;

// Re-export all public types
pub use address::Address;
pub use process::ThreadId;
pub use state::{ExceptionState, FloatingPointState, GeneralPurposeState, StateWords};
