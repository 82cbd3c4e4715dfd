//! # Error Types
//!
//! Error handling for thread state access.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::constants::RawFlavor;
use crate::flavor::StateFlavor;

/// Main error type for thread state operations
///
/// Every variant is detected before any saved register is touched, so an
/// `Err` always means the target context is unchanged.
///
/// ## Error Categories
///
/// 1. **Flavor errors**: UnknownFlavor, UnsupportedFlavor
/// 2. **Buffer errors**: BufferTooSmall
/// 3. **Resource errors**: AllocationFailed (snapshot storage)
///
/// Internal consistency violations (a child context that is still redirected,
/// for example) are not represented here. They indicate a bug in the caller
/// and abort the operation with a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError
{
    /// The flavor code is outside the closed set of known flavors
    ///
    /// This happens when:
    /// - A caller passes a flavor from another architecture
    /// - A caller passes a corrupted or uninitialized flavor code
    #[error("Unknown thread state flavor: {0}")]
    UnknownFlavor(RawFlavor),

    /// The flavor is known but cannot be used with this operation
    ///
    /// The list pseudo-flavors can be queried but never written, and only list
    /// flavors can be enumerated.
    #[error("Flavor {0} is not supported by this operation")]
    UnsupportedFlavor(StateFlavor),

    /// The caller's buffer holds fewer words than the flavor requires
    #[error("Buffer too small for {flavor}: need {required} words, got {provided}")]
    BufferTooSmall
    {
        /// Flavor that was requested
        flavor: StateFlavor,
        /// Words the flavor requires
        required: usize,
        /// Words the caller supplied
        provided: usize,
    },

    /// Snapshot storage could not be allocated
    ///
    /// The caller must treat this as "no save occurred" and must not attempt
    /// a restore.
    #[error("Failed to allocate {bytes} bytes for context snapshot")]
    AllocationFailed
    {
        /// Size of the failed allocation
        bytes: usize,
    },
}

/// Convenience type alias for `Result<T, StateError>`
///
/// ```rust
/// use threadstate_core::error::StateResult;
/// fn foo() -> StateResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Kernel status code reported at the trap/message boundary (`kern_return_t`)
///
/// Only the codes this layer can produce are modeled:
///
/// - `KERN_SUCCESS` (0)
/// - `KERN_INVALID_ARGUMENT` (4): bad flavor or undersized buffer
/// - `KERN_RESOURCE_SHORTAGE` (6): snapshot allocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KernReturn
{
    /// `KERN_SUCCESS`
    Success = 0,
    /// `KERN_INVALID_ARGUMENT`
    InvalidArgument = 4,
    /// `KERN_RESOURCE_SHORTAGE`
    ResourceShortage = 6,
}

impl KernReturn
{
    /// Raw `kern_return_t` value
    pub const fn code(self) -> i32
    {
        self as i32
    }

    /// Collapse a result into the status code a trap handler would return
    ///
    /// ```rust
    /// use threadstate_core::error::{KernReturn, StateError};
    ///
    /// let ok: Result<usize, StateError> = Ok(17);
    /// assert_eq!(KernReturn::from_result(&ok), KernReturn::Success);
    ///
    /// let bad: Result<usize, StateError> = Err(StateError::UnknownFlavor(99));
    /// assert_eq!(KernReturn::from_result(&bad), KernReturn::InvalidArgument);
    /// ```
    pub fn from_result<T>(result: &StateResult<T>) -> Self
    {
        match result {
            Ok(_) => KernReturn::Success,
            Err(err) => KernReturn::from(err),
        }
    }
}

impl From<&StateError> for KernReturn
{
    fn from(err: &StateError) -> Self
    {
        match err {
            StateError::UnknownFlavor(_) | StateError::UnsupportedFlavor(_) | StateError::BufferTooSmall { .. } => {
                KernReturn::InvalidArgument
            }
            StateError::AllocationFailed { .. } => KernReturn::ResourceShortage,
        }
    }
}

impl From<KernReturn> for i32
{
    fn from(kr: KernReturn) -> Self
    {
        kr.code()
    }
}
