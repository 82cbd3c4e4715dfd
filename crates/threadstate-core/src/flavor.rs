//! # Flavor Catalog
//!
//! The closed set of thread state flavors and the buffer size each one needs.
//!
//! A flavor selects which register subset a state access call targets. Callers
//! hand us raw `i32` codes; [`StateFlavor::try_from`] is the only way in, so
//! every code outside the catalog is rejected before dispatch and every match
//! over [`StateFlavor`] is checked for exhaustiveness by the compiler.
//!
//! | Flavor                | Code | Words |
//! |-----------------------|------|-------|
//! | `FlavorList`          | 0    | 3     |
//! | `GeneralPurpose`      | 1    | 17    |
//! | `FloatingPoint`       | 2    | 65    |
//! | `Exception`           | 3    | 3     |
//! | `Debug`               | 4    | 64    |
//! | `FlavorListExtended`  | 128  | 4     |

use std::fmt;

use tracing::debug;

use crate::constants::{self, RawFlavor};
use crate::error::{StateError, StateResult};

/// Thread state flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StateFlavor
{
    /// Enumerates the three basic concrete flavors
    FlavorList = constants::THREAD_STATE_FLAVOR_LIST,
    /// R0-R12, SP, LR, PC, CPSR
    GeneralPurpose = constants::ARM_THREAD_STATE,
    /// VFP registers and FPSCR
    FloatingPoint = constants::ARM_VFP_STATE,
    /// FSR, FAR, exception code
    Exception = constants::ARM_EXCEPTION_STATE,
    /// Hardware debug registers (not modeled)
    Debug = constants::ARM_DEBUG_STATE,
    /// Enumerates all four concrete flavors
    FlavorListExtended = constants::THREAD_STATE_FLAVOR_LIST_NEW,
}

/// Concrete flavors reported by [`StateFlavor::FlavorList`], in order
pub const BASIC_FLAVORS: [StateFlavor; constants::FLAVOR_LIST_COUNT] =
    [StateFlavor::GeneralPurpose, StateFlavor::FloatingPoint, StateFlavor::Exception];

/// Concrete flavors reported by [`StateFlavor::FlavorListExtended`], in order
pub const EXTENDED_FLAVORS: [StateFlavor; constants::FLAVOR_LIST_NEW_COUNT] = [
    StateFlavor::GeneralPurpose,
    StateFlavor::FloatingPoint,
    StateFlavor::Exception,
    StateFlavor::Debug,
];

impl StateFlavor
{
    /// Every flavor in the catalog, list pseudo-flavors included
    pub const ALL: [StateFlavor; 6] = [
        StateFlavor::FlavorList,
        StateFlavor::GeneralPurpose,
        StateFlavor::FloatingPoint,
        StateFlavor::Exception,
        StateFlavor::Debug,
        StateFlavor::FlavorListExtended,
    ];

    /// Raw flavor code
    pub const fn raw(self) -> RawFlavor
    {
        self as RawFlavor
    }

    /// Minimum buffer size for this flavor, in `u32` words
    pub const fn required_count(self) -> usize
    {
        match self {
            StateFlavor::FlavorList => constants::FLAVOR_LIST_COUNT,
            StateFlavor::GeneralPurpose => constants::ARM_THREAD_STATE_COUNT,
            StateFlavor::FloatingPoint => constants::ARM_VFP_STATE_COUNT,
            StateFlavor::Exception => constants::ARM_EXCEPTION_STATE_COUNT,
            StateFlavor::Debug => constants::ARM_DEBUG_STATE_COUNT,
            StateFlavor::FlavorListExtended => constants::FLAVOR_LIST_NEW_COUNT,
        }
    }

    /// `true` for the two pseudo-flavors that enumerate other flavors
    pub const fn is_list(self) -> bool
    {
        matches!(self, StateFlavor::FlavorList | StateFlavor::FlavorListExtended)
    }

    /// Validate a caller-stated capacity against [`required_count`](Self::required_count)
    ///
    /// ## Errors
    ///
    /// - `BufferTooSmall`: `provided` is below the flavor's requirement
    pub fn check_capacity(self, provided: usize) -> StateResult<()>
    {
        let required = self.required_count();
        if provided < required {
            debug!(flavor = %self, required, provided, "rejecting undersized state buffer");
            return Err(StateError::BufferTooSmall {
                flavor: self,
                required,
                provided,
            });
        }
        Ok(())
    }

    /// Concrete flavors enumerated by a list flavor
    ///
    /// Returns `None` for concrete flavors.
    pub fn enumerated(self) -> Option<&'static [StateFlavor]>
    {
        match self {
            StateFlavor::FlavorList => Some(&BASIC_FLAVORS),
            StateFlavor::FlavorListExtended => Some(&EXTENDED_FLAVORS),
            StateFlavor::GeneralPurpose | StateFlavor::FloatingPoint | StateFlavor::Exception | StateFlavor::Debug => {
                None
            }
        }
    }
}

impl TryFrom<RawFlavor> for StateFlavor
{
    type Error = StateError;

    fn try_from(raw: RawFlavor) -> StateResult<Self>
    {
        match raw {
            constants::THREAD_STATE_FLAVOR_LIST => Ok(StateFlavor::FlavorList),
            constants::ARM_THREAD_STATE => Ok(StateFlavor::GeneralPurpose),
            constants::ARM_VFP_STATE => Ok(StateFlavor::FloatingPoint),
            constants::ARM_EXCEPTION_STATE => Ok(StateFlavor::Exception),
            constants::ARM_DEBUG_STATE => Ok(StateFlavor::Debug),
            constants::THREAD_STATE_FLAVOR_LIST_NEW => Ok(StateFlavor::FlavorListExtended),
            _ => {
                debug!(flavor = raw, "rejecting unknown thread state flavor");
                Err(StateError::UnknownFlavor(raw))
            }
        }
    }
}

impl From<StateFlavor> for RawFlavor
{
    fn from(flavor: StateFlavor) -> Self
    {
        flavor.raw()
    }
}

impl fmt::Display for StateFlavor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            StateFlavor::FlavorList => "THREAD_STATE_FLAVOR_LIST",
            StateFlavor::GeneralPurpose => "ARM_THREAD_STATE",
            StateFlavor::FloatingPoint => "ARM_VFP_STATE",
            StateFlavor::Exception => "ARM_EXCEPTION_STATE",
            StateFlavor::Debug => "ARM_DEBUG_STATE",
            StateFlavor::FlavorListExtended => "THREAD_STATE_FLAVOR_LIST_NEW",
        };
        f.write_str(name)
    }
}

/// Write the flavors enumerated by a list flavor into `out`
///
/// Each entry is the raw flavor code stored as a `u32` word. Returns the number
/// of entries written (3 for the basic list, 4 for the extended list).
///
/// ## Errors
///
/// - `UnsupportedFlavor`: `flavor` is a concrete flavor, not a list
/// - `BufferTooSmall`: `out` cannot hold every entry; nothing is written
pub fn write_flavor_list(flavor: StateFlavor, out: &mut [u32]) -> StateResult<usize>
{
    let Some(flavors) = flavor.enumerated() else {
        return Err(StateError::UnsupportedFlavor(flavor));
    };
    flavor.check_capacity(out.len())?;

    for (slot, entry) in out.iter_mut().zip(flavors) {
        // Flavor codes are small non-negative integers.
        *slot = entry.raw().unsigned_abs();
    }
    Ok(flavors.len())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_raw_codes_round_trip()
    {
        for flavor in StateFlavor::ALL {
            assert_eq!(StateFlavor::try_from(flavor.raw()), Ok(flavor));
        }
    }

    #[test]
    fn test_unknown_codes_rejected()
    {
        for raw in [-1, 5, 6, 17, 127, 129, i32::MIN, i32::MAX] {
            assert_eq!(StateFlavor::try_from(raw), Err(StateError::UnknownFlavor(raw)));
        }
    }

    #[test]
    fn test_list_lengths_match_required_counts()
    {
        assert_eq!(BASIC_FLAVORS.len(), StateFlavor::FlavorList.required_count());
        assert_eq!(EXTENDED_FLAVORS.len(), StateFlavor::FlavorListExtended.required_count());
        assert!(StateFlavor::ALL.iter().filter(|f| f.is_list()).count() == 2);
    }

    #[test]
    fn test_write_flavor_list_rejects_concrete_flavor()
    {
        let mut out = [0u32; 8];
        assert_eq!(
            write_flavor_list(StateFlavor::Exception, &mut out),
            Err(StateError::UnsupportedFlavor(StateFlavor::Exception))
        );
        assert_eq!(out, [0; 8]);
    }
}
