//! User virtual address type.

use std::fmt;
use std::ops::{Add, Sub};

use crate::constants;

/// Strongly typed 32-bit user virtual address
///
/// Returned by the stack and entry point accessors so that an address is never
/// confused with a register index or a word count.
///
/// ## Example
///
/// ```rust
/// use threadstate_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x100; // Add offset
/// assert_eq!(next_addr.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u32);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Default top of the user stack
    pub const USER_STACK_TOP: Self = Address(constants::USRSTACK);

    /// Lowest address a user entry point defaults to
    pub const MIN_USER: Self = Address(constants::VM_MIN_ADDRESS);

    /// Create a new address from a `u32` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u32) -> Self
    {
        Address(value)
    }

    /// Get the raw `u32` value of this address
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// `true` for the null address
    pub const fn is_zero(self) -> bool
    {
        self.0 == 0
    }

    /// Offset this address by a signed delta, wrapping like the hardware SP does
    ///
    /// ```rust
    /// use threadstate_core::types::Address;
    ///
    /// let sp = Address::from(0x2000);
    /// assert_eq!(sp.offset(-0x10), Address::from(0x1ff0));
    /// assert_eq!(sp.offset(0x10), Address::from(0x2010));
    /// ```
    pub const fn offset(self, delta: i32) -> Self
    {
        Address(self.0.wrapping_add_signed(delta))
    }

    /// `self` if non-null, otherwise `default`
    pub const fn or(self, default: Address) -> Self
    {
        if self.is_zero() {
            default
        } else {
            self
        }
    }
}

impl From<u32> for Address
{
    fn from(value: u32) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u32
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        u64::from(address.0)
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Add<u32> for Address
{
    type Output = Address;

    fn add(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u32> for Address
{
    type Output = Address;

    fn sub(self, rhs: u32) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
