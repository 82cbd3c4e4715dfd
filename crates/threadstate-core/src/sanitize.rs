//! # Control Word Sanitizer
//!
//! Scrubs privilege-affecting bits from a CPSR supplied from outside the kernel
//! before it is admitted into a thread's saved state.
//!
//! ```text
//!  31                    10  9  8  7  6  5  4       0
//! [ flags ... ............ ][E][A][I][F][T][  M[4:0] ]
//!                           ^     ^  ^      ^^^^^^^^^
//!                        cleared  cleared   forced to 0b10000 (user)
//! ```
//!
//! Every other bit passes through unchanged. This is the only place a foreign
//! control word can enter the general-purpose save area.

use crate::constants::{CPSR_ENDIANNESS_BIT, CPSR_FIQ_MASK_BIT, CPSR_IRQ_MASK_BIT, CPSR_MODE_MASK, CPSR_MODE_USER};

/// Bits that are always cleared
const CPSR_SCRUB_MASK: u32 = CPSR_ENDIANNESS_BIT | CPSR_IRQ_MASK_BIT | CPSR_FIQ_MASK_BIT | CPSR_MODE_MASK;

/// Sanitize a control/status word for user mode
///
/// Clears the data endianness bit and both interrupt mask bits, and forces the
/// mode field to user mode. Idempotent.
///
/// ## Example
///
/// ```rust
/// use threadstate_core::sanitize::sanitize_cpsr;
///
/// // SVC mode with IRQ and FIQ masked
/// assert_eq!(sanitize_cpsr(0x0000_00d3), 0x0000_0010);
/// // Condition flags survive
/// assert_eq!(sanitize_cpsr(0xf000_0013), 0xf000_0010);
/// ```
#[must_use]
pub const fn sanitize_cpsr(cpsr: u32) -> u32
{
    (cpsr & !CPSR_SCRUB_MASK) | CPSR_MODE_USER
}

/// `true` if `cpsr` is already in the form [`sanitize_cpsr`] produces
pub const fn is_user_cpsr(cpsr: u32) -> bool
{
    cpsr & CPSR_MODE_MASK == CPSR_MODE_USER && cpsr & (CPSR_ENDIANNESS_BIT | CPSR_IRQ_MASK_BIT | CPSR_FIQ_MASK_BIT) == 0
}

#[cfg(test)]
mod tests
{
    use super::*;

    /// Stride through the full 32-bit range; odd and coprime with 2^32.
    const SWEEP_STRIDE: usize = 4099;

    #[test]
    fn test_sanitize_forces_user_mode()
    {
        for mode in 0..=CPSR_MODE_MASK {
            assert_eq!(sanitize_cpsr(mode) & CPSR_MODE_MASK, CPSR_MODE_USER);
        }
    }

    #[test]
    fn test_sanitize_clears_endianness_and_interrupt_masks()
    {
        let word = sanitize_cpsr(u32::MAX);
        assert_eq!(word & CPSR_ENDIANNESS_BIT, 0);
        assert_eq!(word & CPSR_IRQ_MASK_BIT, 0);
        assert_eq!(word & CPSR_FIQ_MASK_BIT, 0);
        assert_eq!(word, 0xffff_fd30);
    }

    #[test]
    fn test_sanitize_preserves_other_bits()
    {
        // N, Z, C, V, Q, J, GE, IT, A and T bits
        let other = !CPSR_SCRUB_MASK;
        assert_eq!(sanitize_cpsr(other) & other, other);
        assert_eq!(sanitize_cpsr(0) & other, 0);
    }

    #[test]
    fn test_sanitize_idempotent_sweep()
    {
        for word in (0..=u32::MAX).step_by(SWEEP_STRIDE) {
            let once = sanitize_cpsr(word);
            assert_eq!(sanitize_cpsr(once), once, "not idempotent for 0x{word:08x}");
            assert!(is_user_cpsr(once), "not user mode for 0x{word:08x}");
        }
    }

    #[test]
    fn test_is_user_cpsr()
    {
        assert!(is_user_cpsr(0x10));
        assert!(is_user_cpsr(0x6000_0030));
        assert!(!is_user_cpsr(0x13));
        assert!(!is_user_cpsr(0x90));
        assert!(!is_user_cpsr(0x210));
    }
}
