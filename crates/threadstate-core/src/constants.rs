//! # ARM Thread State Constants
//!
//! Centralized constants for the 32-bit ARM thread state layer.
//!
//! ## Organization
//!
//! Constants are organized by category:
//! - Thread state flavor codes
//! - Thread state counts (in `u32` words)
//! - Word layout indices
//! - Control/status word (CPSR) bits
//! - Default user address layout

// ============================================================================
// Thread State Flavors
// ============================================================================

/// Raw flavor code as carried by callers (`thread_flavor_t`)
pub type RawFlavor = i32;

/// Flavor list pseudo-flavor (flavor 0)
///
/// Enumerates the three concrete flavors every caller understands.
pub const THREAD_STATE_FLAVOR_LIST: RawFlavor = 0;

/// ARM general-purpose thread state flavor (flavor 1)
///
/// R0-R12, SP, LR, PC and CPSR.
pub const ARM_THREAD_STATE: RawFlavor = 1;

/// ARM VFP state flavor (flavor 2)
///
/// 64 single-precision VFP/NEON words plus FPSCR.
pub const ARM_VFP_STATE: RawFlavor = 2;

/// ARM exception state flavor (flavor 3)
///
/// Fault status, fault address and exception code of the last fault.
pub const ARM_EXCEPTION_STATE: RawFlavor = 3;

/// ARM debug state flavor (flavor 4)
///
/// Hardware breakpoint/watchpoint value and control registers. Recognized but
/// not modeled: transfers of this flavor are no-ops.
pub const ARM_DEBUG_STATE: RawFlavor = 4;

/// Extended flavor list pseudo-flavor (flavor 128)
///
/// Like [`THREAD_STATE_FLAVOR_LIST`], with the debug flavor appended.
pub const THREAD_STATE_FLAVOR_LIST_NEW: RawFlavor = 128;

// ============================================================================
// Thread State Counts
// ============================================================================

/// Number of general registers R0-R12
pub const ARM_GENERAL_REGISTER_COUNT: usize = 13;

/// Number of VFP registers (each stored as one `u32` word)
pub const ARM_VFP_REGISTER_COUNT: usize = 64;

/// General-purpose state count (17 words)
///
/// 13 general registers + SP + LR + PC + CPSR.
pub const ARM_THREAD_STATE_COUNT: usize = ARM_GENERAL_REGISTER_COUNT + 4;

/// VFP state count (65 words)
///
/// 64 registers + FPSCR.
pub const ARM_VFP_STATE_COUNT: usize = ARM_VFP_REGISTER_COUNT + 1;

/// Exception state count (3 words)
pub const ARM_EXCEPTION_STATE_COUNT: usize = 3;

/// Debug state count (64 words)
///
/// 16 breakpoint value, 16 breakpoint control, 16 watchpoint value and 16
/// watchpoint control registers.
pub const ARM_DEBUG_STATE_COUNT: usize = 64;

/// Entries written for [`THREAD_STATE_FLAVOR_LIST`]
pub const FLAVOR_LIST_COUNT: usize = 3;

/// Entries written for [`THREAD_STATE_FLAVOR_LIST_NEW`]
pub const FLAVOR_LIST_NEW_COUNT: usize = 4;

// ============================================================================
// General-Purpose Word Layout
// ============================================================================

/// Word index of SP in the general-purpose buffer
pub const ARM_SP_INDEX: usize = 13;

/// Word index of LR in the general-purpose buffer
pub const ARM_LR_INDEX: usize = 14;

/// Word index of PC in the general-purpose buffer
pub const ARM_PC_INDEX: usize = 15;

/// Word index of CPSR in the general-purpose buffer
pub const ARM_CPSR_INDEX: usize = 16;

/// Word index of FPSCR in the VFP buffer
pub const ARM_FPSCR_INDEX: usize = 64;

/// Number of general registers copied by the work-queue initializer (R0-R5)
pub const WQ_ARGUMENT_REGISTER_COUNT: usize = 6;

// ============================================================================
// CPSR Bits
// ============================================================================

/// CPSR E bit (bit 9): big-endian data accesses
pub const CPSR_ENDIANNESS_BIT: u32 = 1 << 9;

/// CPSR I bit (bit 7): IRQ masked
pub const CPSR_IRQ_MASK_BIT: u32 = 1 << 7;

/// CPSR F bit (bit 6): FIQ masked
pub const CPSR_FIQ_MASK_BIT: u32 = 1 << 6;

/// CPSR M[4:0] processor mode field
pub const CPSR_MODE_MASK: u32 = 0x1F;

/// CPSR mode encoding for user mode (`0b10000`)
pub const CPSR_MODE_USER: u32 = 0x10;

// ============================================================================
// Default User Layout
// ============================================================================

/// Default top of the user stack (`USRSTACK`)
///
/// Returned when a not-yet-running thread state leaves SP at zero.
pub const USRSTACK: u32 = 0x2FE0_0000;

/// Lowest user address an entry point may default to (`VM_MIN_ADDRESS`)
///
/// The first page stays unmapped so a null PC faults instead of executing.
pub const VM_MIN_ADDRESS: u32 = 0x0000_1000;
