//! Register state records and their word layouts.
//!
//! Caller buffers are flat arrays of `u32` words (`natural_t` in Mach terms).
//! Each record knows its flavor and how its fields sit in such a buffer:
//!
//! ```text
//! ARM_THREAD_STATE     [r0 .. r12][sp][lr][pc][cpsr]        17 words
//! ARM_VFP_STATE        [s0 .. s63][fpscr]                    65 words
//! ARM_EXCEPTION_STATE  [fsr][far][exception]                  3 words
//! ```

use std::fmt;

use crate::constants::{
    ARM_CPSR_INDEX, ARM_FPSCR_INDEX, ARM_GENERAL_REGISTER_COUNT, ARM_LR_INDEX, ARM_PC_INDEX, ARM_SP_INDEX,
    ARM_VFP_REGISTER_COUNT,
};
use crate::error::StateResult;
use crate::flavor::StateFlavor;

/// A register record with a fixed word layout for one concrete flavor
pub trait StateWords: Sized
{
    /// Flavor this record is transferred under
    const FLAVOR: StateFlavor;

    /// Words occupied by this record
    const COUNT: usize = Self::FLAVOR.required_count();

    /// Build the record from the first [`COUNT`](Self::COUNT) words
    ///
    /// Callers must have validated `words.len() >= COUNT`.
    fn read_fields(words: &[u32]) -> Self;

    /// Store the record into the first [`COUNT`](Self::COUNT) words
    ///
    /// Callers must have validated `words.len() >= COUNT`.
    fn write_fields(&self, words: &mut [u32]);

    /// Decode a record, validating the buffer size first
    ///
    /// ## Errors
    ///
    /// - `BufferTooSmall`: `words` is shorter than [`COUNT`](Self::COUNT)
    fn from_words(words: &[u32]) -> StateResult<Self>
    {
        Self::FLAVOR.check_capacity(words.len())?;
        Ok(Self::read_fields(words))
    }

    /// Encode the record into `out`, validating the buffer size first
    ///
    /// Returns the number of words written.
    ///
    /// ## Errors
    ///
    /// - `BufferTooSmall`: `out` is shorter than [`COUNT`](Self::COUNT); `out` is untouched
    fn write_words(&self, out: &mut [u32]) -> StateResult<usize>
    {
        Self::FLAVOR.check_capacity(out.len())?;
        self.write_fields(out);
        Ok(Self::COUNT)
    }

    /// Encode the record into a freshly allocated buffer of exactly [`COUNT`](Self::COUNT) words
    fn to_words(&self) -> Vec<u32>
    {
        let mut words = vec![0; Self::COUNT];
        self.write_fields(&mut words);
        words
    }
}

/// Integer execution context of one thread (`arm_thread_state`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneralPurposeState
{
    /// General registers R0-R12
    pub r: [u32; ARM_GENERAL_REGISTER_COUNT],
    /// Stack pointer (R13)
    pub sp: u32,
    /// Link register (R14)
    pub lr: u32,
    /// Program counter (R15)
    pub pc: u32,
    /// Current program status register
    pub cpsr: u32,
}

impl GeneralPurposeState
{
    /// All-zero state
    pub const ZERO: Self = Self {
        r: [0; ARM_GENERAL_REGISTER_COUNT],
        sp: 0,
        lr: 0,
        pc: 0,
        cpsr: 0,
    };
}

impl StateWords for GeneralPurposeState
{
    const FLAVOR: StateFlavor = StateFlavor::GeneralPurpose;

    fn read_fields(words: &[u32]) -> Self
    {
        let mut state = Self::ZERO;
        state.r.copy_from_slice(&words[..ARM_GENERAL_REGISTER_COUNT]);
        state.sp = words[ARM_SP_INDEX];
        state.lr = words[ARM_LR_INDEX];
        state.pc = words[ARM_PC_INDEX];
        state.cpsr = words[ARM_CPSR_INDEX];
        state
    }

    fn write_fields(&self, words: &mut [u32])
    {
        words[..ARM_GENERAL_REGISTER_COUNT].copy_from_slice(&self.r);
        words[ARM_SP_INDEX] = self.sp;
        words[ARM_LR_INDEX] = self.lr;
        words[ARM_PC_INDEX] = self.pc;
        words[ARM_CPSR_INDEX] = self.cpsr;
    }
}

impl fmt::Display for GeneralPurposeState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for (row, chunk) in self.r.chunks(4).enumerate() {
            for (col, value) in chunk.iter().enumerate() {
                if col > 0 {
                    f.write_str("  ")?;
                }
                write!(f, "r{:<2} = 0x{:08x}", row * 4 + col, value)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "sp  = 0x{:08x}  lr  = 0x{:08x}  pc  = 0x{:08x}", self.sp, self.lr, self.pc)?;
        write!(f, "cpsr = 0x{:08x}", self.cpsr)
    }
}

/// VFP/NEON register file of one thread (`arm_vfp_state`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingPointState
{
    /// Single-precision registers S0-S63 (D0-D31 as pairs)
    pub r: [u32; ARM_VFP_REGISTER_COUNT],
    /// Floating-point status and control register
    pub fpscr: u32,
}

impl FloatingPointState
{
    /// All-zero state
    pub const ZERO: Self = Self {
        r: [0; ARM_VFP_REGISTER_COUNT],
        fpscr: 0,
    };
}

impl Default for FloatingPointState
{
    fn default() -> Self
    {
        Self::ZERO
    }
}

impl StateWords for FloatingPointState
{
    const FLAVOR: StateFlavor = StateFlavor::FloatingPoint;

    fn read_fields(words: &[u32]) -> Self
    {
        let mut state = Self::ZERO;
        state.r.copy_from_slice(&words[..ARM_VFP_REGISTER_COUNT]);
        state.fpscr = words[ARM_FPSCR_INDEX];
        state
    }

    fn write_fields(&self, words: &mut [u32])
    {
        words[..ARM_VFP_REGISTER_COUNT].copy_from_slice(&self.r);
        words[ARM_FPSCR_INDEX] = self.fpscr;
    }
}

impl fmt::Display for FloatingPointState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        // Only non-zero registers, the full file is mostly noise.
        for (idx, value) in self.r.iter().enumerate().filter(|(_, v)| **v != 0) {
            writeln!(f, "s{idx:<2} = 0x{value:08x}")?;
        }
        write!(f, "fpscr = 0x{:08x}", self.fpscr)
    }
}

/// Last fault taken by a thread (`arm_exception_state`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExceptionState
{
    /// Fault status register
    pub fsr: u32,
    /// Fault address register
    pub far: u32,
    /// Exception classification code
    pub exception: u32,
}

impl StateWords for ExceptionState
{
    const FLAVOR: StateFlavor = StateFlavor::Exception;

    fn read_fields(words: &[u32]) -> Self
    {
        Self {
            fsr: words[0],
            far: words[1],
            exception: words[2],
        }
    }

    fn write_fields(&self, words: &mut [u32])
    {
        words[0] = self.fsr;
        words[1] = self.far;
        words[2] = self.exception;
    }
}

impl fmt::Display for ExceptionState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(
            f,
            "fsr = 0x{:08x}  far = 0x{:08x}  exception = {}",
            self.fsr, self.far, self.exception
        )
    }
}
