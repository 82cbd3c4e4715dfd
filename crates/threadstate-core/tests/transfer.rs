//! Tests for flavor dispatch and state transfer

use threadstate_core::constants::{
    ARM_DEBUG_STATE, ARM_EXCEPTION_STATE, ARM_THREAD_STATE, ARM_VFP_STATE, THREAD_STATE_FLAVOR_LIST,
    THREAD_STATE_FLAVOR_LIST_NEW,
};
use threadstate_core::context::{SavedStateCell, ThreadContext};
use threadstate_core::error::StateError;
use threadstate_core::flavor::StateFlavor;
use threadstate_core::sanitize::sanitize_cpsr;
use threadstate_core::transfer::{get_state, get_state_raw, read_state, set_state, set_state_raw, write_state};
use threadstate_core::types::{ExceptionState, FloatingPointState, GeneralPurposeState, StateWords};

/// A context with every slot populated with distinct values
fn populated_context() -> ThreadContext
{
    let mut context = ThreadContext::new();
    {
        let gp = context.user_state_mut();
        for (idx, reg) in gp.r.iter_mut().enumerate() {
            *reg = 0xa000 + idx as u32;
        }
        gp.sp = 0x2fdf_ff00;
        gp.lr = 0x8100;
        gp.pc = 0x8000;
        gp.cpsr = 0x10;
    }
    {
        let vfp = context.vfp_state_mut();
        for (idx, reg) in vfp.r.iter_mut().enumerate() {
            *reg = 0xf000_0000 | idx as u32;
        }
        vfp.fpscr = 0x0300_0000;
    }
    *context.exception_state_mut() = ExceptionState {
        fsr: 0x7,
        far: 0x10,
        exception: 1,
    };
    context
}

/// Every observable slot of a context, for before/after comparisons
fn observe(context: &ThreadContext) -> (GeneralPurposeState, GeneralPurposeState, FloatingPointState, ExceptionState)
{
    (
        *context.user_state(),
        context.active_state(),
        *context.vfp_state(),
        *context.exception_state(),
    )
}

#[test]
fn test_general_round_trip_sanitizes_only_cpsr()
{
    let mut context = ThreadContext::new();
    let mut words: Vec<u32> = (1..=17).map(|n| n * 0x1111).collect();
    words[16] = 0xf000_02df; // flags, E, I, F, system mode

    set_state(&mut context, StateFlavor::GeneralPurpose, &words).unwrap();

    let mut out = [0u32; 17];
    assert_eq!(get_state(&context, StateFlavor::GeneralPurpose, &mut out), Ok(17));
    assert_eq!(&out[..16], &words[..16]);
    assert_eq!(out[16], sanitize_cpsr(words[16]));
    assert_eq!(out[16], 0xf000_0010);
}

#[test]
fn test_general_round_trip_sweep()
{
    // Distinct values in every slot, CPSR swept through a stride of the 32-bit range.
    let mut context = ThreadContext::new();
    for step in 0..512u32 {
        let words: Vec<u32> = (0..17).map(|idx| step.wrapping_mul(0x9e37_79b9).rotate_left(idx)).collect();
        set_state(&mut context, StateFlavor::GeneralPurpose, &words).unwrap();

        let mut out = [0u32; 17];
        get_state(&context, StateFlavor::GeneralPurpose, &mut out).unwrap();
        assert_eq!(&out[..16], &words[..16]);
        assert_eq!(out[16], sanitize_cpsr(words[16]));
    }
}

#[test]
fn test_vfp_and_exception_round_trip_unmodified()
{
    let mut context = ThreadContext::new();

    let vfp: Vec<u32> = (0..65).map(|n| u32::MAX - n).collect();
    set_state(&mut context, StateFlavor::FloatingPoint, &vfp).unwrap();
    let mut out = vec![0u32; 65];
    assert_eq!(get_state(&context, StateFlavor::FloatingPoint, &mut out), Ok(65));
    assert_eq!(out, vfp);

    let exception = [0x805, 0xdead_0000, 4];
    set_state(&mut context, StateFlavor::Exception, &exception).unwrap();
    let mut out = [0u32; 3];
    assert_eq!(get_state(&context, StateFlavor::Exception, &mut out), Ok(3));
    assert_eq!(out, exception);
}

#[test]
fn test_debug_flavor_is_accepted_no_op()
{
    let mut context = populated_context();
    let before = observe(&context);

    let mut out = [0x5555_5555u32; 64];
    assert_eq!(get_state(&context, StateFlavor::Debug, &mut out), Ok(64));
    assert_eq!(out, [0x5555_5555; 64]);

    assert_eq!(set_state(&mut context, StateFlavor::Debug, &[1u32; 64]), Ok(()));
    assert_eq!(observe(&context), before);
}

#[test]
fn test_debug_flavor_still_checks_capacity()
{
    let mut context = ThreadContext::new();
    let mut out = [0u32; 63];
    assert!(matches!(
        get_state(&context, StateFlavor::Debug, &mut out),
        Err(StateError::BufferTooSmall { required: 64, provided: 63, .. })
    ));
    assert!(set_state(&mut context, StateFlavor::Debug, &[0u32; 63]).is_err());
}

#[test]
fn test_basic_flavor_list()
{
    let context = ThreadContext::new();
    let mut out = [0u32; 3];
    assert_eq!(get_state(&context, StateFlavor::FlavorList, &mut out), Ok(3));
    assert_eq!(out, [1, 2, 3]);

    let mut short = [0u32; 2];
    assert!(matches!(
        get_state_raw(&context, THREAD_STATE_FLAVOR_LIST, &mut short),
        Err(StateError::BufferTooSmall { required: 3, provided: 2, .. })
    ));
    assert_eq!(short, [0, 0]);
}

#[test]
fn test_extended_flavor_list()
{
    let context = ThreadContext::new();
    let mut out = [0u32; 6];
    assert_eq!(get_state_raw(&context, THREAD_STATE_FLAVOR_LIST_NEW, &mut out), Ok(4));
    assert_eq!(
        &out[..4],
        &[
            ARM_THREAD_STATE as u32,
            ARM_VFP_STATE as u32,
            ARM_EXCEPTION_STATE as u32,
            ARM_DEBUG_STATE as u32
        ]
    );
    assert_eq!(&out[4..], &[0, 0]);

    let mut short = [0u32; 3];
    assert!(get_state(&context, StateFlavor::FlavorListExtended, &mut short).is_err());
}

#[test]
fn test_list_flavors_cannot_be_written()
{
    let mut context = populated_context();
    let before = observe(&context);

    for flavor in [StateFlavor::FlavorList, StateFlavor::FlavorListExtended] {
        assert_eq!(
            set_state(&mut context, flavor, &[0u32; 128]),
            Err(StateError::UnsupportedFlavor(flavor))
        );
    }
    assert_eq!(observe(&context), before);
}

#[test]
fn test_unknown_flavors_rejected_without_mutation()
{
    let mut context = populated_context();
    let before = observe(&context);
    let words = [0u32; 128];

    for raw in (-64..300).filter(|raw| StateFlavor::try_from(*raw).is_err()) {
        let mut out = [0x1234u32; 128];
        assert_eq!(get_state_raw(&context, raw, &mut out), Err(StateError::UnknownFlavor(raw)));
        assert_eq!(out, [0x1234; 128]);
        assert_eq!(set_state_raw(&mut context, raw, &words), Err(StateError::UnknownFlavor(raw)));
    }
    assert_eq!(observe(&context), before);
}

#[test]
fn test_undersized_buffers_rejected_without_mutation()
{
    let mut context = populated_context();
    let before = observe(&context);

    for flavor in StateFlavor::ALL {
        for provided in 0..flavor.required_count() {
            let mut out = vec![0xeeee_eeeeu32; provided];
            let result = get_state(&context, flavor, &mut out);
            assert!(
                matches!(result, Err(StateError::BufferTooSmall { .. })),
                "{flavor} get with {provided} words: {result:?}"
            );
            assert!(out.iter().all(|w| *w == 0xeeee_eeee));

            let words = vec![0u32; provided];
            assert!(set_state(&mut context, flavor, &words).is_err());
        }
    }
    assert_eq!(observe(&context), before);
}

#[test]
fn test_get_reads_redirected_storage_set_writes_own()
{
    let mut context = ThreadContext::new();
    let mut borrowed = GeneralPurposeState::ZERO;
    borrowed.r[0] = 0xb0b;
    let cell = SavedStateCell::new(borrowed);
    context.redirect(cell.clone());

    let mut out = [0u32; 17];
    get_state(&context, StateFlavor::GeneralPurpose, &mut out).unwrap();
    assert_eq!(out[0], 0xb0b);

    let mut words = [0u32; 17];
    words[0] = 0x5e7;
    set_state(&mut context, StateFlavor::GeneralPurpose, &words).unwrap();
    assert_eq!(context.user_state().r[0], 0x5e7);
    assert_eq!(cell.load().r[0], 0xb0b);
}

#[test]
fn test_typed_read_write()
{
    let mut context = ThreadContext::new();
    let mut state = GeneralPurposeState::ZERO;
    state.pc = 0x8000;
    state.cpsr = 0x13;

    write_state(&mut context, &state).unwrap();
    let read: GeneralPurposeState = read_state(&context).unwrap();
    assert_eq!(read.pc, 0x8000);
    assert_eq!(read.cpsr, 0x10);

    let fault = ExceptionState {
        fsr: 1,
        far: 2,
        exception: 3,
    };
    write_state(&mut context, &fault).unwrap();
    assert_eq!(read_state::<ExceptionState>(&context), Ok(fault));
    assert_eq!(ExceptionState::COUNT, 3);
}
