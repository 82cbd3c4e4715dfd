//! Tests for context snapshot save/restore

use threadstate_core::context::{SavedStateCell, ThreadContext};
use threadstate_core::flavor::StateFlavor;
use threadstate_core::snapshot::{restore, save};
use threadstate_core::transfer::set_state;
use threadstate_core::types::GeneralPurposeState;

/// A context whose state was established through the sanitizing write path
fn established_context() -> ThreadContext
{
    let mut context = ThreadContext::new();
    let mut general: Vec<u32> = (0..17).map(|n| 0x100 * (n + 1)).collect();
    general[16] = 0x8000_01d3;
    set_state(&mut context, StateFlavor::GeneralPurpose, &general).unwrap();

    let vfp: Vec<u32> = (0..65).map(|n| 0x3f80_0000 + n).collect();
    set_state(&mut context, StateFlavor::FloatingPoint, &vfp).unwrap();
    context
}

#[test]
fn test_save_captures_general_and_vfp()
{
    let context = established_context();
    let snapshot = save(&context).unwrap();

    assert_eq!(snapshot.general_state(), context.active_state());
    assert_eq!(snapshot.vfp_state(), *context.vfp_state());

    let mut context = context;
    restore(&mut context, Some(snapshot));
}

#[test]
fn test_save_then_restore_is_identity()
{
    let mut context = established_context();
    let general_before = *context.user_state();
    let vfp_before = *context.vfp_state();

    let snapshot = save(&context).unwrap();
    restore(&mut context, Some(snapshot));

    assert_eq!(*context.user_state(), general_before);
    assert_eq!(*context.vfp_state(), vfp_before);
}

#[test]
fn test_restore_undoes_intervening_mutation()
{
    let mut context = established_context();
    let general_before = *context.user_state();
    let vfp_before = *context.vfp_state();

    let snapshot = save(&context).unwrap();
    context.user_state_mut().r = [0xdead; 13];
    context.user_state_mut().pc = 0;
    context.vfp_state_mut().fpscr = 0xffff_ffff;

    restore(&mut context, Some(snapshot));
    assert_eq!(*context.user_state(), general_before);
    assert_eq!(*context.vfp_state(), vfp_before);
}

#[test]
fn test_restore_sanitizes_cpsr()
{
    // State placed in the save area by the trap path, not through set_state.
    let mut context = ThreadContext::new();
    context.user_state_mut().cpsr = 0x0000_00d3;

    let snapshot = save(&context).unwrap();
    assert_eq!(snapshot.general_state().cpsr, 0xd3);
    restore(&mut context, Some(snapshot));
    assert_eq!(context.user_state().cpsr, 0x10);
}

#[test]
fn test_restore_none_is_no_op()
{
    let mut context = established_context();
    let general_before = *context.user_state();
    let vfp_before = *context.vfp_state();

    restore(&mut context, None);
    assert_eq!(*context.user_state(), general_before);
    assert_eq!(*context.vfp_state(), vfp_before);
}

#[test]
fn test_save_reads_redirected_state()
{
    let mut context = ThreadContext::new();
    let mut borrowed = GeneralPurposeState::ZERO;
    borrowed.pc = 0x9000;
    borrowed.cpsr = 0x10;
    context.redirect(SavedStateCell::new(borrowed));

    let snapshot = save(&context).unwrap();
    assert_eq!(snapshot.general_state().pc, 0x9000);

    // Restore lands in the context's own storage.
    snapshot.restore(&mut context);
    assert_eq!(context.user_state().pc, 0x9000);
}

#[test]
fn test_independent_snapshots()
{
    let mut context = established_context();
    let first = save(&context).unwrap();

    context.user_state_mut().r[0] = 1;
    let second = save(&context).unwrap();

    restore(&mut context, Some(first));
    assert_eq!(context.user_state().r[0], 0x100);

    restore(&mut context, Some(second));
    assert_eq!(context.user_state().r[0], 1);
}

#[test]
fn test_dropped_snapshot_leaves_context_alone()
{
    let mut context = established_context();
    let before = *context.user_state();
    {
        let _abandoned = save(&context).unwrap();
    }
    context.user_state_mut().r[3] = 3;
    assert_eq!(context.user_state().r[0], before.r[0]);
    assert_eq!(context.user_state().r[3], 3);
}
