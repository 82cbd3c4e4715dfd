//! Tests for scoped exclusive access to thread contexts

use std::sync::Arc;
use std::thread;

use threadstate_core::context::ThreadContext;
use threadstate_core::guards::{InterruptControl, SoftInterruptLevel, SplGuard, SplLevel, Thread};
use threadstate_core::types::ThreadId;

#[test]
fn test_soft_interrupt_level_raise_and_restore()
{
    let interrupts = SoftInterruptLevel::new();
    assert_eq!(interrupts.current(), SplLevel::BASE);

    let previous = interrupts.raise_to_sched();
    assert_eq!(previous, SplLevel::BASE);
    assert_eq!(interrupts.current(), SplLevel::SCHED);

    interrupts.restore(previous);
    assert_eq!(interrupts.current(), SplLevel::BASE);
}

#[test]
fn test_spl_guard_nests()
{
    let interrupts = SoftInterruptLevel::new();
    {
        let outer = SplGuard::raise(&interrupts);
        assert_eq!(outer.previous(), SplLevel::BASE);
        {
            let inner = SplGuard::raise(&interrupts);
            assert_eq!(inner.previous(), SplLevel::SCHED);
        }
        assert_eq!(interrupts.current(), SplLevel::SCHED);
    }
    assert_eq!(interrupts.current(), SplLevel::BASE);
}

#[test]
fn test_cross_thread_access_raises_and_locks()
{
    let interrupts = SoftInterruptLevel::new();
    let target = Thread::new(ThreadId::from(2));
    {
        let mut context = target.exclusive(ThreadId::from(1), &interrupts);
        assert!(context.is_cross_thread());
        assert_eq!(context.thread(), ThreadId::from(2));
        assert_eq!(interrupts.current(), SplLevel::SCHED);
        assert!(target.is_locked());
        context.user_state_mut().r[4] = 4;
    }
    assert!(!target.is_locked());
    assert_eq!(interrupts.current(), SplLevel::BASE);
    assert_eq!(target.into_context().user_state().r[4], 4);
}

#[test]
fn test_self_access_skips_level_raise()
{
    let interrupts = SoftInterruptLevel::new();
    let me = Thread::new(ThreadId::from(9));

    let context = me.exclusive(ThreadId::from(9), &interrupts);
    assert!(!context.is_cross_thread());
    assert_eq!(interrupts.current(), SplLevel::BASE);
    drop(context);
    assert!(!me.is_locked());
}

#[test]
fn test_with_exclusive_releases_on_early_return()
{
    fn fallible(context: &mut ThreadContext) -> Result<(), &'static str>
    {
        context.user_state_mut().sp = 0x1000;
        Err("bail out")
    }

    let interrupts = SoftInterruptLevel::new();
    let target = Thread::new(ThreadId::from(2));

    let result = target.with_exclusive(ThreadId::from(1), &interrupts, fallible);
    assert_eq!(result, Err("bail out"));
    assert!(!target.is_locked());
    assert_eq!(interrupts.current(), SplLevel::BASE);
}

#[test]
fn test_restores_previously_raised_level()
{
    let interrupts = SoftInterruptLevel::new();
    interrupts.restore(SplLevel(3));

    let target = Thread::new(ThreadId::from(2));
    target.with_exclusive(ThreadId::from(1), &interrupts, |_| {
        assert_eq!(interrupts.current(), SplLevel::SCHED);
    });
    assert_eq!(interrupts.current(), SplLevel(3));
}

#[test]
fn test_concurrent_mutators_serialize()
{
    let target = Arc::new(Thread::new(ThreadId::from(0)));

    let handles: Vec<_> = (1..=4u64)
        .map(|caller| {
            let target = Arc::clone(&target);
            thread::spawn(move || {
                let interrupts = SoftInterruptLevel::new();
                for _ in 0..1000 {
                    target.with_exclusive(ThreadId::from(caller), &interrupts, |context| {
                        let state = context.user_state_mut();
                        state.r[0] += 1;
                        state.r[1] = state.r[0];
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let context = Arc::try_unwrap(target).unwrap().into_context();
    assert_eq!(context.user_state().r[0], 4000);
    assert_eq!(context.user_state().r[1], 4000);
}
