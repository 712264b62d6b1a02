#![no_main]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use cscroll_runtime::{CoalescingFilter, ManualScheduler};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Set(u8),
    Advance(u16),
    Flush,
    Cancel,
    Suspend,
    Resume,
}

fuzz_target!(|ops: Vec<Op>| {
    let scheduler = Rc::new(ManualScheduler::new());
    let filter = CoalescingFilter::new(0u8, scheduler.clone());
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    filter.on_settle(move |v| sink.borrow_mut().push(*v));

    for op in ops.into_iter().take(256) {
        let notified_before = log.borrow().len();
        match op {
            Op::Set(v) => filter.set(v),
            Op::Advance(ms) => {
                scheduler.advance(Duration::from_millis(u64::from(ms)));
            }
            // Precondition-guarded operations are only issued when legal.
            Op::Flush if !filter.is_suspended() => filter.flush(),
            Op::Suspend if !filter.is_suspended() => filter.suspend(),
            Op::Resume if filter.is_suspended() => filter.resume(),
            Op::Cancel => filter.cancel(),
            Op::Flush | Op::Suspend | Op::Resume => {}
        }

        // Post-conditions that must always hold:
        let notified = log.borrow().len() - notified_before;
        assert!(notified <= 1, "more than one notification per operation");
        assert!(scheduler.pending_count() <= 1, "more than one timer outstanding");
        assert_eq!(filter.is_pending(), scheduler.pending_count() == 1);
        if filter.is_suspended() {
            assert!(!filter.is_pending(), "timer running while suspended");
        }
        if notified == 1 {
            assert_eq!(Some(filter.settled()), filter.latest());
            assert_eq!(log.borrow().last().copied(), filter.latest());
        }
    }
});
