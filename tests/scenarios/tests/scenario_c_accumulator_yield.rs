//! n: Unsigned_8 = 0. pos = (n > 0). A hook watches pos's strict
//! (True, False) transition. Two `Yield`-delayed writes to the same key
//! are queued in the same batch; the second is deferred to the
//! following tick.
//!
//! A priming tick (no queued writes) runs first so the hook's `(True,
//! False)` predicate has a real prior `False` evaluation to match
//! against — see DESIGN.md's note on Scenario A/C: a hook whose last
//! mask is strictly `False` can never match the very first post-wiring
//! evaluation, since `last_eval` there is `Failed`, not `False`.

use std::cell::RefCell;
use std::rc::Rc;

use rules_dispatch::transition::{FALSE, TRUE};
use rules_dispatch::{Delegate, DelegateId, DelayPolicy, Dispatcher, DispatcherConfig, TransitionPredicate};
use rules_evaluator::expression::{ElementInput, ExpressionKind, Logic, StatusComparisonElement};
use rules_evaluator::{Evaluator, ExpressionKey};
use rules_reservoir::{
    AssignOp, ChunkKey, CompareOp, Reservoir, ReservoirConfig, Rhs, StatusAssignment, StatusComparison,
    StatusKey, StatusValue, Ternary,
};

struct Recorder(RefCell<Vec<(ExpressionKey, Ternary, Ternary)>>);

impl Delegate for Recorder {
    fn id(&self) -> DelegateId {
        DelegateId::from_raw(1)
    }

    fn notify(&self, expression_key: ExpressionKey, current: Ternary, last: Ternary) {
        self.0.borrow_mut().push((expression_key, current, last));
    }
}

#[test]
fn yield_defers_the_second_same_batch_write_to_the_following_tick() {
    let mut reservoir = Reservoir::new(ReservoirConfig::default());
    let mut evaluator = Evaluator::new();
    let chunk = ChunkKey::from_raw(1);
    let n = StatusKey::from_raw(1);
    reservoir.register_status(chunk, n, StatusValue::Unsigned(0, 8));

    let pos = ExpressionKey::from_name("pos");
    assert!(evaluator.register_expression(
        chunk,
        pos,
        Logic::And,
        ExpressionKind::StatusComparison,
        &[ElementInput::StatusComparison(StatusComparisonElement {
            comparison: StatusComparison {
                left: n,
                op: CompareOp::Gt,
                right: Rhs::Literal(StatusValue::Unsigned(0, 8)),
            },
        })],
    ));

    let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
    let delegate: Rc<dyn Delegate> = recorder.clone();
    let mut dispatcher = Dispatcher::new(DispatcherConfig::default());
    let predicate = TransitionPredicate::new(TRUE, FALSE).unwrap();
    assert!(dispatcher.register_hook(&evaluator, pos, predicate, 0, &delegate));

    // Priming tick: establishes a real False evaluation for pos.
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert!(recorder.0.borrow().is_empty());

    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment { key: n, op: AssignOp::Copy, rhs: Rhs::Literal(StatusValue::Unsigned(5, 8)) },
        DelayPolicy::Yield,
    );
    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment { key: n, op: AssignOp::Copy, rhs: Rhs::Literal(StatusValue::Unsigned(10, 8)) },
        DelayPolicy::Yield,
    );

    // Only n := 5 is applied; the second Yield entry is deferred. pos
    // flips False -> True and the hook fires.
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert_eq!(reservoir.find_status(n), StatusValue::Unsigned(5, 8));
    assert_eq!(recorder.0.borrow().as_slice(), &[(pos, Ternary::True, Ternary::False)]);

    // Next tick: the deferred n := 10 now applies. pos was already True
    // and stays True, so current == last and the hook can't fire again.
    recorder.0.borrow_mut().clear();
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert_eq!(reservoir.find_status(n), StatusValue::Unsigned(10, 8));
    assert!(recorder.0.borrow().is_empty());
}
