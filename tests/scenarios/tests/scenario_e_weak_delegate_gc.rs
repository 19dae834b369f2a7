//! A hook's delegate is held only by the caller's `Rc`. Once that `Rc`
//! is dropped, `find_handler` stops reporting it immediately (its
//! liveness check, not just pruning, gates the lookup) and the hook is
//! silently pruned on the next dispatch, so no further transitions
//! invoke it.

use std::cell::RefCell;
use std::rc::Rc;

use rules_dispatch::transition::{FALSE, TRUE};
use rules_dispatch::{Delegate, DelegateId, Dispatcher, DispatcherConfig, TransitionPredicate};
use rules_evaluator::expression::{ElementInput, ExpressionKind, Logic, StatusComparisonElement};
use rules_evaluator::{Evaluator, ExpressionKey};
use rules_reservoir::{
    AssignOp, ChunkKey, CompareOp, Reservoir, ReservoirConfig, Rhs, StatusAssignment, StatusComparison,
    StatusKey, StatusValue, Ternary,
};

struct Recorder {
    log: Rc<RefCell<Vec<(ExpressionKey, Ternary, Ternary)>>>,
}

impl Delegate for Recorder {
    fn id(&self) -> DelegateId {
        DelegateId::from_raw(1)
    }

    fn notify(&self, expression_key: ExpressionKey, current: Ternary, last: Ternary) {
        self.log.borrow_mut().push((expression_key, current, last));
    }
}

#[test]
fn dropping_the_delegate_silently_retires_its_hook() {
    let mut reservoir = Reservoir::new(ReservoirConfig::default());
    let mut evaluator = Evaluator::new();
    let chunk = ChunkKey::from_raw(1);
    let flag = StatusKey::from_raw(1);
    reservoir.register_status(chunk, flag, StatusValue::Bool(false));

    let e = ExpressionKey::from_name("e");
    assert!(evaluator.register_expression(
        chunk,
        e,
        Logic::And,
        ExpressionKind::StatusComparison,
        &[ElementInput::StatusComparison(StatusComparisonElement {
            comparison: StatusComparison {
                left: flag,
                op: CompareOp::Eq,
                right: Rhs::Literal(StatusValue::Bool(true)),
            },
        })],
    ));

    let mut dispatcher = Dispatcher::new(DispatcherConfig::default());
    let predicate = TransitionPredicate::new(TRUE, FALSE).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let delegate: Rc<dyn Delegate> = Rc::new(Recorder { log: log.clone() });
    let delegate_id = delegate.id();
    assert!(dispatcher.register_hook(&evaluator, e, predicate, 0, &delegate));
    assert_eq!(dispatcher.find_handler(e, delegate_id), Some(0));

    // Priming tick so the hook has a real False to watch for.
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert!(log.borrow().is_empty());

    // Prove the hook is live before dropping it.
    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment { key: flag, op: AssignOp::Copy, rhs: Rhs::Literal(StatusValue::Bool(true)) },
        rules_dispatch::DelayPolicy::Nonblock,
    );
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert_eq!(log.borrow().len(), 1);

    // Drop the only strong reference to the delegate; only the hook's
    // Weak remains. find_handler's liveness check means the hook is
    // already unreachable by id, even though prune_dead_hooks hasn't
    // run yet.
    drop(delegate);
    assert_eq!(dispatcher.find_handler(e, delegate_id), None);

    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment { key: flag, op: AssignOp::Copy, rhs: Rhs::Literal(StatusValue::Bool(false)) },
        rules_dispatch::DelayPolicy::Nonblock,
    );
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment { key: flag, op: AssignOp::Copy, rhs: Rhs::Literal(StatusValue::Bool(true)) },
        rules_dispatch::DelayPolicy::Nonblock,
    );
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));

    // flag made the exact same False -> True transition again, but the
    // hook was pruned after the delegate was dropped, so nothing new
    // was logged.
    assert_eq!(log.borrow().len(), 1);
}
