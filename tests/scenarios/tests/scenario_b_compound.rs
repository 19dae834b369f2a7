//! a, b: Bool = false. eA = (a == true), eB = (b == true), eOr =
//! SubExpression Or[(eA, true), (eB, true)]. A hook watches eOr's
//! (True, NotTrue) transition.

use std::cell::RefCell;
use std::rc::Rc;

use rules_dispatch::transition::{NOT_TRUE, TRUE};
use rules_dispatch::{Delegate, DelegateId, Dispatcher, DispatcherConfig, TransitionPredicate};
use rules_evaluator::expression::{
    ElementInput, ExpressionKind, Logic, StatusComparisonElement, SubExpressionElement,
};
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

fn set_bool(dispatcher: &mut Dispatcher, key: StatusKey, value: bool) {
    dispatcher.accumulator_mut().unwrap().enqueue(
        StatusAssignment {
            key,
            op: AssignOp::Copy,
            rhs: Rhs::Literal(StatusValue::Bool(value)),
        },
        rules_dispatch::DelayPolicy::Nonblock,
    );
}

#[test]
fn or_hook_fires_only_on_true_to_non_true_arrivals() {
    let mut reservoir = Reservoir::new(ReservoirConfig::default());
    let mut evaluator = Evaluator::new();
    let chunk = ChunkKey::from_raw(1);
    let a = StatusKey::from_raw(1);
    let b = StatusKey::from_raw(2);
    reservoir.register_status(chunk, a, StatusValue::Bool(false));
    reservoir.register_status(chunk, b, StatusValue::Bool(false));

    let e_a = ExpressionKey::from_name("eA");
    let e_b = ExpressionKey::from_name("eB");
    let e_or = ExpressionKey::from_name("eOr");
    for (key, status) in [(e_a, a), (e_b, b)] {
        assert!(evaluator.register_expression(
            chunk,
            key,
            Logic::And,
            ExpressionKind::StatusComparison,
            &[ElementInput::StatusComparison(StatusComparisonElement {
                comparison: StatusComparison {
                    left: status,
                    op: CompareOp::Eq,
                    right: Rhs::Literal(StatusValue::Bool(true)),
                },
            })],
        ));
    }
    assert!(evaluator.register_expression(
        chunk,
        e_or,
        Logic::Or,
        ExpressionKind::SubExpression,
        &[
            ElementInput::SubExpression(SubExpressionElement { expression_key: e_a, expected_condition: true }),
            ElementInput::SubExpression(SubExpressionElement { expression_key: e_b, expected_condition: true }),
        ],
    ));

    let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
    let delegate: Rc<dyn Delegate> = recorder.clone();
    let mut dispatcher = Dispatcher::new(DispatcherConfig::default());
    let predicate = TransitionPredicate::new(TRUE, NOT_TRUE).unwrap();
    assert!(dispatcher.register_hook(&evaluator, e_or, predicate, 0, &delegate));

    // Tick 1: a := true. eOr goes from no prior evaluation to True.
    set_bool(&mut dispatcher, a, true);
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert_eq!(recorder.0.borrow().as_slice(), &[(e_or, Ternary::True, Ternary::Failed)]);

    // Tick 2: b := true. eOr stays True (short-circuits on a alone), so
    // current == last and the hook can't fire.
    recorder.0.borrow_mut().clear();
    set_bool(&mut dispatcher, b, true);
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert!(recorder.0.borrow().is_empty());

    // Tick 3: a and b both go false in the same batch. eOr becomes
    // False; the hook only watches arrivals at True, so it stays silent.
    set_bool(&mut dispatcher, a, false);
    set_bool(&mut dispatcher, b, false);
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert!(recorder.0.borrow().is_empty());

    // Tick 4: a := true again. eOr flips False -> True.
    set_bool(&mut dispatcher, a, true);
    assert!(dispatcher.dispatch(&mut reservoir, &evaluator));
    assert_eq!(recorder.0.borrow().as_slice(), &[(e_or, Ternary::True, Ternary::False)]);
}
