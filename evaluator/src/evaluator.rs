//! `Evaluator`: the expression registry and three-valued evaluation
//! driver.

use std::collections::BTreeMap;

use rules_reservoir::{ChunkKey, Reservoir, Ternary};

use crate::error::EvaluatorError;
use crate::expression::{
    ElementInput, Expression, ExpressionKind, Logic, StatusComparisonElement,
    StatusTransitionElement, SubExpressionElement,
};
use crate::key::ExpressionKey;

/// Map {`ExpressionKey` -> `Expression`} plus the three per-chunk element
/// vectors its `[begin, end)` ranges index into.
#[derive(Debug, Default)]
pub struct Evaluator {
    expressions: BTreeMap<ExpressionKey, Expression>,
    sub_expression_elements: BTreeMap<ChunkKey, Vec<SubExpressionElement>>,
    status_transition_elements: BTreeMap<ChunkKey, Vec<StatusTransitionElement>>,
    status_comparison_elements: BTreeMap<ChunkKey, Vec<StatusComparisonElement>>,
}

impl Evaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `expression_key` with the given `logic`/`kind` and
    /// elements, copying them into the chunk's element vector for
    /// `kind`. Fails (returns `false`, state unchanged) if `elements` is
    /// empty, `expression_key` is already registered, any element
    /// doesn't match `kind`, or a `SubExpression` element references an
    /// expression not yet registered.
    pub fn register_expression(
        &mut self,
        chunk_key: ChunkKey,
        expression_key: ExpressionKey,
        logic: Logic,
        kind: ExpressionKind,
        elements: &[ElementInput],
    ) -> bool {
        match self.try_register_expression(chunk_key, expression_key, logic, kind, elements) {
            Ok(()) => true,
            Err(error) => {
                log::debug!("expression registration for {expression_key} failed: {error}");
                false
            }
        }
    }

    fn try_register_expression(
        &mut self,
        chunk_key: ChunkKey,
        expression_key: ExpressionKey,
        logic: Logic,
        kind: ExpressionKind,
        elements: &[ElementInput],
    ) -> Result<(), EvaluatorError> {
        if elements.is_empty() {
            return Err(EvaluatorError::EmptyElements);
        }
        if self.expressions.contains_key(&expression_key) {
            log::debug!("duplicate expression registration rejected: {expression_key}");
            return Err(EvaluatorError::DuplicateExpression(expression_key));
        }
        for element in elements {
            match (kind, element) {
                (ExpressionKind::SubExpression, ElementInput::SubExpression(sub)) => {
                    if !self.expressions.contains_key(&sub.expression_key) {
                        return Err(EvaluatorError::UnregisteredSubExpression(sub.expression_key));
                    }
                }
                (ExpressionKind::StatusTransition, ElementInput::StatusTransition(_))
                | (ExpressionKind::StatusComparison, ElementInput::StatusComparison(_)) => {}
                _ => return Err(EvaluatorError::ElementKindMismatch),
            }
        }

        let (begin, end) = match kind {
            ExpressionKind::SubExpression => {
                let vec = self.sub_expression_elements.entry(chunk_key).or_default();
                let begin = vec.len();
                vec.extend(elements.iter().filter_map(|element| match element {
                    ElementInput::SubExpression(sub) => Some(*sub),
                    _ => None,
                }));
                (begin, vec.len())
            }
            ExpressionKind::StatusTransition => {
                let vec = self.status_transition_elements.entry(chunk_key).or_default();
                let begin = vec.len();
                vec.extend(elements.iter().filter_map(|element| match element {
                    ElementInput::StatusTransition(status) => Some(*status),
                    _ => None,
                }));
                (begin, vec.len())
            }
            ExpressionKind::StatusComparison => {
                let vec = self.status_comparison_elements.entry(chunk_key).or_default();
                let begin = vec.len();
                vec.extend(elements.iter().filter_map(|element| match element {
                    ElementInput::StatusComparison(comparison) => Some(*comparison),
                    _ => None,
                }));
                (begin, vec.len())
            }
        };

        self.expressions.insert(
            expression_key,
            Expression {
                chunk_key,
                logic,
                kind,
                begin,
                end,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn find_expression(&self, expression_key: ExpressionKey) -> Option<&Expression> {
        self.expressions.get(&expression_key)
    }

    /// Removes every expression (and its elements) filed under
    /// `chunk_key`. Elements are left in their per-chunk vectors (indices
    /// would otherwise shift and invalidate every other expression's
    /// range); the vectors themselves are dropped wholesale by removing
    /// the chunk's entry.
    pub fn remove_chunk(&mut self, chunk_key: ChunkKey) {
        self.expressions.retain(|_, expr| expr.chunk_key() != chunk_key);
        self.sub_expression_elements.remove(&chunk_key);
        self.status_transition_elements.remove(&chunk_key);
        self.status_comparison_elements.remove(&chunk_key);
    }

    /// Evaluates `expression_key` against `reservoir` using three-valued
    /// Kleene logic. Returns `Failed` if the expression is unknown or any
    /// referenced element fails.
    #[must_use]
    pub fn evaluate_expression(&self, expression_key: ExpressionKey, reservoir: &Reservoir) -> Ternary {
        let Some(expression) = self.expressions.get(&expression_key) else {
            return Ternary::Failed;
        };
        self.evaluate(expression, reservoir)
    }

    fn evaluate(&self, expression: &Expression, reservoir: &Reservoir) -> Ternary {
        let (begin, end) = expression.range();
        let identity = match expression.logic() {
            Logic::And => Ternary::True,
            Logic::Or => Ternary::False,
        };
        for index in begin..end {
            let value = match expression.kind() {
                ExpressionKind::SubExpression => {
                    let element = self.sub_expression_elements[&expression.chunk_key()][index];
                    let inner = self.evaluate_expression(element.expression_key, reservoir);
                    inner.matches_expected(element.expected_condition)
                }
                ExpressionKind::StatusTransition => {
                    let element = self.status_transition_elements[&expression.chunk_key()][index];
                    reservoir.find_transition(element.status_key)
                }
                ExpressionKind::StatusComparison => {
                    let element = &self.status_comparison_elements[&expression.chunk_key()][index];
                    reservoir.compare_status(element.comparison)
                }
            };
            if value.is_failed() {
                return Ternary::Failed;
            }
            match expression.logic() {
                Logic::And if matches!(value, Ternary::False) => return Ternary::False,
                Logic::Or if value.is_true() => return Ternary::True,
                _ => {}
            }
        }
        identity
    }

    /// Returns `true` iff any element reachable from `expression_key`
    /// (including transitively, through `SubExpression` elements) is a
    /// `StatusTransition`. Used to gate the sticky flush bit at
    /// dependency-wiring time.
    #[must_use]
    pub fn contains_status_transition(&self, expression_key: ExpressionKey) -> bool {
        let Some(expression) = self.expressions.get(&expression_key) else {
            return false;
        };
        match expression.kind() {
            ExpressionKind::StatusTransition => true,
            ExpressionKind::StatusComparison => false,
            ExpressionKind::SubExpression => {
                let (begin, end) = expression.range();
                self.sub_expression_elements[&expression.chunk_key()][begin..end]
                    .iter()
                    .any(|element| self.contains_status_transition(element.expression_key))
            }
        }
    }

    /// Walks `expression_key`'s elements (recursing through
    /// `SubExpression`s) and calls `visit` once per leaf status key
    /// referenced, directly or transitively. Used by the dispatcher to
    /// wire `StatusMonitor` dependencies.
    pub fn for_each_dependency(
        &self,
        expression_key: ExpressionKey,
        visit: &mut dyn FnMut(rules_reservoir::StatusKey),
    ) {
        let Some(expression) = self.expressions.get(&expression_key) else {
            return;
        };
        let (begin, end) = expression.range();
        match expression.kind() {
            ExpressionKind::StatusTransition => {
                for element in &self.status_transition_elements[&expression.chunk_key()][begin..end] {
                    visit(element.status_key);
                }
            }
            ExpressionKind::StatusComparison => {
                for element in &self.status_comparison_elements[&expression.chunk_key()][begin..end] {
                    visit(element.comparison.left);
                    if let rules_reservoir::Rhs::Status(key) = element.comparison.right {
                        visit(key);
                    }
                }
            }
            ExpressionKind::SubExpression => {
                let keys: Vec<_> = self.sub_expression_elements[&expression.chunk_key()][begin..end]
                    .iter()
                    .map(|element| element.expression_key)
                    .collect();
                for key in keys {
                    self.for_each_dependency(key, visit);
                }
            }
        }
    }
}
