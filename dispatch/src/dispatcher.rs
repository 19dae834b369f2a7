//! `Dispatcher`: the per-tick engine that wires dependencies, detects
//! transitions, and invokes delegates in priority order.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rules_evaluator::{Evaluator, ExpressionKey};
use rules_reservoir::{Reservoir, StatusKey, Ternary};

use crate::accumulator::Accumulator;
use crate::delegate::{Delegate, DelegateId};
use crate::error::DispatchError;
use crate::expression_monitor::ExpressionMonitor;
use crate::hook::Hook;
use crate::status_monitor::{DirtyKind, StatusMonitor};
use crate::transition::TransitionPredicate;

/// Construction-time tuning for a `Dispatcher`. Capacities are hints only
/// (the underlying maps/vectors grow unbounded); they exist so callers
/// with a known expression/status count can avoid incremental rehashing.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Expected number of distinct expressions monitored, used only as a
    /// log hint.
    pub expected_expressions: usize,
    /// Expected number of distinct statuses monitored, used only as a log
    /// hint.
    pub expected_statuses: usize,
    /// Initial reservation for the per-tick delegate-invocation cache.
    pub expected_cache_entries: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            expected_expressions: 64,
            expected_statuses: 64,
            expected_cache_entries: 16,
        }
    }
}

struct CacheEntry {
    delegate: Rc<dyn Delegate>,
    expression_key: ExpressionKey,
    current_eval: Ternary,
    last_eval: Ternary,
    priority: i32,
}

/// The per-tick engine tying `Reservoir` and `Evaluator` together:
/// monitors, hooks, the accumulator, and the `dispatch` pipeline itself.
pub struct Dispatcher {
    config: DispatcherConfig,
    status_monitors: BTreeMap<StatusKey, StatusMonitor>,
    expression_monitors: BTreeMap<ExpressionKey, ExpressionMonitor>,
    accumulator: Accumulator,
    in_dispatch: Cell<bool>,
    cache: Vec<CacheEntry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: DispatcherConfig) -> Self {
        log::debug!(
            "dispatcher created (expected_expressions={}, expected_statuses={})",
            config.expected_expressions,
            config.expected_statuses
        );
        Self {
            cache: Vec::with_capacity(config.expected_cache_entries),
            config,
            status_monitors: BTreeMap::new(),
            expression_monitors: BTreeMap::new(),
            accumulator: Accumulator::new(),
            in_dispatch: Cell::new(false),
        }
    }

    #[must_use]
    pub const fn config(&self) -> DispatcherConfig {
        self.config
    }

    #[must_use]
    pub fn accumulator_mut(&mut self) -> Option<&mut Accumulator> {
        if self.in_dispatch.get() {
            log::warn!("accumulator access rejected: dispatch already running");
            return None;
        }
        Some(&mut self.accumulator)
    }

    /// Registers a hook on `expression_key`. Fails if `expression_key`
    /// isn't registered with `evaluator`, the predicate is invalid, the
    /// dispatcher is mid-`dispatch`, or the `(delegate, transition)` pair
    /// is already present.
    pub fn register_hook(
        &mut self,
        evaluator: &Evaluator,
        expression_key: ExpressionKey,
        transition: TransitionPredicate,
        priority: i32,
        delegate: &Rc<dyn Delegate>,
    ) -> bool {
        match self.try_register_hook(evaluator, expression_key, transition, priority, delegate) {
            Ok(()) => true,
            Err(error) => {
                log::debug!("hook registration for {expression_key} failed: {error}");
                false
            }
        }
    }

    fn try_register_hook(
        &mut self,
        evaluator: &Evaluator,
        expression_key: ExpressionKey,
        transition: TransitionPredicate,
        priority: i32,
        delegate: &Rc<dyn Delegate>,
    ) -> Result<(), DispatchError> {
        if self.in_dispatch.get() {
            return Err(DispatchError::ReentrantDispatch);
        }
        if evaluator.find_expression(expression_key).is_none() {
            return Err(DispatchError::UnknownExpression(expression_key));
        }
        let monitor = self
            .expression_monitors
            .entry(expression_key)
            .or_insert_with(ExpressionMonitor::new);
        if monitor.add_hook(Hook::new(transition, priority, delegate)) {
            Ok(())
        } else {
            Err(DispatchError::DuplicateHook)
        }
    }

    /// Looks up the live hook on `expression_key` registered for
    /// `delegate_id`, returning its priority, or `None` if no such hook
    /// is registered or its delegate has since been dropped (including
    /// right after that drop, before the next `dispatch` call has had a
    /// chance to prune it).
    #[must_use]
    pub fn find_handler(&self, expression_key: ExpressionKey, delegate_id: DelegateId) -> Option<i32> {
        self.expression_monitors.get(&expression_key)?.hooks().iter().find_map(|hook| {
            (hook.delegate_id() == delegate_id && hook.is_alive()).then(|| hook.priority())
        })
    }

    fn wire_dependencies(&mut self, evaluator: &Evaluator) {
        let pending: Vec<ExpressionKey> = self
            .expression_monitors
            .iter()
            .filter(|(_, monitor)| !monitor.dependencies_registered())
            .map(|(key, _)| *key)
            .collect();

        for expression_key in pending {
            let contains_status_transition = evaluator.contains_status_transition(expression_key);
            let mut dependencies = Vec::new();
            evaluator.for_each_dependency(expression_key, &mut |status_key| {
                dependencies.push(status_key);
            });
            for status_key in dependencies {
                self.status_monitors
                    .entry(status_key)
                    .or_insert_with(StatusMonitor::new)
                    .insert_expression_key(expression_key);
            }
            self.expression_monitors
                .get_mut(&expression_key)
                .expect("just iterated this key")
                .mark_dependencies_registered(contains_status_transition);
        }
    }

    fn prune_dead_hooks(&mut self) {
        for monitor in self.expression_monitors.values_mut() {
            monitor.prune_dead_hooks();
        }
    }

    fn propagate_dirty_flags(&mut self, reservoir: &Reservoir, evaluator: &Evaluator) {
        let mut emptied = Vec::new();
        for (status_key, monitor) in &mut self.status_monitors {
            if monitor.shrink_expression_keys(evaluator) {
                emptied.push(*status_key);
                continue;
            }
            let transition = reservoir.find_transition(*status_key);
            let expression_monitors = &mut self.expression_monitors;
            monitor.propagate(transition, |expression_key, kind| {
                if let Some(expression_monitor) = expression_monitors.get_mut(&expression_key) {
                    match kind {
                        DirtyKind::Valid => expression_monitor.mark_dirty_valid(),
                        DirtyKind::Invalid => expression_monitor.mark_dirty_invalid(),
                    }
                }
            });
        }
        for status_key in emptied {
            self.status_monitors.remove(&status_key);
        }
    }

    /// Runs one full tick: flushes the accumulator, wires pending
    /// dependencies, prunes dead hooks, propagates dirty flags,
    /// evaluates and matches dirty expressions, resets reservoir
    /// transitions, and invokes matched delegates in ascending priority
    /// order. Re-entrant calls (from within a delegate body) are
    /// rejected and return `false` without doing anything.
    pub fn dispatch(&mut self, reservoir: &mut Reservoir, evaluator: &Evaluator) -> bool {
        if self.in_dispatch.replace(true) {
            log::warn!("reentrant dispatch() call rejected");
            debug_assert!(false, "dispatch() called while already in dispatch");
            return false;
        }

        self.accumulator.flush(reservoir);
        self.wire_dependencies(evaluator);
        self.prune_dead_hooks();
        self.propagate_dirty_flags(reservoir, evaluator);

        self.cache.clear();
        let dirty_keys: Vec<ExpressionKey> = self
            .expression_monitors
            .iter()
            .filter(|(_, monitor)| monitor.is_dirty())
            .map(|(key, _)| *key)
            .collect();

        for expression_key in dirty_keys {
            let current_eval = evaluator.evaluate_expression(expression_key, reservoir);
            let monitor = self
                .expression_monitors
                .get_mut(&expression_key)
                .expect("just iterated this key");
            let last_eval = monitor.last_eval();
            if current_eval != last_eval {
                for hook in monitor.hooks() {
                    if hook.transition().matches(current_eval, last_eval) {
                        if let Some(delegate) = hook.delegate() {
                            self.cache.push(CacheEntry {
                                delegate,
                                expression_key,
                                current_eval,
                                last_eval,
                                priority: hook.priority(),
                            });
                        }
                    }
                }
            }
            monitor.record_evaluation(current_eval);
        }

        reservoir.reset_transitions();

        self.cache.sort_by_key(|entry| entry.priority);

        for entry in &self.cache {
            entry
                .delegate
                .notify(entry.expression_key, entry.current_eval, entry.last_eval);
        }

        self.in_dispatch.set(false);
        true
    }
}
