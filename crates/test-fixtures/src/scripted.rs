//! Scripted evaluator and reinforcer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use birdbone_core::errors::{BirdboneError, BirdboneResult, ModelError};
use birdbone_core::models::HealingScope;
use birdbone_core::traits::{Cancellable, CancellationToken, Evaluator, Reinforcer};

use crate::mock_model::MockModel;

/// One scripted evaluator response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eval {
    Value(f64),
    Fail,
}

/// Returns queued metric values in order. The last response repeats once
/// the queue drains.
#[derive(Debug, Clone)]
pub struct ScriptedEvaluator {
    script: Arc<Mutex<VecDeque<Eval>>>,
    last: Arc<Mutex<Eval>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedEvaluator {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self::from_script(values.into_iter().map(Eval::Value))
    }

    pub fn from_script(script: impl IntoIterator<Item = Eval>) -> Self {
        let script: VecDeque<Eval> = script.into_iter().collect();
        let last = script.back().copied().unwrap_or(Eval::Value(0.0));
        Self {
            script: Arc::new(Mutex::new(script)),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue more responses.
    pub fn push(&self, values: impl IntoIterator<Item = f64>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.extend(values.into_iter().map(Eval::Value));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(&mut self, metric_name: &str) -> BirdboneResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            script.pop_front()
        };
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let response = match next {
            Some(r) => {
                *last = r;
                r
            }
            None => *last,
        };
        match response {
            Eval::Value(v) => Ok(v),
            Eval::Fail => Err(ModelError::Access {
                reason: format!("evaluator could not compute {metric_name}"),
            }
            .into()),
        }
    }
}

/// Reinforcer returning scripted losses, optionally nudging in-scope units
/// of a `MockModel`, failing at a given step, sleeping per step, or firing
/// a cancellation token once a step count is reached.
#[derive(Debug, Clone)]
pub struct ScriptedReinforcer {
    losses: Vec<f64>,
    steps: Arc<AtomicUsize>,
    rates: Arc<Mutex<Vec<f64>>>,
    scopes: Arc<Mutex<Vec<HealingScope>>>,
    model: Option<MockModel>,
    fail_at: Option<usize>,
    cancel_at: Option<(usize, CancellationToken)>,
    delay: Option<Duration>,
}

impl ScriptedReinforcer {
    /// Step `i` reports `losses[i]`; the last loss repeats.
    pub fn new(losses: impl IntoIterator<Item = f64>) -> Self {
        Self {
            losses: losses.into_iter().collect(),
            steps: Arc::new(AtomicUsize::new(0)),
            rates: Arc::new(Mutex::new(Vec::new())),
            scopes: Arc::new(Mutex::new(Vec::new())),
            model: None,
            fail_at: None,
            cancel_at: None,
            delay: None,
        }
    }

    /// Loss that never stabilizes, so every session runs its full budget.
    pub fn descending() -> Self {
        Self::new((0..10_000).map(|i| 10.0 - i as f64 * 0.001))
    }

    /// Apply each step to the in-scope units of `model`.
    pub fn touching(mut self, model: MockModel) -> Self {
        self.model = Some(model);
        self
    }

    /// The step with this zero-based index (counted across sessions) errors.
    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Cancel `token` when the step with this zero-based index begins.
    pub fn cancelling_at(mut self, step: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((step, token));
        self
    }

    /// Block for `delay` inside every step.
    pub fn sleeping(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }

    pub fn learning_rates(&self) -> Vec<f64> {
        self.rates.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn scopes(&self) -> Vec<HealingScope> {
        self.scopes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Reinforcer for ScriptedReinforcer {
    fn step(&mut self, scope: &HealingScope, learning_rate: f64) -> BirdboneResult<f64> {
        let index = self.steps.fetch_add(1, Ordering::SeqCst);
        if let Some((at, token)) = &self.cancel_at {
            if index >= *at {
                token.cancel();
            }
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.fail_at == Some(index) {
            return Err(BirdboneError::Model(ModelError::Access {
                reason: format!("reinforcement step {index} failed"),
            }));
        }
        self.rates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(learning_rate);
        self.scopes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(scope.clone());
        if let Some(model) = &self.model {
            model.nudge(&scope.unit_ids, learning_rate as f32);
        }
        let loss = self
            .losses
            .get(index)
            .or_else(|| self.losses.last())
            .copied()
            .unwrap_or(0.0);
        Ok(loss)
    }
}
