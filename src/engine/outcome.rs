//! Injectable randomness behind simulated step failures

use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Source of uniform samples in `[0, 1)`
pub trait OutcomeSource: Send + Sync {
    fn sample(&self) -> f64;

    /// Whether a step with the given failure probability fails
    fn step_fails(&self, failure_probability: f64) -> bool {
        failure_probability > 0.0 && self.sample() < failure_probability
    }
}

/// Production source drawing from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOutcomes;

impl OutcomeSource for RandomOutcomes {
    fn sample(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Always returns the same sample
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub f64);

impl FixedOutcome {
    /// A sample no failure probability below 1.0 can beat
    pub fn never_fail() -> Self {
        Self(1.0)
    }

    /// A sample every positive failure probability beats
    pub fn always_fail() -> Self {
        Self(0.0)
    }
}

impl OutcomeSource for FixedOutcome {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Replays a fixed sequence of samples, then repeats `fallback`
#[derive(Debug)]
pub struct ScriptedOutcomes {
    samples: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedOutcomes {
    pub fn new(samples: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
            fallback,
        }
    }

    /// Pass `passes` steps, then fail every step after
    pub fn fail_after(passes: usize) -> Self {
        Self::new(std::iter::repeat(1.0).take(passes), 0.0)
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn sample(&self) -> f64 {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}
