//! Solver parameters.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters of the stochastic proximity embedding solver.
///
/// The learning rate starts at `initial_lambda` and decreases linearly to 0
/// over `cycles` outer iterations; each cycle performs
/// `steps_per_point × n` pair updates for a batch of `n` ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeConfig {
    /// Number of outer iterations.
    pub cycles: usize,
    /// Pair updates per cycle, per id in the batch.
    pub steps_per_point: usize,
    /// Learning rate of the first cycle.
    pub initial_lambda: f64,
    /// Guards the correction against division by a vanishing distance.
    pub epsilon: f64,
    /// Random seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SpeConfig {
    fn default() -> Self {
        Self {
            cycles: 100,
            steps_per_point: 10,
            initial_lambda: 1.0,
            epsilon: 1e-5,
            seed: None,
        }
    }
}

impl SpeConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of outer iterations.
    pub fn with_cycles(mut self, cycles: usize) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the pair updates per cycle per id.
    pub fn with_steps_per_point(mut self, steps: usize) -> Self {
        self.steps_per_point = steps;
        self
    }

    /// Set the starting learning rate.
    pub fn with_initial_lambda(mut self, lambda: f64) -> Self {
        self.initial_lambda = lambda;
        self
    }

    /// Set the division guard.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject parameters the solver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cycles == 0 {
            return Err(Error::InvalidParameter {
                name: "cycles",
                message: "must be at least 1",
            });
        }
        if self.steps_per_point == 0 {
            return Err(Error::InvalidParameter {
                name: "steps_per_point",
                message: "must be at least 1",
            });
        }
        if !(self.initial_lambda.is_finite() && self.initial_lambda > 0.0) {
            return Err(Error::InvalidParameter {
                name: "initial_lambda",
                message: "must be positive and finite",
            });
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        Ok(())
    }

    /// Learning rate used during `cycle` (0-based).
    pub fn lambda_at(&self, cycle: usize) -> f64 {
        self.initial_lambda * (1.0 - cycle as f64 / self.cycles as f64)
    }

    /// Random source for one embedding run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        }
    }
}
