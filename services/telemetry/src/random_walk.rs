//! Bounded random walk over scalars.
//!
//! Every stateful updater goes through [`RandomWalk`]; [`Bounds::clamp`] is
//! the single place a value is forced back into its declared range.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    /// Normalises reversed ends, so `lower() <= upper()` always holds.
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self { lower: upper, upper: lower }
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// NaN collapses to the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.lower;
        }
        value.max(self.lower).min(self.upper)
    }
}

pub struct RandomWalk {
    rng: Box<dyn RngCore + Send>,
}

impl RandomWalk {
    pub fn new(rng: Box<dyn RngCore + Send>) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::new(Box::new(StdRng::from_entropy()))
    }

    /// Uniform draw in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// `current + (u - 0.5) * delta_scale`, clamped into `bounds`.
    pub fn step(&mut self, current: f64, delta_scale: f64, bounds: Bounds) -> f64 {
        let perturbation = (self.draw() - 0.5) * delta_scale;
        let next = current + perturbation;
        if next.is_finite() {
            bounds.clamp(next)
        } else if current.is_finite() {
            bounds.clamp(current)
        } else {
            bounds.clamp(next)
        }
    }

    /// Uniform signed integer step in `[-max_delta, max_delta]`, clamped.
    pub fn step_int(&mut self, current: i64, max_delta: u32, lower: i64, upper: i64) -> i64 {
        let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };
        let span = 2 * i64::from(max_delta) + 1;
        let offset = ((self.draw() * span as f64).floor() as i64).min(span - 1);
        let delta = offset - i64::from(max_delta);
        current.saturating_add(delta).clamp(lower, upper)
    }

    /// Non-negative increment `floor(u * max_exclusive)`, saturating at `upper`.
    pub fn increment(&mut self, current: u64, max_exclusive: u64, upper: u64) -> u64 {
        if max_exclusive == 0 {
            return current;
        }
        let raw = (self.draw() * max_exclusive as f64).floor() as u64;
        let delta = raw.min(max_exclusive - 1);
        current.saturating_add(delta).min(upper.max(current))
    }

    /// Bernoulli trial succeeding with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.draw() < p
    }
}
