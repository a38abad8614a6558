//! Failure and latency injection.
//!
//! Every gated entry point asks [`Behavior::should_fail`] with its ODBC
//! function name before doing any work, then sleeps for the configured
//! latency.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::config::{BehaviorMode, DriverConfig};

/// Decides injected failures for one session.
#[derive(Debug)]
pub struct Behavior {
    config: DriverConfig,
    rng: StdRng,
}

impl Default for Behavior {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

impl Behavior {
    pub fn new(config: DriverConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Installs a new configuration and reseeds the random source.
    pub fn configure(&mut self, config: DriverConfig) {
        *self = Self::new(config);
    }

    /// Returns true if `operation` should fail under the current mode.
    pub fn should_fail(&mut self, operation: &str) -> bool {
        let fail = match self.config.mode {
            BehaviorMode::Success => false,
            BehaviorMode::Failure => true,
            BehaviorMode::Random => self.rng.gen_range(1..=100) <= self.config.failure_probability,
            BehaviorMode::Partial => self.config.fails_on(operation),
        };
        if fail {
            warn!(operation, mode = ?self.config.mode, "injecting failure");
        }
        fail
    }

    pub fn latency(&self) -> Duration {
        self.config.latency
    }
}

/// Blocks the calling thread for `latency`, if any.
pub fn apply_latency(latency: Duration) {
    if !latency.is_zero() {
        std::thread::sleep(latency);
    }
}
