//! Runtime configuration
//!
//! ## Configuration (Environment Variables)
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SLASH_SORT_SEED` | unset (entropy) | Seed for `Array#sort` pivot selection |
//!
//! ## Example
//!
//! ```bash
//! # Reproduce the exact comparator call sequence of a failing sort
//! SLASH_SORT_SEED=1234 ./my-program
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;

pub const SORT_SEED_VAR: &str = "SLASH_SORT_SEED";

/// Runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Fixed seed for sort pivots; `None` seeds from entropy
    pub sort_seed: Option<u64>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let sort_seed = std::env::var(SORT_SEED_VAR)
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self { sort_seed }
    }

    pub fn with_sort_seed(mut self, seed: u64) -> Self {
        self.sort_seed = Some(seed);
        self
    }

    /// Generator for pivot selection
    pub fn pivot_rng(&self) -> StdRng {
        match self.sort_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
