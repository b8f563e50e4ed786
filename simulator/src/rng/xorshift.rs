//! xorshift64* random number generator
//!
//! Fast, high-quality PRNG that is deterministic and suitable for
//! simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Reproducing a cohort run exactly (`run_scenario` bit-identity)
//! - Testing (verify behavior)
//! - Research (validate results)
//!
//! The RNG is constructed once per scenario run and threaded explicitly
//! through every sampling and classification call. There is no global
//! random state anywhere in the crate.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use careflow_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let age = rng.range(35, 85); // [35, 85)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is remapped to 1 (xorshift requirement).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// Advances the internal state and returns a random value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// Used for probability draws and inverse-transform sampling.
    ///
    /// # Example
    /// ```
    /// use careflow_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let p = rng.next_f64();
    /// assert!(p >= 0.0 && p < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) using the top 53 bits
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// # Panics
    /// Panics if min > max
    pub fn uniform_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "min must not exceed max");
        min + (max - min) * self.next_f64()
    }

    /// Generate random index in [0, n)
    ///
    /// Used for categorical choices (diagnoses, fallback priority classes).
    ///
    /// # Panics
    /// Panics if n == 0
    pub fn index(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be positive");
        (self.next() % n as u64) as usize
    }

    /// Bernoulli draw with probability `p` of returning true
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Get current RNG state (for diagnostics and replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
