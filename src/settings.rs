use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Smallest lattice edge the generator accepts
pub const MIN_SIZE: usize = 5;
/// Largest lattice edge the generator accepts
pub const MAX_SIZE: usize = 50;

pub const DEFAULT_SIZE: usize = 20;
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Parameters that drive each regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercolationSettings {
    /// Lattice edge length (5-50)
    pub size: usize,
    /// Site occupation probability (0.0-1.0)
    pub probability: f64,
    /// Fixed RNG seed for reproducible sessions; None draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PercolationSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

/// Clamp any requested edge length into the supported range
pub fn clamp_size(size: i64) -> usize {
    size.clamp(MIN_SIZE as i64, MAX_SIZE as i64) as usize
}

/// Clamp a probability into 0.0-1.0, treating NaN as 0.0
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

impl PercolationSettings {
    /// Build settings from raw user input, clamping both parameters
    pub fn clamped(size: i64, probability: f64, seed: Option<u64>) -> Self {
        Self {
            size: clamp_size(size),
            probability: clamp_probability(probability),
            seed,
        }
    }

    /// Bring a possibly hand-edited settings value back into range
    pub fn normalized(self) -> Self {
        Self::clamped(self.size as i64, self.probability, self.seed)
    }

    /// Random source for a session: seeded when `seed` is set
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Adjust size within bounds
    pub fn adjust_size(&mut self, delta: i64) {
        self.size = clamp_size(self.size as i64 + delta);
    }

    /// Adjust probability within bounds, rounded to two decimals
    pub fn adjust_probability(&mut self, delta: f64) {
        let value = clamp_probability(self.probability + delta);
        self.probability = (value * 100.0).round() / 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(-3), MIN_SIZE);
        assert_eq!(clamp_size(4), MIN_SIZE);
        assert_eq!(clamp_size(17), 17);
        assert_eq!(clamp_size(500), MAX_SIZE);
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(-0.5), 0.0);
        assert_eq!(clamp_probability(0.25), 0.25);
        assert_eq!(clamp_probability(1.5), 1.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
    }

    #[test]
    fn test_adjust_stays_in_bounds() {
        let mut settings = PercolationSettings::default();
        settings.adjust_size(100);
        assert_eq!(settings.size, MAX_SIZE);
        settings.adjust_size(-100);
        assert_eq!(settings.size, MIN_SIZE);

        settings.probability = 0.99;
        settings.adjust_probability(0.01);
        assert_eq!(settings.probability, 1.0);
        settings.adjust_probability(0.01);
        assert_eq!(settings.probability, 1.0);
        settings.probability = 0.0;
        settings.adjust_probability(-0.01);
        assert_eq!(settings.probability, 0.0);
    }

    #[test]
    fn test_adjust_probability_rounds() {
        let mut settings = PercolationSettings::default();
        for _ in 0..3 {
            settings.adjust_probability(0.01);
        }
        assert_eq!(settings.probability, 0.53);
    }

    #[test]
    fn test_seeded_rng_repeats() {
        use rand::Rng;
        let settings = PercolationSettings {
            seed: Some(5),
            ..Default::default()
        };
        let a: u64 = settings.rng().gen();
        let b: u64 = settings.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalized() {
        let raw = PercolationSettings {
            size: 1000,
            probability: -2.0,
            seed: Some(9),
        };
        let fixed = raw.normalized();
        assert_eq!(fixed.size, MAX_SIZE);
        assert_eq!(fixed.probability, 0.0);
        assert_eq!(fixed.seed, Some(9));
    }
}
