use getset::CopyGetters;

use crate::errs::SkipListError;

/// Default cap on node height. With `p = 0.5` this comfortably indexes ~65k
/// keys before the top level saturates.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Default promotion probability.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Highest `max_level` a list will accept.
pub const MAX_LEVEL_CAP: usize = 64;

/// Construction parameters for a [`SkipList`].
///
/// [`SkipList`]: crate::skiplist::SkipList
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SkipListConfig {
    /// Highest level any node may occupy. Levels are `0..=max_level`.
    max_level: usize,
    /// Chance that a node on level `n` is also on level `n + 1`.
    probability: f64,
    /// Fixed seed for the level generator. `None` seeds from entropy.
    seed: Option<u64>,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl SkipListConfig {
    pub fn new(max_level: usize, probability: f64) -> Self {
        SkipListConfig {
            max_level,
            probability,
            seed: None,
        }
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SkipListError> {
        // written this way so NaN is rejected too
        if !(self.probability > 0.0 && self.probability < 1.0) {
            return Err(SkipListError::InvalidProbability(self.probability));
        }
        if self.max_level > MAX_LEVEL_CAP {
            return Err(SkipListError::InvalidMaxLevel(self.max_level));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SkipListConfig::default();
        assert_eq!(cfg.max_level(), DEFAULT_MAX_LEVEL);
        assert_eq!(cfg.probability(), DEFAULT_PROBABILITY);
        assert_eq!(cfg.seed(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = SkipListConfig::default()
            .with_max_level(6)
            .with_probability(0.25)
            .with_seed(42);
        assert_eq!(cfg, SkipListConfig::new(6, 0.25).with_seed(42));
    }

    #[test]
    fn test_invalid_probability() {
        for p in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let cfg = SkipListConfig::default().with_probability(p);
            assert!(matches!(
                cfg.validate(),
                Err(SkipListError::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn test_invalid_max_level() {
        let cfg = SkipListConfig::default().with_max_level(MAX_LEVEL_CAP + 1);
        assert!(matches!(
            cfg.validate(),
            Err(SkipListError::InvalidMaxLevel(_))
        ));
        assert!(SkipListConfig::default().with_max_level(0).validate().is_ok());
    }
}
