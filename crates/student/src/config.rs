//! Environment configuration.
//!
//! Every reward magnitude and distribution parameter used by the simulator is
//! carried by an immutable [`EnvConfig`] handed to the environment at
//! construction. Missing fields in a JSON document fall back to the defaults
//! below, so a config file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Dimensions of a simulated student.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvShape {
    pub num_subjects: usize,
    pub num_difficulty_levels: usize,
    pub num_learning_types: usize,
}

impl EnvShape {
    #[must_use]
    pub const fn new(
        num_subjects: usize,
        num_difficulty_levels: usize,
        num_learning_types: usize,
    ) -> Self {
        Self { num_subjects, num_difficulty_levels, num_learning_types }
    }

    /// Width of the per-cell observation vector: score, gain, then one train
    /// count and one attributed gain per learning type.
    #[must_use]
    pub const fn fields(&self) -> usize {
        2 + 2 * self.num_learning_types
    }

    /// Multi-discrete bounds of an action:
    /// `[is_test, subject, test_difficulty, learning_type, learning_difficulty]`.
    #[must_use]
    pub const fn action_dims(&self) -> [usize; 5] {
        [
            2,
            self.num_subjects,
            self.num_difficulty_levels,
            self.num_learning_types,
            self.num_difficulty_levels,
        ]
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if self.num_subjects == 0 {
            return Err(EnvError::InvalidShape("at least one subject is required"));
        }
        if self.num_difficulty_levels == 0 {
            return Err(EnvError::InvalidShape("at least one difficulty level is required"));
        }
        if self.num_learning_types == 0 {
            return Err(EnvError::InvalidShape("at least one learning type is required"));
        }
        Ok(())
    }
}

impl Default for EnvShape {
    fn default() -> Self {
        Self::new(3, 3, 3)
    }
}

/// Parameters of the randomized skill-gain profile generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Mean gain of the excellence learning type
    pub excellence_mean: f32,
    pub excellence_std: f32,
    /// Mean gain of every other learning type
    pub ordinary_mean: f32,
    pub ordinary_std: f32,
    /// Independent per-cell perturbation applied after tiling across subjects
    pub cell_noise_std: f32,
    /// Floor applied to every cell of the profile
    pub min_gain: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            excellence_mean: 3.0,
            excellence_std: 0.2,
            ordinary_mean: 0.3,
            ordinary_std: 0.1,
            cell_noise_std: 0.05,
            min_gain: 0.05,
        }
    }
}

/// Learning-type distribution forced on training steps by the biased variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    pub probabilities: Vec<f32>,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self { probabilities: vec![0.8, 0.1, 0.1] }
    }
}

impl BiasConfig {
    pub fn validate(&self, num_learning_types: usize) -> Result<(), EnvError> {
        if self.probabilities.len() != num_learning_types {
            return Err(EnvError::InvalidConfig(format!(
                "bias probabilities have {} entries but there are {} learning types",
                self.probabilities.len(),
                num_learning_types
            )));
        }
        if self.probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(EnvError::InvalidConfig(
                "bias probabilities must be finite and non-negative".to_string(),
            ));
        }
        let sum: f32 = self.probabilities.iter().sum();
        if (sum - 1.0).abs() > 1e-4 {
            return Err(EnvError::InvalidConfig(format!(
                "bias probabilities must sum to 1, got {sum}"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub mean_start_skill_level: f32,
    pub std_start_skill_level: f32,
    /// Per-action noise around a student's mean skill gain
    pub student_skill_gain_std: f32,
    pub test_score_std: f32,
    /// Score at or above which a tier counts as passed
    pub target_score: f32,
    /// Down-weighting of lower tiers used by the skill estimator
    pub estimator_review_ratio: f32,
    pub reward_for_achieving_target_level: f32,
    pub reward_for_achieving_all_levels: f32,
    pub penalty_for_unnecessary_test: f32,
    pub time_penalty_for_test: f32,
    pub gain_multiplier_for_test: f32,
    /// Base of the exponential penalty for training away from the proper tier
    pub not_adapted_difficulty_penalty: f32,
    /// Bonus for training with the type that is both truly and apparently best
    pub proper_learning_type_reward: f32,
    pub profile: ProfileConfig,
    pub bias: BiasConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            mean_start_skill_level: 20.0,
            std_start_skill_level: 10.0,
            student_skill_gain_std: 0.2,
            test_score_std: 0.5,
            target_score: 95.0,
            estimator_review_ratio: 0.25,
            reward_for_achieving_target_level: 200.0,
            reward_for_achieving_all_levels: 2000.0,
            penalty_for_unnecessary_test: -700.0,
            time_penalty_for_test: -2.0,
            gain_multiplier_for_test: 0.0,
            not_adapted_difficulty_penalty: 0.25,
            proper_learning_type_reward: 0.0,
            profile: ProfileConfig::default(),
            bias: BiasConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, EnvError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EnvError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the distribution parameters. The bias vector is checked
    /// separately by the variant since it depends on the shape.
    pub fn validate(&self) -> Result<(), EnvError> {
        let stds = [
            ("std_start_skill_level", self.std_start_skill_level),
            ("student_skill_gain_std", self.student_skill_gain_std),
            ("test_score_std", self.test_score_std),
            ("profile.excellence_std", self.profile.excellence_std),
            ("profile.ordinary_std", self.profile.ordinary_std),
            ("profile.cell_noise_std", self.profile.cell_noise_std),
        ];
        for (name, std) in stds {
            if !std.is_finite() || std < 0.0 {
                return Err(EnvError::InvalidConfig(format!(
                    "{name} must be a finite non-negative standard deviation, got {std}"
                )));
            }
        }
        if !(self.target_score > 0.0 && self.target_score <= 100.0) {
            return Err(EnvError::InvalidConfig(format!(
                "target_score must lie in (0, 100], got {}",
                self.target_score
            )));
        }
        if !(self.estimator_review_ratio > 0.0 && self.estimator_review_ratio <= 1.0) {
            return Err(EnvError::InvalidConfig(format!(
                "estimator_review_ratio must lie in (0, 1], got {}",
                self.estimator_review_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.not_adapted_difficulty_penalty) {
            return Err(EnvError::InvalidConfig(format!(
                "not_adapted_difficulty_penalty must lie in [0, 1], got {}",
                self.not_adapted_difficulty_penalty
            )));
        }
        Ok(())
    }
}
