//! Randomized skill-gain profiles.
//!
//! A profile is a `subjects x learning types` matrix of mean skill gain per
//! training action. One learning type, either the first or the last, is far
//! more effective than the others, and the agent has to find out which.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::config::ProfileConfig;
use crate::error::EnvError;

#[derive(Clone, Debug, PartialEq)]
pub struct GainProfile {
    num_learning_types: usize,
    /// Row-major `subjects x learning types`
    means: Vec<f32>,
    excellence: usize,
}

impl GainProfile {
    /// Builds a profile from explicit means, mainly for scripted scenarios.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, EnvError> {
        let num_learning_types = rows.first().map_or(0, Vec::len);
        if num_learning_types == 0 || rows.iter().any(|r| r.len() != num_learning_types) {
            return Err(EnvError::InvalidShape(
                "gain profile rows must be non-empty and equally sized",
            ));
        }
        let means: Vec<f32> = rows.iter().flatten().copied().collect();
        let mut profile = Self { num_learning_types, means, excellence: 0 };
        profile.excellence = profile.best_type();
        Ok(profile)
    }

    /// Draws a new profile.
    ///
    /// A fair coin picks the first or the last learning type as the
    /// excellence type. The type means are tiled across every subject, each
    /// cell is perturbed independently and then floored at `min_gain`.
    pub fn sample<R: Rng>(
        num_subjects: usize,
        num_learning_types: usize,
        config: &ProfileConfig,
        rng: &mut R,
    ) -> Self {
        let excellence = if rng.gen::<f64>() > 0.5 { 0 } else { num_learning_types - 1 };
        let type_means: Vec<f32> = (0..num_learning_types)
            .map(|t| {
                if t == excellence {
                    gaussian(rng, config.excellence_mean, config.excellence_std)
                } else {
                    gaussian(rng, config.ordinary_mean, config.ordinary_std)
                }
            })
            .collect();

        let means = (0..num_subjects)
            .flat_map(|_| type_means.iter().copied())
            .map(|mean| (mean + gaussian(rng, 0.0, config.cell_noise_std)).max(config.min_gain))
            .collect();

        Self { num_learning_types, means, excellence }
    }

    #[must_use]
    pub fn num_subjects(&self) -> usize {
        self.means.len() / self.num_learning_types
    }

    #[must_use]
    pub fn num_learning_types(&self) -> usize {
        self.num_learning_types
    }

    #[must_use]
    pub fn mean(&self, subject: usize, learning_type: usize) -> f32 {
        self.means[subject * self.num_learning_types + learning_type]
    }

    #[must_use]
    pub fn row(&self, subject: usize) -> &[f32] {
        let start = subject * self.num_learning_types;
        &self.means[start..start + self.num_learning_types]
    }

    /// The type drawn as the excellence type when the profile was sampled.
    #[must_use]
    pub fn excellence_type(&self) -> usize {
        self.excellence
    }

    /// Learning type with the highest gain summed over the population.
    #[must_use]
    pub fn best_type(&self) -> usize {
        let mut totals = vec![0.0; self.num_learning_types];
        for row in self.means.chunks_exact(self.num_learning_types) {
            for (total, mean) in totals.iter_mut().zip(row) {
                *total += mean;
            }
        }
        argmax(&totals)
    }
}

/// One draw from `Normal(mean, std)`. `std` is assumed finite and
/// non-negative, which [`crate::EnvConfig::validate`] guarantees.
pub(crate) fn gaussian<R: Rng>(rng: &mut R, mean: f32, std: f32) -> f32 {
    let z: f32 = StandardNormal.sample(rng);
    mean + std * z
}

/// Index of the first maximum; `0` for an empty slice.
#[must_use]
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sampled_profile_favours_one_end() {
        let config = ProfileConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let p = GainProfile::sample(4, 3, &config, &mut rng);
            assert_eq!(p.num_subjects(), 4);
            let e = p.excellence_type();
            assert!(e == 0 || e == 2);
            seen[usize::from(e == 2)] = true;
            assert_eq!(p.best_type(), e);
            for s in 0..4 {
                for t in 0..3 {
                    assert!(p.mean(s, t) >= config.min_gain);
                    if t != e {
                        assert!(p.mean(s, t) < p.mean(s, e));
                    }
                }
            }
        }
        assert!(seen[0] && seen[1], "both excellence types should appear");
    }

    #[test]
    fn floor_applies_to_every_cell() {
        let config = ProfileConfig {
            ordinary_mean: -5.0,
            min_gain: 0.05,
            ..ProfileConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let p = GainProfile::sample(2, 3, &config, &mut rng);
        let floored = (0..2)
            .flat_map(|s| (0..3).map(move |t| (s, t)))
            .filter(|&(s, t)| p.mean(s, t) == 0.05);
        assert_eq!(floored.count(), 4);
    }

    #[test]
    fn single_learning_type_is_its_own_excellence() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = GainProfile::sample(3, 1, &ProfileConfig::default(), &mut rng);
        assert_eq!(p.excellence_type(), 0);
        assert_eq!(p.row(2).len(), 1);
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(GainProfile::from_rows(&[vec![1.0, 2.0], vec![1.0]]).is_err());
        let p = GainProfile::from_rows(&[vec![0.1, 2.0], vec![0.2, 1.0]]).unwrap();
        assert_eq!(p.best_type(), 1);
        assert_eq!(p.mean(1, 0), 0.2);
    }
}
