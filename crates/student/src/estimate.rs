//! Skill estimation from observed scores alone.
//!
//! The environment never lets estimation see latent skill: an estimator gets
//! the `subject x difficulty` layer of last scores and returns one estimate per
//! subject. It is called before and after each test so the difference can be
//! attributed to the trainings since the previous test, which requires the
//! estimate to be deterministic and non-decreasing in every score.

use std::fmt::Debug;

pub trait SkillEstimator: Debug + Send + Sync {
    /// `scores` is row-major `subjects x num_difficulty_levels`.
    fn estimate(
        &self,
        scores: &[f32],
        num_difficulty_levels: usize,
        review_ratio: f32,
    ) -> Vec<f32>;
}

/// Maps every tier onto the global `[0, 100]` scale and blends the best tier
/// with the average over all tiers.
///
/// A score `s` at tier `d` of `D` becomes `(100 * d + s) / D`; an untested
/// cell (score `0`) contributes `0`. The estimate is
/// `(1 - review_ratio) * best + review_ratio * average`, so the most advanced
/// result dominates while review results at lower tiers still add to it.
/// Both terms only grow when a score grows, including when a tier is tested
/// for the first time, and a subject with no tests is estimated at `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TieredEstimator;

impl SkillEstimator for TieredEstimator {
    fn estimate(
        &self,
        scores: &[f32],
        num_difficulty_levels: usize,
        review_ratio: f32,
    ) -> Vec<f32> {
        let levels = num_difficulty_levels as f32;
        scores
            .chunks_exact(num_difficulty_levels)
            .map(|row| {
                let mut best = 0.0_f32;
                let mut sum = 0.0;
                for (d, score) in row.iter().enumerate() {
                    if *score <= 0.0 {
                        continue;
                    }
                    let mapped = (100.0 * d as f32 + score) / levels;
                    best = best.max(mapped);
                    sum += mapped;
                }
                (1.0 - review_ratio) * best + review_ratio * sum / levels
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(row: &[f32]) -> f32 {
        TieredEstimator.estimate(row, row.len(), 0.25)[0]
    }

    #[test]
    fn untested_subject_is_zero() {
        let est = TieredEstimator.estimate(&[0.0, 0.0, 0.0, 30.0, 0.0, 0.0], 3, 0.25);
        assert_eq!(est[0], 0.0);
        // best 10, average 10 / 3
        assert!((est[1] - (0.75 * 10.0 + 0.25 * 10.0 / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn blends_best_tier_with_tier_average() {
        // tier 0 at 100 -> 33.3, tier 1 at 50 -> 50.0
        let est = single(&[100.0, 50.0, 0.0]);
        let expected = 0.75 * 50.0 + 0.25 * (100.0 / 3.0 + 50.0) / 3.0;
        assert!((est - expected).abs() < 1e-4, "{est} vs {expected}");
    }

    #[test]
    fn raising_any_score_never_lowers_the_estimate() {
        let bases = [
            [0.0, 50.0, 0.0],
            [0.0, 0.0, 30.0],
            [100.0, 0.0, 0.0],
            [60.0, 20.0, 0.0],
            [0.0, 0.0, 0.0],
        ];
        for base in bases {
            let before = single(&base);
            for d in 0..3 {
                for raised_to in [base[d] + 0.5, 10.0, 95.0, 100.0] {
                    if raised_to < base[d] || raised_to > 100.0 {
                        continue;
                    }
                    let mut raised = base;
                    raised[d] = raised_to;
                    let after = single(&raised);
                    assert!(
                        after >= before,
                        "{base:?} tier {d} -> {raised_to}: {after} < {before}"
                    );
                }
            }
        }
    }

    #[test]
    fn first_review_test_adds_to_the_estimate() {
        let before = single(&[0.0, 50.0, 0.0]);
        let after = single(&[99.0, 50.0, 0.0]);
        assert!(after > before, "{after} <= {before}");
    }

    #[test]
    fn estimate_stays_on_the_skill_scale() {
        let mastered = single(&[100.0, 100.0, 100.0]);
        assert!((mastered - (75.0 + 25.0 * 2.0 / 3.0)).abs() < 1e-4, "{mastered}");
        assert!((single(&[0.0, 0.0, 100.0]) - (75.0 + 25.0 / 3.0)).abs() < 1e-4);
    }

    #[test]
    fn repeated_calls_agree() {
        let scores = [12.5, 80.0, 3.0, 99.0];
        let a = TieredEstimator.estimate(&scores, 2, 0.25);
        let b = TieredEstimator.estimate(&scores, 2, 0.25);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
