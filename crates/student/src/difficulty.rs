/// `num_levels` evenly spaced thresholds covering `[0, 100)`, ascending.
#[must_use]
pub fn thresholds(num_levels: usize) -> Vec<f32> {
    (0..num_levels).map(|i| 100.0 * i as f32 / num_levels as f32).collect()
}

/// Index of the highest tier whose threshold `skill` has reached.
///
/// The first threshold is always `0`, so any non-negative skill lands in at
/// least tier `0`.
#[must_use]
pub fn proper_difficulty(thresholds: &[f32], skill: f32) -> usize {
    thresholds.iter().filter(|t| **t <= skill).count().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_evenly_spaced() {
        assert_eq!(thresholds(1), vec![0.0]);
        assert_eq!(thresholds(4), vec![0.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn boundary_belongs_to_upper_tier() {
        let t = [0.0, 33.3, 66.7];
        assert_eq!(proper_difficulty(&t, 33.3), 1);
        assert_eq!(proper_difficulty(&t, 33.29), 0);
        assert_eq!(proper_difficulty(&t, 0.0), 0);
        assert_eq!(proper_difficulty(&t, 66.7), 2);
        assert_eq!(proper_difficulty(&t, 100.0), 2);
    }
}
