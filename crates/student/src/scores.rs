//! The observation grid.
//!
//! A [`ScoreMatrix`] is indexed by `(subject, difficulty, field)`; every cell
//! holds `2 + 2 * L` fields for `L` learning types:
//!
//! | field             | meaning                                          |
//! |-------------------|--------------------------------------------------|
//! | `0`               | last observed test score                         |
//! | `1`               | change against the previous score of the cell    |
//! | `2 .. 2 + L`      | trainings per learning type since the last test  |
//! | `2 + L .. 2 + 2L` | skill gain attributed to each learning type      |

use serde::Serialize;

use crate::config::EnvShape;

pub const SCORE: usize = 0;
pub const GAIN: usize = 1;
pub const TRAIN_COUNTS: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreMatrix {
    shape: EnvShape,
    data: Vec<f32>,
}

impl ScoreMatrix {
    #[must_use]
    pub fn zeros(shape: EnvShape) -> Self {
        let len = shape.num_subjects * shape.num_difficulty_levels * shape.fields();
        Self { shape, data: vec![0.0; len] }
    }

    #[must_use]
    pub fn shape(&self) -> EnvShape {
        self.shape
    }

    /// Flattened row-major view, the layout fed to policies.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    fn offset(&self, subject: usize, difficulty: usize) -> usize {
        (subject * self.shape.num_difficulty_levels + difficulty) * self.shape.fields()
    }

    #[must_use]
    pub fn cell(&self, subject: usize, difficulty: usize) -> &[f32] {
        let start = self.offset(subject, difficulty);
        &self.data[start..start + self.shape.fields()]
    }

    pub fn cell_mut(&mut self, subject: usize, difficulty: usize) -> &mut [f32] {
        let start = self.offset(subject, difficulty);
        let width = self.shape.fields();
        &mut self.data[start..start + width]
    }

    #[must_use]
    pub fn score(&self, subject: usize, difficulty: usize) -> f32 {
        self.cell(subject, difficulty)[SCORE]
    }

    /// Overwrites the last score of a cell without touching its gain.
    pub fn set_score(&mut self, subject: usize, difficulty: usize, score: f32) {
        self.cell_mut(subject, difficulty)[SCORE] = score;
    }

    #[must_use]
    pub fn gain(&self, subject: usize, difficulty: usize) -> f32 {
        self.cell(subject, difficulty)[GAIN]
    }

    /// Stores a new test result and its delta against the previous score.
    pub fn record_test(&mut self, subject: usize, difficulty: usize, score: f32) {
        let cell = self.cell_mut(subject, difficulty);
        cell[GAIN] = score - cell[SCORE];
        cell[SCORE] = score;
    }

    #[must_use]
    pub fn train_counts(&self, subject: usize, difficulty: usize) -> &[f32] {
        let l = self.shape.num_learning_types;
        &self.cell(subject, difficulty)[TRAIN_COUNTS..TRAIN_COUNTS + l]
    }

    pub fn train_counts_mut(&mut self, subject: usize, difficulty: usize) -> &mut [f32] {
        let l = self.shape.num_learning_types;
        &mut self.cell_mut(subject, difficulty)[TRAIN_COUNTS..TRAIN_COUNTS + l]
    }

    #[must_use]
    pub fn type_gains(&self, subject: usize, difficulty: usize) -> &[f32] {
        let l = self.shape.num_learning_types;
        &self.cell(subject, difficulty)[TRAIN_COUNTS + l..]
    }

    pub fn type_gains_mut(&mut self, subject: usize, difficulty: usize) -> &mut [f32] {
        let l = self.shape.num_learning_types;
        &mut self.cell_mut(subject, difficulty)[TRAIN_COUNTS + l..]
    }

    /// The `subject x difficulty` layer of last scores, row-major.
    #[must_use]
    pub fn score_layer(&self) -> Vec<f32> {
        self.data.chunks_exact(self.shape.fields()).map(|cell| cell[SCORE]).collect()
    }

    /// Attributed gain per learning type summed over every cell.
    #[must_use]
    pub fn total_type_gains(&self) -> Vec<f32> {
        let l = self.shape.num_learning_types;
        let mut totals = vec![0.0; l];
        for cell in self.data.chunks_exact(self.shape.fields()) {
            for (total, gain) in totals.iter_mut().zip(&cell[TRAIN_COUNTS + l..]) {
                *total += gain;
            }
        }
        totals
    }

    /// Per-cell lower and upper observation bounds.
    #[must_use]
    pub fn bounds(shape: EnvShape) -> (Vec<f32>, Vec<f32>) {
        let l = shape.num_learning_types;
        let mut low = vec![0.0, -100.0];
        low.extend(std::iter::repeat(0.0).take(l));
        low.extend(std::iter::repeat(-100.0).take(l));
        let mut high = vec![100.0, 100.0];
        high.extend(std::iter::repeat(f32::MAX).take(l));
        high.extend(std::iter::repeat(100.0).take(l));
        (low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_do_not_overlap() {
        let mut m = ScoreMatrix::zeros(EnvShape::new(2, 3, 2));
        assert_eq!(m.len(), 2 * 3 * 6);
        m.record_test(1, 2, 40.0);
        m.train_counts_mut(1, 2)[1] = 3.0;
        m.type_gains_mut(1, 2)[0] = 0.5;
        assert_eq!(m.cell(1, 2), &[40.0, 40.0, 0.0, 3.0, 0.5, 0.0]);
        assert!(m.cell(1, 1).iter().all(|v| *v == 0.0));
        assert_eq!(m.as_slice()[m.len() - 6..], [40.0, 40.0, 0.0, 3.0, 0.5, 0.0]);
    }

    #[test]
    fn record_test_stores_delta() {
        let mut m = ScoreMatrix::zeros(EnvShape::new(1, 1, 1));
        m.record_test(0, 0, 60.0);
        m.record_test(0, 0, 45.0);
        assert_eq!(m.score(0, 0), 45.0);
        assert_eq!(m.gain(0, 0), -15.0);
    }

    #[test]
    fn score_layer_and_type_totals() {
        let mut m = ScoreMatrix::zeros(EnvShape::new(2, 2, 2));
        m.set_score(0, 1, 10.0);
        m.set_score(1, 0, 20.0);
        m.type_gains_mut(0, 0)[1] = 1.0;
        m.type_gains_mut(1, 1)[1] = 2.0;
        m.type_gains_mut(1, 0)[0] = 0.5;
        assert_eq!(m.score_layer(), vec![0.0, 10.0, 20.0, 0.0]);
        assert_eq!(m.total_type_gains(), vec![0.5, 3.0]);
    }

    #[test]
    fn bounds_follow_field_layout() {
        let (low, high) = ScoreMatrix::bounds(EnvShape::new(1, 1, 2));
        assert_eq!(low, vec![0.0, -100.0, 0.0, 0.0, -100.0, -100.0]);
        assert_eq!(high[..2], [100.0, 100.0]);
        assert_eq!(high[4..], [100.0, 100.0]);
    }
}
