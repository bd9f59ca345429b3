//! Action policies driving the environment.
//!
//! Neither policy learns; they are baselines that exercise the environment
//! contract and give reference returns for learned agents.

use rand::rngs::StdRng;
use rand::Rng;
use student::{Action, EnvShape, ScoreMatrix};

pub trait Policy {
    fn act(&mut self, obs: &ScoreMatrix) -> Action;

    fn name(&self) -> &'static str;
}

/// Samples every action component uniformly within its bound.
pub struct RandomAgent {
    dims: [usize; 5],
    rng: StdRng,
}

impl RandomAgent {
    #[must_use]
    pub fn new(shape: EnvShape, rng: StdRng) -> Self {
        Self { dims: shape.action_dims(), rng }
    }
}

impl Policy for RandomAgent {
    fn act(&mut self, _obs: &ScoreMatrix) -> Action {
        let [is_test, subject, test_difficulty, learning_type, learning_difficulty] =
            self.dims.map(|bound| self.rng.gen_range(0..bound));
        Action { is_test, subject, test_difficulty, learning_type, learning_difficulty }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Round-robin curriculum with a fixed learning type, which must be below
/// `shape.num_learning_types`.
///
/// Each subject is trained `trainings_per_test` times at its lowest tier not
/// yet above `target_score`, then tested at that tier, then the next subject
/// with work left takes its turn.
pub struct ScriptedAgent {
    shape: EnvShape,
    learning_type: usize,
    trainings_per_test: usize,
    target_score: f32,
    subject: usize,
    trained: usize,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new(
        shape: EnvShape,
        learning_type: usize,
        trainings_per_test: usize,
        target_score: f32,
    ) -> Self {
        Self {
            shape,
            learning_type,
            trainings_per_test,
            target_score,
            subject: 0,
            trained: 0,
        }
    }

    fn open_tier(&self, obs: &ScoreMatrix, subject: usize) -> Option<usize> {
        (0..self.shape.num_difficulty_levels).find(|&d| obs.score(subject, d) <= self.target_score)
    }

    fn advance(&mut self) {
        self.subject = (self.subject + 1) % self.shape.num_subjects;
        self.trained = 0;
    }
}

impl Policy for ScriptedAgent {
    fn act(&mut self, obs: &ScoreMatrix) -> Action {
        let top = self.shape.num_difficulty_levels - 1;
        let mut tier = None;
        for _ in 0..self.shape.num_subjects {
            tier = self.open_tier(obs, self.subject);
            if tier.is_some() {
                break;
            }
            self.advance();
        }
        let Some(tier) = tier else {
            return Action::test(self.subject, top);
        };

        if self.trained < self.trainings_per_test {
            self.trained += 1;
            return Action::train(self.subject, self.learning_type, tier);
        }
        let action = Action::test(self.subject, tier);
        self.advance();
        action
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn random_actions_stay_in_bounds() {
        let shape = EnvShape::new(2, 3, 4);
        let mut agent = RandomAgent::new(shape, StdRng::seed_from_u64(0));
        let obs = ScoreMatrix::zeros(shape);
        let dims = shape.action_dims();
        for _ in 0..500 {
            assert!(agent.act(&obs).validate(&dims).is_ok());
        }
    }

    #[test]
    fn scripted_trains_then_tests_round_robin() {
        let shape = EnvShape::new(2, 3, 3);
        let mut agent = ScriptedAgent::new(shape, 2, 2, 95.0);
        let mut obs = ScoreMatrix::zeros(shape);
        obs.set_score(1, 0, 97.0);

        assert_eq!(agent.act(&obs), Action::train(0, 2, 0));
        assert_eq!(agent.act(&obs), Action::train(0, 2, 0));
        assert_eq!(agent.act(&obs), Action::test(0, 0));
        // subject 1 already passed tier 0
        assert_eq!(agent.act(&obs), Action::train(1, 2, 1));
    }

    #[test]
    fn scripted_skips_finished_subjects() {
        let shape = EnvShape::new(2, 1, 1);
        let mut agent = ScriptedAgent::new(shape, 0, 0, 95.0);
        let mut obs = ScoreMatrix::zeros(shape);
        obs.set_score(0, 0, 99.0);
        assert_eq!(agent.act(&obs), Action::test(1, 0));
        obs.set_score(1, 0, 99.0);
        assert_eq!(agent.act(&obs).is_test, 1);
    }
}
