use serde::{Deserialize, Serialize};

use crate::error::EnvError;

const FIELD_NAMES: [&str; 5] = [
    "is_test",
    "subject",
    "test_difficulty",
    "learning_type",
    "learning_difficulty",
];

/// One multi-discrete action. Fields not used by the chosen branch are
/// still validated against their bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// `1` tests, `0` trains
    pub is_test: usize,
    pub subject: usize,
    pub test_difficulty: usize,
    pub learning_type: usize,
    pub learning_difficulty: usize,
}

impl Action {
    #[must_use]
    pub const fn test(subject: usize, difficulty: usize) -> Self {
        Self {
            is_test: 1,
            subject,
            test_difficulty: difficulty,
            learning_type: 0,
            learning_difficulty: 0,
        }
    }

    #[must_use]
    pub const fn train(subject: usize, learning_type: usize, learning_difficulty: usize) -> Self {
        Self { is_test: 0, subject, test_difficulty: 0, learning_type, learning_difficulty }
    }

    /// Builds an action from the flat `[is_test, subject, test_difficulty,
    /// learning_type, learning_difficulty]` encoding.
    pub fn from_slice(values: &[usize]) -> Result<Self, EnvError> {
        match *values {
            [is_test, subject, test_difficulty, learning_type, learning_difficulty] => Ok(Self {
                is_test,
                subject,
                test_difficulty,
                learning_type,
                learning_difficulty,
            }),
            _ => Err(EnvError::InvalidArity { expected: 5, got: values.len() }),
        }
    }

    #[must_use]
    pub const fn to_array(&self) -> [usize; 5] {
        [
            self.is_test,
            self.subject,
            self.test_difficulty,
            self.learning_type,
            self.learning_difficulty,
        ]
    }

    #[must_use]
    pub const fn is_test(&self) -> bool {
        self.is_test == 1
    }

    /// Reports the first component outside its bound.
    pub fn validate(&self, dims: &[usize; 5]) -> Result<(), EnvError> {
        for ((value, bound), field) in self.to_array().into_iter().zip(dims).zip(FIELD_NAMES) {
            if value >= *bound {
                return Err(EnvError::InvalidAction { field, value, bound: *bound });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Train,
    Test,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Train => f.write_str("train"),
            ActionKind::Test => f.write_str("test"),
        }
    }
}

/// Components that add up to a step's reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Reward of the test or training itself
    pub action: f32,
    /// `-sqrt(step_num)`
    pub step_cost: f32,
    /// Non-zero only on the step that completes every subject
    pub completion_bonus: f32,
}

impl RewardBreakdown {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.action + self.step_cost + self.completion_bonus
    }
}

/// Metadata describing the last executed action, for reporting.
///
/// Indices are zero-based; presentation layers decide how to number them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub action: ActionKind,
    pub subject: usize,
    /// Test difficulty for tests, learning difficulty for training
    pub difficulty: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_score: Option<f32>,
    /// Learning type actually applied, which the biased variant may override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_type: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f32>,
    pub reward: RewardBreakdown,
    pub step: usize,
    pub episode: usize,
}
