//! Environment variant that ignores the requested learning type.
//!
//! [`BiasedTrainingEnv`] wraps a [`StudentEnv`] and rewrites only the
//! learning type of training actions, drawing it from a fixed categorical
//! distribution. Everything else is delegated, so tests, rewards and the
//! completion check behave exactly as in the wrapped environment.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::action::Action;
use crate::config::{BiasConfig, EnvShape};
use crate::env::{Env, Step};
use crate::error::EnvError;
use crate::profile::argmax;
use crate::scores::ScoreMatrix;
use crate::simulator::{StudentEnv, StudentSimulation};

#[derive(Clone, Debug)]
pub struct BiasedTrainingEnv {
    inner: StudentEnv,
    probabilities: Vec<f32>,
    learning_types: WeightedIndex<f32>,
    rng: StdRng,
}

impl BiasedTrainingEnv {
    /// Wraps `inner` directly. The learning-type draws use their own
    /// generator so the wrapped environment's random stream is unaffected.
    pub fn new(inner: StudentEnv, bias: &BiasConfig, seed: u64) -> Result<Self, EnvError> {
        bias.validate(inner.shape().num_learning_types)?;
        let learning_types = WeightedIndex::new(&bias.probabilities)
            .map_err(|e| EnvError::InvalidConfig(format!("bias probabilities: {e}")))?;
        Ok(Self {
            inner,
            probabilities: bias.probabilities.clone(),
            learning_types,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Copies the full state of `base`, leaving `base` itself untouched.
    pub fn from_env(base: &StudentEnv, bias: &BiasConfig, seed: u64) -> Result<Self, EnvError> {
        Self::new(base.clone(), bias, seed)
    }

    /// Builds a fresh wrapped environment using `config.bias`.
    pub fn with_seed(shape: EnvShape, seed: u64) -> Result<Self, EnvError> {
        let inner = StudentEnv::with_seed(shape, seed)?;
        let bias = inner.config().bias.clone();
        Self::new(inner, &bias, seed.wrapping_add(1))
    }

    #[must_use]
    pub fn inner(&self) -> &StudentEnv {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut StudentEnv {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> StudentEnv {
        self.inner
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Replaces the learning type of training actions with a biased draw.
    fn interpret(&mut self, mut action: Action) -> Action {
        if !action.is_test() {
            let requested = action.learning_type;
            action.learning_type = self.learning_types.sample(&mut self.rng);
            trace!(requested, applied = action.learning_type, "learning type overridden");
        }
        action
    }

    /// Validates, reinterprets and then delegates to the wrapped environment.
    pub fn step(&mut self, action: Action) -> Result<Step<ScoreMatrix>, EnvError> {
        action.validate(&self.inner.shape().action_dims())?;
        let action = self.interpret(action);
        self.inner.step(action)
    }

    pub fn reset(&mut self) -> ScoreMatrix {
        self.inner.reset()
    }
}

impl Env for BiasedTrainingEnv {
    type Action = Action;
    type Observation = ScoreMatrix;

    fn step(&mut self, action: Action) -> Result<Step<ScoreMatrix>, EnvError> {
        BiasedTrainingEnv::step(self, action)
    }

    fn reset(&mut self) -> ScoreMatrix {
        BiasedTrainingEnv::reset(self)
    }

    fn obs_size(&self) -> usize {
        self.inner.obs_size()
    }

    fn action_dims(&self) -> Vec<usize> {
        self.inner.action_dims()
    }
}

impl StudentSimulation for BiasedTrainingEnv {
    fn student(&self) -> &StudentEnv {
        &self.inner
    }

    fn label(&self) -> String {
        format!("bias for {} learning type", argmax(&self.probabilities) + 1)
    }
}
