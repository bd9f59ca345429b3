//! The student simulation environment.
//!
//! A [`StudentEnv`] owns the latent skill of one simulated student per
//! subject, the population's skill-gain profile and the observation grid. The
//! agent only ever sees the grid: latent skill drives score sampling, and the
//! grid in turn drives skill estimation, gain attribution and reward shaping.

use std::cmp::Ordering;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::action::{Action, ActionKind, RewardBreakdown, StepInfo};
use crate::config::{EnvConfig, EnvShape};
use crate::difficulty::{proper_difficulty, thresholds};
use crate::env::{Env, Step};
use crate::error::EnvError;
use crate::estimate::{SkillEstimator, TieredEstimator};
use crate::profile::{argmax, gaussian, GainProfile};
use crate::scores::ScoreMatrix;

/// Weights of the stored and the freshly attributed type gain when a test
/// result is spread across the population.
const SPREAD_WEIGHTS: (f32, f32) = (1.0, 0.5);

#[derive(Clone, Debug)]
pub struct StudentEnv {
    shape: EnvShape,
    config: EnvConfig,
    estimator: Arc<dyn SkillEstimator>,
    rng: StdRng,
    skills: Vec<f32>,
    gain_profile: GainProfile,
    thresholds: Vec<f32>,
    /// Score share kept by review material, `1 / (levels + 1)`
    review_ratio: f32,
    scores: ScoreMatrix,
    /// Row-major `subject x difficulty x learning type` attribution weights
    train_counter: Vec<f32>,
    cumulative_train_time: Vec<f32>,
    episode: usize,
    step_num: usize,
    last_info: Option<StepInfo>,
}

impl StudentEnv {
    /// Creates an environment with the default configuration and an
    /// entropy-seeded generator.
    pub fn new(shape: EnvShape) -> Result<Self, EnvError> {
        Self::with_config(shape, EnvConfig::default(), StdRng::from_entropy())
    }

    /// Creates a reproducible environment with the default configuration.
    pub fn with_seed(shape: EnvShape, seed: u64) -> Result<Self, EnvError> {
        Self::with_config(shape, EnvConfig::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_config(
        shape: EnvShape,
        config: EnvConfig,
        mut rng: StdRng,
    ) -> Result<Self, EnvError> {
        shape.validate()?;
        config.validate()?;
        let skills = sample_skills(shape.num_subjects, &config, &mut rng);
        let gain_profile = GainProfile::sample(
            shape.num_subjects,
            shape.num_learning_types,
            &config.profile,
            &mut rng,
        );
        debug!(
            ?shape,
            excellence = gain_profile.excellence_type(),
            "student environment created"
        );
        Ok(Self {
            shape,
            estimator: Arc::new(TieredEstimator),
            rng,
            skills,
            gain_profile,
            thresholds: thresholds(shape.num_difficulty_levels),
            review_ratio: 1.0 / (shape.num_difficulty_levels as f32 + 1.0),
            scores: ScoreMatrix::zeros(shape),
            train_counter: vec![
                0.0;
                shape.num_subjects * shape.num_difficulty_levels * shape.num_learning_types
            ],
            cumulative_train_time: vec![0.0; shape.num_subjects],
            episode: 0,
            step_num: 0,
            last_info: None,
            config,
        })
    }

    /// Replaces the skill estimator used for gain attribution.
    #[must_use]
    pub fn with_estimator(mut self, estimator: Arc<dyn SkillEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    #[must_use]
    pub fn shape(&self) -> EnvShape {
        self.shape
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Latent skill per subject. Never part of the observation.
    #[must_use]
    pub fn skills(&self) -> &[f32] {
        &self.skills
    }

    /// Scenario setup only; values are clamped to `[0, 100]` on the next
    /// training step.
    pub fn skills_mut(&mut self) -> &mut [f32] {
        &mut self.skills
    }

    #[must_use]
    pub fn gain_profile(&self) -> &GainProfile {
        &self.gain_profile
    }

    pub fn set_gain_profile(&mut self, profile: GainProfile) -> Result<(), EnvError> {
        if profile.num_subjects() != self.shape.num_subjects
            || profile.num_learning_types() != self.shape.num_learning_types
        {
            return Err(EnvError::InvalidShape("gain profile does not match the environment shape"));
        }
        self.gain_profile = profile;
        Ok(())
    }

    #[must_use]
    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    #[must_use]
    pub fn review_ratio(&self) -> f32 {
        self.review_ratio
    }

    #[must_use]
    pub fn scores(&self) -> &ScoreMatrix {
        &self.scores
    }

    /// Scenario setup only, e.g. to stage scores before a test.
    pub fn scores_mut(&mut self) -> &mut ScoreMatrix {
        &mut self.scores
    }

    #[must_use]
    pub fn cumulative_train_time(&self) -> &[f32] {
        &self.cumulative_train_time
    }

    /// Attribution weights per learning type of one cell.
    #[must_use]
    pub fn train_counter(&self, subject: usize, difficulty: usize) -> &[f32] {
        let start = self.counter_offset(subject, difficulty);
        &self.train_counter[start..start + self.shape.num_learning_types]
    }

    #[must_use]
    pub fn episode(&self) -> usize {
        self.episode
    }

    #[must_use]
    pub fn step_num(&self) -> usize {
        self.step_num
    }

    #[must_use]
    pub fn last_info(&self) -> Option<&StepInfo> {
        self.last_info.as_ref()
    }

    /// Current estimate per subject, computed from observed scores only.
    #[must_use]
    pub fn estimated_skills(&self) -> Vec<f32> {
        self.estimate(&self.scores.score_layer())
    }

    /// Starts a new episode: new skills, a new gain profile and an empty
    /// history. The episode counter keeps counting across resets.
    pub fn reset(&mut self) -> ScoreMatrix {
        self.skills = sample_skills(self.shape.num_subjects, &self.config, &mut self.rng);
        self.scores.clear();
        self.gain_profile = GainProfile::sample(
            self.shape.num_subjects,
            self.shape.num_learning_types,
            &self.config.profile,
            &mut self.rng,
        );
        self.thresholds = thresholds(self.shape.num_difficulty_levels);
        self.cumulative_train_time.fill(0.0);
        self.train_counter.fill(0.0);
        self.episode += 1;
        self.step_num = 0;
        self.last_info = None;
        debug!(
            episode = self.episode,
            excellence = self.gain_profile.excellence_type(),
            "episode reset"
        );
        self.scores.clone()
    }

    /// Executes one test or training action.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidAction`] when a component is out of range;
    /// the environment is left untouched in that case.
    pub fn step(&mut self, action: Action) -> Result<Step<ScoreMatrix>, EnvError> {
        action.validate(&self.shape.action_dims())?;

        let mut reward = RewardBreakdown {
            step_cost: -(self.step_num as f32).sqrt(),
            ..RewardBreakdown::default()
        };
        let mut done = false;
        let info = if action.is_test() {
            let (action_reward, score) = self.test(action.subject, action.test_difficulty);
            reward.action = action_reward;
            self.cumulative_train_time[action.subject] = 0.0;
            if self.all_levels_achieved() {
                done = true;
                reward.completion_bonus = self.config.reward_for_achieving_all_levels;
            }
            StepInfo {
                action: ActionKind::Test,
                subject: action.subject,
                difficulty: action.test_difficulty,
                test_score: Some(score),
                learning_type: None,
                improvement: None,
                reward,
                step: self.step_num,
                episode: self.episode,
            }
        } else {
            let (action_reward, improvement) =
                self.train(action.subject, action.learning_type, action.learning_difficulty);
            reward.action = action_reward;
            StepInfo {
                action: ActionKind::Train,
                subject: action.subject,
                difficulty: action.learning_difficulty,
                test_score: None,
                learning_type: Some(action.learning_type),
                improvement: Some(improvement),
                reward,
                step: self.step_num,
                episode: self.episode,
            }
        };

        trace!(step = self.step_num, ?action, reward = reward.total(), done, "step");
        self.step_num += 1;
        self.last_info = Some(info.clone());
        Ok(Step { observation: self.scores.clone(), reward: reward.total(), done, info })
    }

    /// Samples a test score and returns `(reward, score)`.
    fn test(&mut self, subject: usize, difficulty: usize) -> (f32, f32) {
        let mean = self.test_mean(subject, difficulty);
        let previous_score = self.scores.score(subject, difficulty);
        let previous_layer = self.scores.score_layer();
        let score = gaussian(&mut self.rng, mean, self.config.test_score_std).clamp(0.0, 100.0);
        self.scores.record_test(subject, difficulty, score);

        let after = self.estimate(&self.scores.score_layer())[subject];
        let improvement = after - self.estimate(&previous_layer)[subject];
        let type_gain = self.mean_type_gain(subject, difficulty, improvement);
        self.spread_type_gain(subject, &type_gain);
        self.scores.train_counts_mut(subject, difficulty).fill(0.0);

        (self.test_reward(subject, difficulty, previous_score, score), score)
    }

    fn test_reward(
        &self,
        subject: usize,
        difficulty: usize,
        previous_score: f32,
        score: f32,
    ) -> f32 {
        let config = &self.config;
        let train_time = self.cumulative_train_time[subject];
        if train_time == 0.0 {
            return config.time_penalty_for_test;
        }
        if score >= config.target_score {
            return if previous_score < config.target_score {
                config.reward_for_achieving_target_level * (difficulty + 1) as f32
                    / self.shape.num_difficulty_levels as f32
            } else {
                config.penalty_for_unnecessary_test
            };
        }
        let decay = 1.0 / (self.step_num as f32 + 1.0).sqrt();
        config.gain_multiplier_for_test * decay * ((score - previous_score) / train_time)
            + config.time_penalty_for_test
    }

    fn test_mean(&self, subject: usize, difficulty: usize) -> f32 {
        let skill = self.skills[subject];
        let proper = proper_difficulty(&self.thresholds, skill);
        match difficulty.cmp(&proper) {
            Ordering::Greater => {
                let steps_above = i32::try_from(difficulty - proper).unwrap_or(i32::MAX);
                self.review_ratio.powi(steps_above) * self.scaled_mean(skill, proper)
            }
            Ordering::Less => 100.0,
            Ordering::Equal => {
                let review = if difficulty > 0 { self.review_ratio } else { 0.0 };
                review * 100.0 + self.scaled_mean(skill, difficulty) * (1.0 - review)
            }
        }
    }

    /// Position of `skill` inside tier `difficulty`, stretched to `[0, 100)`.
    fn scaled_mean(&self, skill: f32, difficulty: usize) -> f32 {
        (skill - self.thresholds[difficulty]) * self.shape.num_difficulty_levels as f32
    }

    /// Splits an estimated improvement over the learning types trained at a
    /// cell since its last test and folds it into the running per-type gain.
    ///
    /// With no trainings at the cell the stored estimate is returned as is.
    fn mean_type_gain(&mut self, subject: usize, difficulty: usize, improvement: f32) -> Vec<f32> {
        let counts = self.scores.train_counts(subject, difficulty).to_vec();
        let stored = self.scores.type_gains(subject, difficulty).to_vec();
        let total: f32 = counts.iter().sum();
        if total <= 0.0 {
            return stored;
        }

        let new_gain = improvement / total;
        let start = self.counter_offset(subject, difficulty);
        let weights = &mut self.train_counter[start..start + self.shape.num_learning_types];
        let mut result = Vec::with_capacity(counts.len());
        for ((count, old), weight) in counts.iter().zip(&stored).zip(weights.iter_mut()) {
            let ratio = count / total;
            let gain = if *weight == 0.0 {
                new_gain
            } else {
                (old * *weight + new_gain * ratio) / (*weight + ratio)
            };
            result.push(gain);
            *weight += ratio;
        }
        result
    }

    /// Writes `type_gain` to every tier of `subject`, then blends it into
    /// every subject's tiers so the population shares what one test showed.
    fn spread_type_gain(&mut self, subject: usize, type_gain: &[f32]) {
        let (keep, fresh) = SPREAD_WEIGHTS;
        for d in 0..self.shape.num_difficulty_levels {
            self.scores.type_gains_mut(subject, d).copy_from_slice(type_gain);
            for s in 0..self.shape.num_subjects {
                for (stored, gain) in self.scores.type_gains_mut(s, d).iter_mut().zip(type_gain) {
                    *stored = (*stored * keep + gain * fresh) / (keep + fresh);
                }
            }
        }
    }

    /// Applies one training action and returns `(reward, skill improvement)`.
    fn train(
        &mut self,
        subject: usize,
        learning_type: usize,
        learning_difficulty: usize,
    ) -> (f32, f32) {
        let mean_gain = self.gain_profile.mean(subject, learning_type);
        let sampled = gaussian(&mut self.rng, mean_gain, self.config.student_skill_gain_std);
        let penalty = self.not_adapted_penalty(self.skills[subject], learning_difficulty);
        let improvement = (sampled * penalty).max(0.0);
        self.skills[subject] = (self.skills[subject] + improvement).clamp(0.0, 100.0);

        self.cumulative_train_time[subject] += (learning_type + 1) as f32;
        self.scores.train_counts_mut(subject, learning_difficulty)[learning_type] += 1.0;

        let predicted_best = argmax(&self.scores.total_type_gains());
        let truly_best = learning_type == self.gain_profile.best_type();
        let reward = if truly_best && learning_type == predicted_best {
            self.config.proper_learning_type_reward
        } else {
            0.0
        };
        (reward, improvement)
    }

    fn not_adapted_penalty(&self, skill: f32, learning_difficulty: usize) -> f32 {
        let proper = proper_difficulty(&self.thresholds, skill);
        let distance = i32::try_from(learning_difficulty.abs_diff(proper)).unwrap_or(i32::MAX);
        self.config.not_adapted_difficulty_penalty.powi(distance)
    }

    fn all_levels_achieved(&self) -> bool {
        let top = self.shape.num_difficulty_levels - 1;
        (0..self.shape.num_subjects).all(|s| self.scores.score(s, top) > self.config.target_score)
    }

    fn estimate(&self, score_layer: &[f32]) -> Vec<f32> {
        self.estimator.estimate(
            score_layer,
            self.shape.num_difficulty_levels,
            self.config.estimator_review_ratio,
        )
    }

    fn counter_offset(&self, subject: usize, difficulty: usize) -> usize {
        (subject * self.shape.num_difficulty_levels + difficulty) * self.shape.num_learning_types
    }
}

fn sample_skills(num_subjects: usize, config: &EnvConfig, rng: &mut StdRng) -> Vec<f32> {
    (0..num_subjects)
        .map(|_| {
            let skill =
                gaussian(rng, config.mean_start_skill_level, config.std_start_skill_level);
            skill.clamp(0.0, 100.0)
        })
        .collect()
}

impl Env for StudentEnv {
    type Action = Action;
    type Observation = ScoreMatrix;

    fn step(&mut self, action: Action) -> Result<Step<ScoreMatrix>, EnvError> {
        StudentEnv::step(self, action)
    }

    fn reset(&mut self) -> ScoreMatrix {
        StudentEnv::reset(self)
    }

    fn obs_size(&self) -> usize {
        self.scores.len()
    }

    fn action_dims(&self) -> Vec<usize> {
        self.shape.action_dims().to_vec()
    }
}

/// An [`Env`] backed by a [`StudentEnv`], as consumed by drivers and
/// reporting code.
pub trait StudentSimulation: Env<Action = Action, Observation = ScoreMatrix> {
    fn student(&self) -> &StudentEnv;

    /// Short description used in structured logs.
    fn label(&self) -> String;
}

impl StudentSimulation for StudentEnv {
    fn student(&self) -> &StudentEnv {
        self
    }

    fn label(&self) -> String {
        "original".to_string()
    }
}
