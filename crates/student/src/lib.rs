#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::float_cmp
)]
//! # Student Simulation Environment
//!
//! A stochastic simulator of students whose latent skill evolves under
//! training and testing, exposed as a reinforcement learning environment.
//!
//! An agent picks, at every step, whether to **test** a subject at some
//! difficulty tier or to **train** it with one of several learning types at
//! some tier. The environment keeps the latent skill hidden and answers with
//! the grid of observed scores, the per-type training counts since each test
//! and the gain it attributes to each learning type.
//!
//! ## Key Components
//!
//! -   [`StudentEnv`] in the [`simulator`] module owns all state and runs the
//!     skill dynamics, test sampling, gain attribution and reward shaping.
//! -   [`BiasedTrainingEnv`] in the [`biased`] module wraps a `StudentEnv` and
//!     forces a skewed choice of learning type on every training step.
//! -   [`GainProfile`] draws the population's per-type effectiveness, where
//!     one learning type is far better than the others.
//! -   [`SkillEstimator`] reconstructs skill from scores alone;
//!     [`TieredEstimator`] is the default.
//! -   [`EnvConfig`] carries every reward magnitude and distribution
//!     parameter.
//!
//! ## Usage
//!
//! ```rust
//! use student::{Action, EnvShape, StudentEnv};
//!
//! let mut env = StudentEnv::with_seed(EnvShape::new(2, 3, 3), 7)?;
//! let obs = env.reset();
//! assert!(obs.as_slice().iter().all(|v| *v == 0.0));
//!
//! let step = env.step(Action::train(0, 2, 0))?;
//! assert!(!step.done);
//! let step = env.step(Action::test(0, 0))?;
//! assert!(step.observation.score(0, 0) >= 0.0);
//! # Ok::<(), student::EnvError>(())
//! ```

pub mod action;
pub mod biased;
pub mod config;
pub mod difficulty;
pub mod env;
pub mod error;
pub mod estimate;
pub mod profile;
pub mod scores;
pub mod simulator;

pub use action::{Action, ActionKind, RewardBreakdown, StepInfo};
pub use biased::BiasedTrainingEnv;
pub use config::{BiasConfig, EnvConfig, EnvShape, ProfileConfig};
pub use difficulty::{proper_difficulty, thresholds};
pub use env::{Env, Step};
pub use error::EnvError;
pub use estimate::{SkillEstimator, TieredEstimator};
pub use profile::GainProfile;
pub use scores::ScoreMatrix;
pub use simulator::{StudentEnv, StudentSimulation};
