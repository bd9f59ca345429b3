//! # Episode Driver
//!
//! Runs a [`Policy`] against any [`StudentSimulation`]: every episode starts
//! with a reset and steps until the environment reports completion or the
//! step limit is reached. Each step goes through the [`Reporter`], which
//! renders it and appends it to the JSON-lines log when those are enabled.

use anyhow::Result;
use serde::Serialize;
use student::StudentSimulation;

use crate::agent::Policy;
use crate::render::Reporter;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub done: bool,
}

/// Runs one episode and summarises it.
///
/// # Errors
///
/// Returns an error when the policy produces an action the environment
/// rejects or when writing the step log fails.
pub fn run_episode<E: StudentSimulation>(
    policy: &mut dyn Policy,
    env: &mut E,
    num_steps: usize,
    reporter: &mut Reporter,
) -> Result<EpisodeSummary> {
    let mut obs = env.reset();
    let mut total_reward = 0.0;
    let mut steps = 0;
    let mut done = false;
    while steps < num_steps && !done {
        let action = policy.act(&obs);
        let step = env.step(action)?;
        reporter.record(env, &step.info)?;
        total_reward += step.reward;
        done = step.done;
        obs = step.observation;
        steps += 1;
    }
    Ok(EpisodeSummary { episode: env.student().episode(), steps, total_reward, done })
}

/// Runs `num_episodes` episodes, logging a summary after each.
///
/// # Errors
///
/// Propagates the first error of [`run_episode`].
pub fn run_env<E: StudentSimulation>(
    policy: &mut dyn Policy,
    env: &mut E,
    num_episodes: usize,
    num_steps: usize,
    reporter: &mut Reporter,
) -> Result<Vec<EpisodeSummary>> {
    tracing::info!(
        "Running {} episodes of at most {} steps with the {} policy on the {} environment...",
        num_episodes,
        num_steps,
        policy.name(),
        env.label()
    );
    let mut summaries = Vec::with_capacity(num_episodes);
    for _ in 0..num_episodes {
        let summary = run_episode(policy, env, num_steps, reporter)?;
        tracing::info!(
            episode = summary.episode,
            steps = summary.steps,
            total_reward = summary.total_reward,
            done = summary.done,
            "Episode finished. Gain profile: {:?}",
            (0..env.student().shape().num_subjects)
                .map(|s| env.student().gain_profile().row(s).to_vec())
                .collect::<Vec<_>>()
        );
        summaries.push(summary);
    }
    reporter.flush()?;
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{RandomAgent, ScriptedAgent};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use student::{BiasedTrainingEnv, EnvShape, StudentEnv};

    #[test]
    fn episodes_respect_the_step_limit() {
        let shape = EnvShape::new(2, 3, 3);
        let mut env = StudentEnv::with_seed(shape, 1).unwrap();
        let mut policy = RandomAgent::new(shape, StdRng::seed_from_u64(2));
        let mut reporter = Reporter::new(false, None).unwrap();
        let summaries = run_env(&mut policy, &mut env, 3, 50, &mut reporter).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries.iter().map(|s| s.episode).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(summaries.iter().all(|s| s.steps <= 50 && s.total_reward.is_finite()));
    }

    #[test]
    fn scripted_policy_finishes_an_easy_population() {
        let shape = EnvShape::new(1, 1, 3);
        let env = StudentEnv::with_seed(shape, 3).unwrap();
        let bias = student::BiasConfig::default();
        let mut env = BiasedTrainingEnv::from_env(&env, &bias, 4).unwrap();
        let mut policy = ScriptedAgent::new(shape, 0, 5, 95.0);
        let mut reporter = Reporter::new(false, None).unwrap();
        let summary = run_episode(&mut policy, &mut env, 5_000, &mut reporter).unwrap();
        assert!(summary.done, "{summary:?}");
        assert!(summary.steps < 5_000);
    }
}
