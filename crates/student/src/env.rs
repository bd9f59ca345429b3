use crate::action::StepInfo;
use crate::error::EnvError;

/// Outcome of a single [`Env::step`].
#[derive(Clone, Debug)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// Reinforcement learning environment trait.
///
/// Each call to [`step`] consumes one action and advances the simulation,
/// returning the new observation, a reward signal, whether the episode has
/// terminated and a metadata record describing what happened. Actions outside
/// [`action_dims`] are rejected before any state changes.
///
/// [`step`]: Env::step
/// [`action_dims`]: Env::action_dims
pub trait Env {
    type Action;
    type Observation;

    /// Advance the environment by one action.
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::Observation>, EnvError>;

    /// Reset the environment to a fresh episode and return the initial
    /// observation.
    fn reset(&mut self) -> Self::Observation;

    /// Length of the flattened observation.
    fn obs_size(&self) -> usize;

    /// Exclusive upper bound of every action component.
    fn action_dims(&self) -> Vec<usize>;
}
