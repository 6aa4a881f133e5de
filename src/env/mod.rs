//! Environments the agent can interact with.
//!
//! [`Environment`] is the collaborator interface the training loop drives;
//! [`CartPole`] is the built-in pole-balancing simulator.

mod cartpole;

pub use cartpole::CartPole;

use ndarray::Array1;

use crate::error::Result;

/// Extra information returned with every step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepInfo {
    /// Steps taken since the last reset, including this one.
    pub elapsed_steps: usize,
    /// The episode ended on a time limit rather than a terminal state.
    pub truncated: bool,
}

/// Result of one environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// An episodic environment with a flat observation vector and a discrete
/// action space.
pub trait Environment {
    /// Length `D` of every observation.
    fn observation_dim(&self) -> usize;

    /// Number `A` of discrete actions.
    fn num_actions(&self) -> usize;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Array1<f32>>;

    fn step(&mut self, action: usize) -> Result<Step>;

    /// Best-effort visualization. Headless environments do nothing.
    fn render(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
