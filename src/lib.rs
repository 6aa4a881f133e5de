//! # cartpole-dqn
//!
//! Deep Q-learning with experience replay for the cart-pole balancing task.
//!
//! The agent interacts with an [`env::Environment`], stores every
//! transition in a fixed-capacity [`replay_buffer::ReplayBuffer`], samples
//! mini-batches with replacement, computes Bellman targets with terminal
//! masking and takes one Adam step on a small feed-forward
//! [`network::QNetwork`] per environment step.
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and linear activations
//! - [`agent`] - The DQN agent and the `QFunction` trait
//! - [`config`] - Serde-backed run configuration
//! - [`env`] - Environment trait and the cart-pole simulator
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`network`] - The Q-network
//! - [`optimizer`] - Adam and SGD
//! - [`policy`] - Epsilon-greedy selection and epsilon schedules
//! - [`replay_buffer`] - Experience replay
//! - [`trainer`] - Episode loop

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod network;
pub mod optimizer;
pub mod policy;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
