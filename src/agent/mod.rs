//! # Agent
//!
//! The deep Q-learning agent and the [`QFunction`] seam it learns through.
//!
//! ```rust,no_run
//! use cartpole_dqn::agent::Agent;
//! use cartpole_dqn::config::AgentConfig;
//! use cartpole_dqn::env::{CartPole, Environment};
//!
//! let mut env = CartPole::new();
//! let mut agent = Agent::for_env(&AgentConfig::default(), &env).unwrap();
//!
//! let mut state = env.reset().unwrap();
//! loop {
//!     let action = agent.get_action(state.view()).unwrap();
//!     let step = env.step(action).unwrap();
//!     agent.train(state.view(), action, step.next_state.view(), step.reward, step.done).unwrap();
//!     if step.done {
//!         break;
//!     }
//!     state = step.next_state;
//! }
//! ```

pub mod traits;

mod dqn;
pub use dqn::{bellman_targets, Agent};
pub use traits::QFunction;
