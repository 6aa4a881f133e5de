use log::{debug, warn};
use serde::{Serialize, Deserialize};

use crate::agent::{Agent, QFunction};
use crate::config::TrainingConfig;
use crate::env::Environment;
use crate::error::Result;

/// What happened in one episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub total_reward: f32,
    pub steps: usize,
    /// Exploration rate after the episode ended.
    pub epsilon: f32,
}

impl EpisodeSummary {
    /// `ep 3, total_reward: 14.00`
    pub fn console_line(&self) -> String {
        format!("ep {}, total_reward: {:.2}", self.episode, self.total_reward)
    }
}

/// Runs episodes of an environment with an agent in the loop.
#[derive(Clone, Debug)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Trainer { config }
    }

    /// Reset, then act and train until the environment reports `done`.
    pub fn run_episode<E, Q>(&self, env: &mut E, agent: &mut Agent<Q>, episode: usize) -> Result<EpisodeSummary>
    where
        E: Environment + ?Sized,
        Q: QFunction,
    {
        let mut state = env.reset()?;
        let mut total_reward = 0.0;
        let mut steps = 0;

        loop {
            let action = agent.get_action(state.view())?;
            let step = env.step(action)?;
            agent.train(state.view(), action, step.next_state.view(), step.reward, step.done)?;
            // Rendering is best-effort.
            if self.config.render {
                if let Err(err) = env.render() {
                    warn!("render failed in episode {}: {}", episode, err);
                }
            }
            total_reward += step.reward;
            steps += 1;
            if step.done {
                break;
            }
            state = step.next_state;
        }

        let summary = EpisodeSummary {
            episode,
            total_reward,
            steps,
            epsilon: agent.epsilon(),
        };
        debug!("{} (steps={}, epsilon={})", summary.console_line(), steps, summary.epsilon);
        Ok(summary)
    }

    /// Run `config.episodes` episodes, calling `on_episode` after each one.
    pub fn run<E, Q, F>(&self, env: &mut E, agent: &mut Agent<Q>, mut on_episode: F) -> Result<Vec<EpisodeSummary>>
    where
        E: Environment + ?Sized,
        Q: QFunction,
        F: FnMut(&EpisodeSummary),
    {
        let mut summaries = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let summary = self.run_episode(env, agent, episode)?;
            on_episode(&summary);
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
