use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AgentConfig;
use crate::env::Environment;
use crate::error::{DqnError, Result};
use crate::network::QNetwork;
use crate::policy::epsilon_greedy;
use crate::replay_buffer::{ReplayBuffer, Transition};
use super::traits::QFunction;

/// Deep Q-learning agent with experience replay.
///
/// Each call to [`Agent::train`] stores the transition, samples a
/// mini-batch (with replacement) from the replay buffer, builds Bellman
/// targets with terminal rows masked to zero and takes one optimization
/// step on the Q-function. Epsilon changes only when an episode ends.
///
/// The agent owns its Q-function exclusively. [`Agent::close`] releases it
/// explicitly; dropping the agent releases it on every other path.
///
/// ```
/// use cartpole_dqn::agent::Agent;
/// use cartpole_dqn::config::AgentConfig;
/// use ndarray::array;
///
/// let config = AgentConfig { seed: Some(3), ..AgentConfig::default() };
/// let mut agent = Agent::new(&config, 4, 2).unwrap();
///
/// let state = array![0.01, -0.02, 0.03, 0.0];
/// let action = agent.get_action(state.view()).unwrap();
/// let next_state = array![0.02, -0.01, 0.02, 0.01];
/// agent.train(state.view(), action, next_state.view(), 1.0, false).unwrap();
///
/// assert_eq!(agent.replay_buffer().len(), 1);
/// agent.close();
/// ```
pub struct Agent<Q: QFunction = QNetwork> {
    q_function: Q,
    replay_buffer: ReplayBuffer,
    config: AgentConfig,
    epsilon: f32,
    rng: StdRng,
    train_steps: usize,
    episodes_completed: usize,
}

impl Agent<QNetwork> {
    /// Build an agent with a freshly initialized [`QNetwork`].
    pub fn new(config: &AgentConfig, state_dim: usize, num_actions: usize) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let q_network = QNetwork::new(
            state_dim,
            config.hidden_units,
            num_actions,
            config.learning_rate,
            config.optimizer,
            &mut rng,
        )?;
        Self::assemble(config, q_network, rng)
    }

    /// Build an agent sized for `env`'s observation and action spaces.
    pub fn for_env<E: Environment + ?Sized>(config: &AgentConfig, env: &E) -> Result<Self> {
        Self::new(config, env.observation_dim(), env.num_actions())
    }
}

impl<Q: QFunction> Agent<Q> {
    /// Build an agent around an existing Q-function.
    pub fn with_q_function(config: &AgentConfig, q_function: Q) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::assemble(config, q_function, rng)
    }

    fn assemble(config: &AgentConfig, q_function: Q, rng: StdRng) -> Result<Self> {
        if q_function.state_dim() == 0 || q_function.num_actions() == 0 {
            return Err(DqnError::invalid_parameter(
                "q_function".to_string(),
                format!(
                    "needs non-empty state and action spaces, got {} x {}",
                    q_function.state_dim(),
                    q_function.num_actions()
                ),
            ));
        }
        debug!(
            "agent created: state_dim={}, num_actions={}, epsilon={}, replay_capacity={}",
            q_function.state_dim(),
            q_function.num_actions(),
            config.initial_epsilon,
            config.replay_capacity
        );
        Ok(Agent {
            q_function,
            replay_buffer: ReplayBuffer::new(config.replay_capacity),
            config: config.clone(),
            epsilon: config.initial_epsilon,
            rng,
            train_steps: 0,
            episodes_completed: 0,
        })
    }

    /// Epsilon-greedy action for `state`.
    pub fn get_action(&mut self, state: ArrayView1<f32>) -> Result<usize> {
        self.check_state(state)?;
        let q_values = self.q_function.predict_one(state)?;
        epsilon_greedy(q_values.view(), self.epsilon, &mut self.rng)
    }

    /// Store one transition and take one learning step on a replayed batch.
    ///
    /// Returns the loss reported by the Q-function for the sampled batch.
    pub fn train(
        &mut self,
        state: ArrayView1<f32>,
        action: usize,
        next_state: ArrayView1<f32>,
        reward: f32,
        done: bool,
    ) -> Result<Option<f32>> {
        self.check_state(state)?;
        self.check_state(next_state)?;
        if action >= self.q_function.num_actions() {
            return Err(DqnError::InvalidAction {
                action,
                max_actions: self.q_function.num_actions(),
            });
        }

        self.replay_buffer.add(Transition {
            state: state.to_owned(),
            action,
            next_state: next_state.to_owned(),
            reward,
            done,
        })?;

        let batch = self.replay_buffer.sample(self.config.batch_size, &mut self.rng);
        let next_values = self.q_function.predict(batch.next_states.view())?;
        let targets = bellman_targets(next_values, batch.rewards.view(), &batch.dones, self.config.gamma)?;
        let loss = self
            .q_function
            .update(batch.states.view(), &batch.actions, targets.view())?;
        self.train_steps += 1;
        trace!("train step {}: batch={}, loss={:?}", self.train_steps, batch.len(), loss);

        if done {
            self.end_episode();
        }

        Ok(loss)
    }

    fn end_episode(&mut self) {
        let previous = self.epsilon;
        self.epsilon = self.config.epsilon_decay.next(previous);
        self.episodes_completed += 1;
        debug!(
            "episode {} finished: epsilon {} -> {}",
            self.episodes_completed, previous, self.epsilon
        );
    }

    fn check_state(&self, state: ArrayView1<f32>) -> Result<()> {
        if state.len() != self.q_function.state_dim() {
            return Err(DqnError::dimension_mismatch(
                format!("state of length {}", self.q_function.state_dim()),
                format!("length {}", state.len()),
            ));
        }
        Ok(())
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Override the exploration rate, clamped to `[0, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f32) -> Result<()> {
        if !epsilon.is_finite() {
            return Err(DqnError::invalid_parameter(
                "epsilon".to_string(),
                format!("must be finite, got {}", epsilon),
            ));
        }
        self.epsilon = epsilon.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }

    pub fn q_function(&self) -> &Q {
        &self.q_function
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Number of completed `train` calls.
    pub fn train_steps(&self) -> usize {
        self.train_steps
    }

    /// Number of `train` calls that ended an episode.
    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Release the Q-function and the replay buffer.
    pub fn close(self) {
        debug!(
            "closing agent after {} train steps and {} episodes",
            self.train_steps, self.episodes_completed
        );
    }
}

/// Bellman targets `reward + gamma * max_a next_values[i]`, with the value
/// row of every terminal transition zeroed first.
pub fn bellman_targets(
    mut next_values: Array2<f32>,
    rewards: ArrayView1<f32>,
    dones: &[bool],
    gamma: f32,
) -> Result<Array1<f32>> {
    let rows = next_values.nrows();
    if rewards.len() != rows || dones.len() != rows {
        return Err(DqnError::dimension_mismatch(
            format!("{} rewards and dones", rows),
            format!("{} rewards, {} dones", rewards.len(), dones.len()),
        ));
    }
    if rows > 0 && next_values.ncols() == 0 {
        return Err(DqnError::NumericalError("next-state values have no actions".to_string()));
    }

    for (mut row, &done) in next_values.axis_iter_mut(Axis(0)).zip(dones) {
        if done {
            row.fill(0.0);
        }
    }

    let max_next = next_values.map_axis(Axis(1), |row| {
        row.iter().fold(f32::NEG_INFINITY, |max, &value| max.max(value))
    });

    Ok(&rewards + &(max_next * gamma))
}
