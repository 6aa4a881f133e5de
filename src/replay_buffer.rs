use ndarray::{Array1, Array2};
use rand::Rng;
use std::collections::VecDeque;

use crate::error::{DqnError, Result};

/// One environment step as seen by the agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub done: bool,
}

/// A sampled mini-batch, split into five index-aligned columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub states: Array2<f32>,
    pub actions: Vec<usize>,
    pub next_states: Array2<f32>,
    pub rewards: Array1<f32>,
    pub dones: Vec<bool>,
}

impl Batch {
    /// No rows and no columns. Networks treat a zero-row batch as a no-op
    /// whatever its column count.
    fn empty() -> Self {
        Batch {
            states: Array2::zeros((0, 0)),
            actions: Vec::new(),
            next_states: Array2::zeros((0, 0)),
            rewards: Array1::zeros(0),
            dones: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Fixed-capacity FIFO experience store.
///
/// Once `capacity` transitions are held, each `add` evicts the oldest one.
/// Sampling is uniform *with replacement*, so a batch may repeat a
/// transition and a buffer smaller than the batch size still yields a
/// batch of `len()` elements.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one when full.
    ///
    /// Every stored state must have the same length; the oldest stored
    /// transition fixes it.
    pub fn add(&mut self, transition: Transition) -> Result<()> {
        if transition.state.len() != transition.next_state.len() {
            return Err(DqnError::dimension_mismatch(
                format!("next_state of length {}", transition.state.len()),
                format!("length {}", transition.next_state.len()),
            ));
        }
        if let Some(stored) = self.buffer.front() {
            if stored.state.len() != transition.state.len() {
                return Err(DqnError::dimension_mismatch(
                    format!("state of length {}", stored.state.len()),
                    format!("length {}", transition.state.len()),
                ));
            }
        }
        if self.capacity == 0 {
            return Ok(());
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
        Ok(())
    }

    /// Draw `min(len, batch_size)` transitions uniformly with replacement.
    ///
    /// Rows appear in draw order. `add` keeps every stored state the same
    /// length, so the first drawn transition fixes the column count.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Batch {
        let sample_size = self.buffer.len().min(batch_size);
        if sample_size == 0 {
            return Batch::empty();
        }

        let picks: Vec<&Transition> = (0..sample_size)
            .map(|_| &self.buffer[rng.gen_range(0..self.buffer.len())])
            .collect();

        let state_dim = picks[0].state.len();
        let mut states = Array2::zeros((sample_size, state_dim));
        let mut next_states = Array2::zeros((sample_size, state_dim));
        let mut actions = Vec::with_capacity(sample_size);
        let mut rewards = Array1::zeros(sample_size);
        let mut dones = Vec::with_capacity(sample_size);

        for (i, transition) in picks.into_iter().enumerate() {
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
            actions.push(transition.action);
            rewards[i] = transition.reward;
            dones.push(transition.done);
        }

        Batch {
            states,
            actions,
            next_states,
            rewards,
            dones,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
