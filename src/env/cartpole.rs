use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Uniform;
use std::f32::consts::PI;

use crate::error::{DqnError, Result};
use super::{Environment, Step, StepInfo};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
// Half the pole's length.
const LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * PI / 360.0;
const MAX_EPISODE_STEPS: usize = 200;

/// Classic cart-pole balancing task.
///
/// Observation: `[x, x_dot, theta, theta_dot]`. Action 0 pushes the cart
/// left, action 1 pushes it right. Every step yields reward 1.0. An episode
/// ends when the cart leaves `±2.4`, the pole tilts past 12 degrees, or 200
/// steps have elapsed.
#[derive(Debug)]
pub struct CartPole {
    state: Option<[f32; 4]>,
    steps: usize,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        CartPole {
            state: None,
            steps: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        CartPole {
            state: None,
            steps: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn observation(state: [f32; 4]) -> Array1<f32> {
        array![state[0], state[1], state[2], state[3]]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn observation_dim(&self) -> usize {
        4
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        let initial = Uniform::new(-0.05f32, 0.05);
        let state = [
            self.rng.sample(initial),
            self.rng.sample(initial),
            self.rng.sample(initial),
            self.rng.sample(initial),
        ];
        self.state = Some(state);
        self.steps = 0;
        Ok(Self::observation(state))
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if action >= self.num_actions() {
            return Err(DqnError::InvalidAction {
                action,
                max_actions: self.num_actions(),
            });
        }
        let [x, x_dot, theta, theta_dot] = self
            .state
            .ok_or_else(|| DqnError::Environment("step called without an active episode; call reset".to_string()))?;

        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let cos_theta = theta.cos();
        let sin_theta = theta.sin();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // Explicit Euler: positions advance with the old velocities.
        let next = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.steps += 1;

        let terminated = next[0].abs() > X_THRESHOLD || next[2].abs() > THETA_THRESHOLD;
        let truncated = !terminated && self.steps >= MAX_EPISODE_STEPS;
        let done = terminated || truncated;
        self.state = if done { None } else { Some(next) };

        Ok(Step {
            next_state: Self::observation(next),
            reward: 1.0,
            done,
            info: StepInfo {
                elapsed_steps: self.steps,
                truncated,
            },
        })
    }

    fn close(&mut self) -> Result<()> {
        self.state = None;
        Ok(())
    }
}
