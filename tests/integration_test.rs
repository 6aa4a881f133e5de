use cartpole_dqn::{
    agent::Agent,
    config::{AgentConfig, Config, TrainingConfig},
    env::{CartPole, Environment, Step, StepInfo},
    error::{DqnError, Result},
    policy::EpsilonDecay,
    trainer::{EpisodeSummary, Trainer},
};
use ndarray::{array, Array1};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three-step episodes that end on the third step.
struct ScriptedEnv {
    steps: usize,
}

impl Environment for ScriptedEnv {
    fn observation_dim(&self) -> usize {
        4
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        self.steps = 0;
        Ok(array![0.0, 0.0, 0.0, 0.0])
    }

    fn step(&mut self, _action: usize) -> Result<Step> {
        self.steps += 1;
        let x = self.steps as f32;
        Ok(Step {
            next_state: array![x, -x, 0.5 * x, 0.0],
            reward: 1.0,
            done: self.steps == 3,
            info: StepInfo {
                elapsed_steps: self.steps,
                truncated: false,
            },
        })
    }
}

/// Fails on every step.
struct BrokenEnv;

impl Environment for BrokenEnv {
    fn observation_dim(&self) -> usize {
        4
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        Ok(array![0.0, 0.0, 0.0, 0.0])
    }

    fn step(&mut self, _action: usize) -> Result<Step> {
        Err(DqnError::Environment("simulator crashed".to_string()))
    }
}

/// Steps like `ScriptedEnv` but has no display to render to.
struct HeadlessEnv {
    inner: ScriptedEnv,
    render_calls: usize,
}

impl Environment for HeadlessEnv {
    fn observation_dim(&self) -> usize {
        self.inner.observation_dim()
    }

    fn num_actions(&self) -> usize {
        self.inner.num_actions()
    }

    fn reset(&mut self) -> Result<Array1<f32>> {
        self.inner.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        self.inner.step(action)
    }

    fn render(&mut self) -> Result<()> {
        self.render_calls += 1;
        Err(DqnError::Environment("no display".to_string()))
    }
}

#[test]
fn test_console_line_format() {
    let summary = EpisodeSummary {
        episode: 3,
        total_reward: 14.0,
        steps: 14,
        epsilon: 1.0,
    };
    assert_eq!(summary.console_line(), "ep 3, total_reward: 14.00");
}

#[test]
fn test_scripted_episode_updates_epsilon_once() {
    init_logger();
    let config = AgentConfig {
        seed: Some(1),
        epsilon_decay: EpsilonDecay::Geometric { factor: 0.5, floor: 0.05 },
        ..AgentConfig::default()
    };
    let mut env = ScriptedEnv { steps: 0 };
    let mut agent = Agent::for_env(&config, &env).unwrap();
    let trainer = Trainer::new(TrainingConfig::default());

    let summary = trainer.run_episode(&mut env, &mut agent, 0).unwrap();

    assert_eq!(summary.steps, 3);
    assert_eq!(summary.total_reward, 3.0);
    assert_eq!(summary.epsilon, 0.5);
    assert_eq!(agent.episodes_completed(), 1);
    assert_eq!(agent.train_steps(), 3);
    assert_eq!(agent.replay_buffer().len(), 3);
    let dones: Vec<bool> = agent.replay_buffer().iter().map(|t| t.done).collect();
    assert_eq!(dones, vec![false, false, true]);
}

#[test]
fn test_cartpole_training_run() {
    init_logger();
    let config = Config {
        agent: AgentConfig {
            seed: Some(7),
            ..AgentConfig::default()
        },
        training: TrainingConfig {
            episodes: 5,
            render: true,
            env_seed: Some(7),
        },
    };
    let mut env = CartPole::with_seed(7);
    let mut agent = Agent::for_env(&config.agent, &env).unwrap();
    let trainer = Trainer::new(config.training.clone());

    let mut lines = Vec::new();
    let summaries = trainer
        .run(&mut env, &mut agent, |summary| lines.push(summary.console_line()))
        .unwrap();

    assert_eq!(summaries.len(), 5);
    assert_eq!(lines.len(), 5);
    for (index, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.episode, index);
        assert!(summary.steps >= 1 && summary.steps <= 200);
        assert_eq!(summary.total_reward, summary.steps as f32);
        assert_eq!(summary.epsilon, 1.0);
        assert!(lines[index].starts_with(&format!("ep {}, total_reward: ", index)));
    }

    let total_steps: usize = summaries.iter().map(|s| s.steps).sum();
    assert_eq!(agent.replay_buffer().len(), total_steps);
    assert_eq!(agent.train_steps(), total_steps);
    assert_eq!(agent.episodes_completed(), 5);

    env.close().unwrap();
    agent.close();
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let config = AgentConfig {
            seed: Some(21),
            epsilon_decay: EpsilonDecay::Geometric { factor: 0.9, floor: 0.1 },
            ..AgentConfig::default()
        };
        let mut env = CartPole::with_seed(21);
        let mut agent = Agent::for_env(&config, &env).unwrap();
        let trainer = Trainer::new(TrainingConfig {
            episodes: 3,
            ..TrainingConfig::default()
        });
        trainer.run(&mut env, &mut agent, |_| {}).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_environment_errors_propagate() {
    let config = AgentConfig {
        seed: Some(2),
        ..AgentConfig::default()
    };
    let mut env = BrokenEnv;
    let mut agent = Agent::for_env(&config, &env).unwrap();
    let trainer = Trainer::new(TrainingConfig::default());

    let result = trainer.run(&mut env, &mut agent, |_| {});
    assert!(matches!(result, Err(DqnError::Environment(_))));
    assert!(agent.replay_buffer().is_empty());
}

#[test]
fn test_render_failure_does_not_stop_training() {
    init_logger();
    let config = AgentConfig {
        seed: Some(4),
        ..AgentConfig::default()
    };
    let mut env = HeadlessEnv {
        inner: ScriptedEnv { steps: 0 },
        render_calls: 0,
    };
    let mut agent = Agent::for_env(&config, &env).unwrap();
    let trainer = Trainer::new(TrainingConfig {
        episodes: 2,
        render: true,
        env_seed: None,
    });

    let summaries = trainer.run(&mut env, &mut agent, |_| {}).unwrap();

    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.steps == 3 && s.total_reward == 3.0));
    assert_eq!(env.render_calls, 6);
    assert_eq!(agent.episodes_completed(), 2);
}
