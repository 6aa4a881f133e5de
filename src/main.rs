//! Trains a DQN agent on cart-pole and prints one line per episode.
//!
//! Set `CARTPOLE_DQN_CONFIG` to a JSON file to override the defaults and
//! `RUST_LOG` to see the agent's logs.

use cartpole_dqn::agent::Agent;
use cartpole_dqn::config::Config;
use cartpole_dqn::env::{CartPole, Environment};
use cartpole_dqn::trainer::Trainer;
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env()?;
    info!("configuration: {:?}", config);

    let mut env = match config.training.env_seed {
        Some(seed) => CartPole::with_seed(seed),
        None => CartPole::new(),
    };
    let mut agent = Agent::for_env(&config.agent, &env)?;

    let trainer = Trainer::new(config.training.clone());
    let result = trainer.run(&mut env, &mut agent, |summary| {
        println!("{}", summary.console_line());
    });

    env.close()?;
    agent.close();

    let summaries = result?;
    if let Some(best) = summaries
        .iter()
        .max_by(|a, b| a.total_reward.total_cmp(&b.total_reward))
    {
        info!("best episode {} with total reward {:.2}", best.episode, best.total_reward);
    }
    Ok(())
}
