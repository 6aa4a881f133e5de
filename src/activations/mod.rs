//! # Activation Functions
//!
//! The Q-network only needs two non-linearities: ReLU for the hidden layer
//! and the identity for the action-value head.

pub mod functions;

pub use functions::Activation;
