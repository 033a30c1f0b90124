//! Hand-analysis scratch tables and the reference heuristic strategy for a
//! Daifugō client.

pub mod analyzer;
pub mod state;
pub mod strategy;

pub use state::GameState;
pub use strategy::{SimpleStrategy, Strategy};
