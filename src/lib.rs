//! Alignment Forecast - month-stepped simulation of AI development, deception and governance

pub mod agents;
pub mod core;
pub mod engine;
pub mod government;
pub mod monte_carlo;
pub mod orchestrator;
pub mod phases;
pub mod scenario;
pub mod state;
