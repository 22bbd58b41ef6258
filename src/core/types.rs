//! Core type definitions used throughout the codebase

use std::fmt;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The single random source threaded through every phase and action.
///
/// One generator per run. Never share a generator between runs and never
/// reach for `thread_rng()` inside simulation code.
pub type SimRng = ChaCha8Rng;

/// Simulation month counter (month 0 is the initial state)
pub type Month = u32;

/// Unique identifier for AI agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Unique identifier for AI developer organizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrgId(pub u32);

impl OrgId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org-{}", self.0)
    }
}

/// Clamp a derived scalar into [0, 1], mapping NaN to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
