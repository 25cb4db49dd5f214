//! Selection Strategies
//!
//! Tie-break among several data planes that can all serve a request.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use super::instance::DataPlaneInstance;
use crate::error::ConfigError;

pub const ROUND_ROBIN: &str = "round-robin";
pub const FIRST_AVAILABLE: &str = "first";
pub const RANDOM: &str = "random";

/// Picks one instance out of a non-empty candidate list
pub trait SelectionStrategy: Send + Sync {
    /// Strategy name for logging and configuration
    fn name(&self) -> &'static str;

    /// Returns `None` only when `candidates` is empty
    fn apply<'a>(&self, candidates: &[&'a DataPlaneInstance]) -> Option<&'a DataPlaneInstance>;
}

/// Rotates through candidates with a shared cursor
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a fixed position, useful for deterministic tests
    pub fn starting_at(position: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(position),
        }
    }
}

impl SelectionStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        ROUND_ROBIN
    }

    fn apply<'a>(&self, candidates: &[&'a DataPlaneInstance]) -> Option<&'a DataPlaneInstance> {
        if candidates.is_empty() {
            return None;
        }
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        candidates.get(turn % candidates.len()).copied()
    }
}

/// Always the first candidate in registration order
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstAvailable;

impl SelectionStrategy for FirstAvailable {
    fn name(&self) -> &'static str {
        FIRST_AVAILABLE
    }

    fn apply<'a>(&self, candidates: &[&'a DataPlaneInstance]) -> Option<&'a DataPlaneInstance> {
        candidates.first().copied()
    }
}

/// Uniformly random candidate
#[derive(Debug, Default, Clone, Copy)]
pub struct Random;

impl SelectionStrategy for Random {
    fn name(&self) -> &'static str {
        RANDOM
    }

    fn apply<'a>(&self, candidates: &[&'a DataPlaneInstance]) -> Option<&'a DataPlaneInstance> {
        if candidates.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..candidates.len());
        candidates.get(idx).copied()
    }
}

/// Resolve a strategy from its configured name
pub fn strategy_from_name(name: &str) -> Result<Arc<dyn SelectionStrategy>, ConfigError> {
    match name {
        ROUND_ROBIN => Ok(Arc::new(RoundRobin::new())),
        FIRST_AVAILABLE => Ok(Arc::new(FirstAvailable)),
        RANDOM => Ok(Arc::new(Random)),
        other => Err(ConfigError::Invalid(format!(
            "unknown selection strategy `{other}`"
        ))),
    }
}
