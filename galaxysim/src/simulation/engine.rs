//! High-level runtime engine settings
//!
//! Selects the force model (quadtree neighbor window or direct all-pairs),
//! serial or rayon-parallel accumulation, and the quadtree shape used
//! when building and running a `Scenario`

use crate::configuration::config::EngineConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    pub neighbor_search: bool, // false = direct, true = quadtree window
    pub parallel: bool, // accumulate forces on the rayon pool
    pub leaf_capacity: usize, // particles held per quadtree leaf
    pub max_depth: usize, // subdivision bound
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            neighbor_search: cfg.neighbor_search,
            parallel: cfg.parallel,
            leaf_capacity: cfg.leaf_capacity,
            max_depth: cfg.max_depth,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}
