//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force model, parallelism and quadtree shape
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`InitConfig`]       – how the particle set is seeded
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every field has a default, so a document only needs the values it changes.
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   neighbor_search: true   # false -> direct all-pairs sum
//!   parallel: false
//!   leaf_capacity: 4
//!   max_depth: 16
//!
//! parameters:
//!   t_end: 10.0             # total simulation time
//!   h0: 0.01                # fixed step size
//!   G: 0.01                 # gravitational constant
//!   softening: 0.9
//!   damping: 0.9983
//!   coupling: 0.8
//!   query_half_width: 0.25
//!   half_extent: 1.0
//!   seed: 42
//!
//! init:
//!   particle_count: 2000
//!   mode: "orbital-spin"    # or "uniform-random"
//!   particle_mass: 1.0
//!   spin_factor: 0.1
//!   anchor:
//!     mass: 1000.0
//!     fixed: true
//!   bodies:
//!     - x: [ 0.5, 0.0 ]
//!       m: 1.0
//! ```
//!
//! The scenario builder maps this configuration into its runtime
//! representation (`Engine`, `Parameters`, `ParticleSet`).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::simulation::error::{invalid, SimError};
use crate::simulation::quadtree::MAX_TREE_DEPTH;

/// Initial-condition mode for non-anchor particles
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    #[serde(rename = "uniform-random")] // random positions, zero or small random velocity
    #[default]
    UniformRandom,

    #[serde(rename = "orbital-spin")] // velocity perpendicular to the radius vector, rotating disk
    OrbitalSpin,
}

/// Engine-level configuration
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub neighbor_search: bool, // `true` - quadtree neighbor window, `false` - direct all-pairs sum
    pub parallel: bool, // accumulate forces with rayon
    pub leaf_capacity: usize, // particles per quadtree leaf before it subdivides
    pub max_depth: usize, // deepest quadtree level; leaves there may exceed capacity
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbor_search: true,
            parallel: false,
            leaf_capacity: 4,
            max_depth: 16,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64, // time step size
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub softening: f64, // must be > 0, prevents singular forces at small separations
    pub damping: f64, // velocity multiplier applied every step, in (0, 1]
    pub coupling: f64, // scales force into acceleration together with 1 / mass
    pub query_half_width: f64, // half-width of the square neighbor window
    pub half_extent: f64, // domain is [-half_extent, half_extent]^2
    pub seed: Option<u64>, // deterministic seed to make runs reproducable
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            t_end: 10.0,
            h0: 0.01,
            g: 0.01,
            softening: 0.9,
            damping: 0.9983,
            coupling: 0.8,
            query_half_width: 0.25,
            half_extent: 1.0,
            seed: None,
        }
    }
}

/// Optional heavy particle placed at the origin in slot 0
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AnchorConfig {
    pub mass: f64,
    pub fixed: bool, // `true` - excluded from integration, `false` - integrates like any other particle
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            mass: 1.0e6,
            fixed: true,
        }
    }
}

/// Explicit initial state for one particle
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position
    #[serde(default)]
    pub v: Option<[f64; 2]>, // initial velocity, derived from `InitMode` when absent
    pub m: Option<f64>, // mass, `particle_mass` when absent
}

/// How the particle set is seeded
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct InitConfig {
    pub particle_count: usize,
    pub mode: InitMode,
    pub particle_mass: f64, // default mass of every non-anchor particle
    pub spin_factor: f64, // speed given by orbital-spin mode
    pub initial_speed: f64, // uniform-random mode: max random speed per axis
    pub anchor: Option<AnchorConfig>,
    pub bodies: Vec<BodyConfig>, // fill the slots after the anchor, the rest are random
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            mode: InitMode::UniformRandom,
            particle_mass: 1.0,
            spin_factor: 0.1,
            initial_speed: 0.0,
            anchor: None,
            bodies: Vec::new(),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // force model and quadtree settings
    pub parameters: ParametersConfig, // global numerical and physical parameters
    pub init: InitConfig, // initial particle set
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check every value `initialize` relies on.
    /// `particle_count` is passed separately so callers can override it.
    pub fn validate(&self, particle_count: usize) -> Result<(), SimError> {
        let e = &self.engine;
        let p = &self.parameters;
        let i = &self.init;

        if particle_count == 0 {
            return Err(invalid("particle count must be at least 1"));
        }
        if e.leaf_capacity == 0 {
            return Err(invalid("leaf_capacity must be at least 1"));
        }
        if e.max_depth == 0 || e.max_depth > MAX_TREE_DEPTH {
            return Err(invalid(format!("max_depth must lie in 1..={MAX_TREE_DEPTH}, got {}", e.max_depth)));
        }
        if !(p.h0 > 0.0 && p.h0.is_finite()) {
            return Err(invalid(format!("h0 must be positive, got {}", p.h0)));
        }
        if !p.g.is_finite() {
            return Err(invalid("G must be finite"));
        }
        if !(p.softening > 0.0 && p.softening.is_finite()) {
            return Err(invalid(format!("softening must be positive, got {}", p.softening)));
        }
        if !(p.damping > 0.0 && p.damping <= 1.0) {
            return Err(invalid(format!("damping must lie in (0, 1], got {}", p.damping)));
        }
        if !p.coupling.is_finite() {
            return Err(invalid("coupling must be finite"));
        }
        if !(p.query_half_width > 0.0 && p.query_half_width.is_finite()) {
            return Err(invalid(format!("query_half_width must be positive, got {}", p.query_half_width)));
        }
        if !(p.half_extent > 0.0 && p.half_extent.is_finite()) {
            return Err(invalid(format!("half_extent must be positive, got {}", p.half_extent)));
        }
        check_mass("particle_mass", i.particle_mass)?;
        if !i.spin_factor.is_finite() {
            return Err(invalid("spin_factor must be finite"));
        }
        if !(i.initial_speed >= 0.0 && i.initial_speed.is_finite()) {
            return Err(invalid(format!("initial_speed must be non-negative, got {}", i.initial_speed)));
        }

        let reserved = usize::from(i.anchor.is_some());
        if let Some(anchor) = &i.anchor {
            check_mass("anchor mass", anchor.mass)?;
        }
        if i.bodies.len() + reserved > particle_count {
            return Err(invalid(format!(
                "{} explicit bodies do not fit in {} particles",
                i.bodies.len() + reserved,
                particle_count
            )));
        }
        for (k, b) in i.bodies.iter().enumerate() {
            if let Some(m) = b.m {
                check_mass(&format!("bodies[{k}] mass"), m)?;
            }
            let h = p.half_extent;
            if b.x.iter().any(|c| !(c.abs() <= h)) {
                return Err(invalid(format!("bodies[{k}] position {:?} lies outside the domain", b.x)));
            }
            if let Some(v) = b.v {
                if v.iter().any(|c| !c.is_finite()) {
                    return Err(invalid(format!("bodies[{k}] velocity must be finite")));
                }
            }
        }
        Ok(())
    }
}

fn check_mass(what: &str, m: f64) -> Result<(), SimError> {
    if m > 0.0 && m.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{what} must be positive, got {m}")))
    }
}
