//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fixed step size and end time used by the runner,
//! - gravitational constant, softening and coupling for the force law,
//! - velocity damping and the domain half-extent for integration,
//! - neighbor window half-width and random seed

use crate::configuration::config::ParametersConfig;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub h0: f64, // step size
    pub g: f64, // gravitational constant
    pub softening: f64, // added to the separation in quadrature
    pub damping: f64, // velocity multiplier per step
    pub coupling: f64, // acceleration = force * coupling / mass
    pub query_half_width: f64, // neighbor window half-width
    pub half_extent: f64, // domain is [-half_extent, half_extent]^2
    pub seed: Option<u64>, // deterministic seed
}

impl From<&ParametersConfig> for Parameters {
    fn from(cfg: &ParametersConfig) -> Self {
        Self {
            t_end: cfg.t_end,
            h0: cfg.h0,
            g: cfg.g,
            softening: cfg.softening,
            damping: cfg.damping,
            coupling: cfg.coupling,
            query_half_width: cfg.query_half_width,
            half_extent: cfg.half_extent,
            seed: cfg.seed,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::from(&ParametersConfig::default())
    }
}
