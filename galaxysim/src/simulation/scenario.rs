//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - particle state (`ParticleSet` at t = 0)
//! - active force set (`AccelSet`)
//!
//! [`initialize`] is the seeding step on its own, for callers that manage
//! parameters and forces themselves.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, InitConfig, InitMode, ScenarioConfig};
use crate::simulation::engine::Engine;
use crate::simulation::error::SimError;
use crate::simulation::forces::{AccelSet, DirectGravity, NeighborGravity};
use crate::simulation::integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{perp, safe_normalize, NVec3, Particle, ParticleSet, Role};

/// Fully-initialized simulation: configuration, state and forces together
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub particles: ParticleSet,
    pub forces: AccelSet,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self, SimError> {
        let particles = initialize(cfg.init.particle_count, cfg)?;
        let engine = Engine::from(&cfg.engine);
        let parameters = Parameters::from(&cfg.parameters);
        let forces = build_forces(&engine, &parameters);

        log::info!(
            "built scenario: {} particles, {:?} init, {} forces{}",
            particles.len(),
            cfg.init.mode,
            if engine.neighbor_search { "neighbor-window" } else { "direct" },
            if engine.parallel { " (parallel)" } else { "" },
        );

        Ok(Self {
            engine,
            parameters,
            particles,
            forces,
        })
    }

    /// Advance by the configured fixed step `h0`
    pub fn step(&mut self) {
        self.step_by(self.parameters.h0);
    }

    /// Advance by an arbitrary elapsed time, e.g. a frame delta
    pub fn step_by(&mut self, dt: f64) {
        integrator::step(&mut self.particles, &self.forces, &self.parameters, dt);
    }

    /// Steps needed to reach `t_end` from t = 0 with `h0`
    pub fn total_steps(&self) -> u64 {
        (self.parameters.t_end / self.parameters.h0).round().max(0.0) as u64
    }
}

/// Register the gravity term selected by the engine settings
pub fn build_forces(engine: &Engine, params: &Parameters) -> AccelSet {
    let forces = AccelSet::new();
    if engine.neighbor_search {
        forces.with(NeighborGravity {
            g: params.g,
            softening: params.softening,
            coupling: params.coupling,
            query_half_width: params.query_half_width,
            half_extent: params.half_extent,
            leaf_capacity: engine.leaf_capacity,
            max_depth: engine.max_depth,
            parallel: engine.parallel,
        })
    } else {
        forces.with(DirectGravity {
            g: params.g,
            softening: params.softening,
            coupling: params.coupling,
            parallel: engine.parallel,
        })
    }
}

/// Seed `particle_count` particles according to `cfg.init`.
///
/// Slot 0 holds the anchor when one is configured, explicit `bodies` fill
/// the following slots, and the rest get uniformly random positions in the
/// domain. Velocities come from the init mode unless a body gives its own.
pub fn initialize(particle_count: usize, cfg: &ScenarioConfig) -> Result<ParticleSet, SimError> {
    cfg.validate(particle_count)?;

    let init = &cfg.init;
    let h = cfg.parameters.half_extent;
    let mut rng = match cfg.parameters.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut particles = Vec::with_capacity(particle_count);

    if let Some(anchor) = &init.anchor {
        let role = if anchor.fixed { Role::Anchor } else { Role::Normal };
        particles.push(Particle::new(NVec3::zeros(), NVec3::zeros(), anchor.mass, role));
    }

    for body in &init.bodies {
        particles.push(seed_body(body, init, &mut rng));
    }

    while particles.len() < particle_count {
        let x = NVec3::new(rng.random_range(-h..h), rng.random_range(-h..h), 0.0);
        let v = initial_velocity(&x, init, &mut rng);
        particles.push(Particle::new(x, v, init.particle_mass, Role::Normal));
    }

    Ok(ParticleSet::new(particles))
}

fn seed_body(body: &BodyConfig, init: &InitConfig, rng: &mut StdRng) -> Particle {
    let x = NVec3::new(body.x[0], body.x[1], 0.0);
    let v = match body.v {
        Some([vx, vy]) => NVec3::new(vx, vy, 0.0),
        None => initial_velocity(&x, init, rng),
    };
    Particle::new(x, v, body.m.unwrap_or(init.particle_mass), Role::Normal)
}

fn initial_velocity(x: &NVec3, init: &InitConfig, rng: &mut StdRng) -> NVec3 {
    match init.mode {
        InitMode::OrbitalSpin => spin_velocity(x, init.spin_factor),
        InitMode::UniformRandom if init.initial_speed > 0.0 => {
            let s = init.initial_speed;
            NVec3::new(rng.random_range(-s..=s), rng.random_range(-s..=s), 0.0)
        }
        InitMode::UniformRandom => NVec3::zeros(),
    }
}

/// Velocity perpendicular to the radius vector from the origin, scaled by
/// `spin_factor`. A particle sitting on the origin gets zero velocity.
pub fn spin_velocity(x: &NVec3, spin_factor: f64) -> NVec3 {
    safe_normalize(&perp(x)) * spin_factor
}
