//! Core state types for the particle simulation.
//!
//! Defines the particle arena and the vector helpers everything else
//! builds on:
//! - `NVec3` is the 3D vector type (z is carried but never driven)
//! - `Particle` holds the mutable physical state of one point mass
//! - `ParticleSet` owns every particle plus the current simulation time `t`
//!
//! Particles are addressed by their index in `ParticleSet::particles`;
//! the spatial index stores those indices, never references.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Normalize `v`, returning the zero vector when `v` has zero magnitude.
/// Keeps NaN out of particle state when two particles coincide.
pub fn safe_normalize(v: &NVec3) -> NVec3 {
    v.try_normalize(0.0).unwrap_or_else(NVec3::zeros)
}

/// Rotate the planar part of `v` by +90 degrees: `(dx, dy) -> (-dy, dx)`
pub fn perp(v: &NVec3) -> NVec3 {
    NVec3::new(-v.y, v.x, 0.0)
}

/// Drop the z component
pub fn planar(v: &NVec3) -> NVec3 {
    NVec3::new(v.x, v.y, 0.0)
}

/// Role flag of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Normal,
    /// Fixed gravitational center, excluded from integration
    Anchor,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub a: NVec3, // acceleration from the last step
    pub m: f64, // mass
    pub role: Role,
}

impl Particle {
    pub fn new(x: NVec3, v: NVec3, m: f64, role: Role) -> Self {
        Self {
            x,
            v,
            a: NVec3::zeros(),
            m,
            role,
        }
    }

    /// `(x, y)` as read by a renderer
    pub fn position(&self) -> (f64, f64) {
        (self.x.x, self.x.y)
    }

    pub fn is_anchor(&self) -> bool {
        self.role == Role::Anchor
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSet {
    pub particles: Vec<Particle>, // fixed for the whole run
    pub t: f64, // time
    pub steps: u64, // completed steps
}

impl ParticleSet {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            t: 0.0,
            steps: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Position of particle `i`, `None` if the handle is out of range
    pub fn position(&self, i: usize) -> Option<(f64, f64)> {
        self.particles.get(i).map(Particle::position)
    }

    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.particles.iter().map(Particle::position)
    }

    /// Total kinetic energy `sum(0.5 * m * |v|^2)`, anchors included
    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .map(|p| 0.5 * p.m * p.v.norm_squared())
            .sum()
    }

    /// Mean distance of the non-anchor particles from the origin
    pub fn mean_radius(&self) -> f64 {
        let (sum, count) = self
            .particles
            .iter()
            .filter(|p| !p.is_anchor())
            .fold((0.0, 0usize), |(s, c), p| (s + planar(&p.x).norm(), c + 1));
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }
}
