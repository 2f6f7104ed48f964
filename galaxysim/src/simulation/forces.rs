//! Force / acceleration contributors for the particle engine
//!
//! Defines the softened pairwise gravity law, the [`Acceleration`] trait,
//! and two gravity terms built on it: a quadtree neighbor-window variant
//! and a direct all-pairs reference

use rayon::prelude::*;

use crate::simulation::quadtree::{QuadTree, Rect};
use crate::simulation::states::{planar, safe_normalize, NVec3, Particle, ParticleSet};

/// Softened Newtonian force on `p1` due to `p2`, directed toward `p2`.
///
/// `|F| = g * m1 * m2 / (|d|^2 + softening^2)` with `d` the planar
/// separation. Coincident particles give the zero vector.
pub fn pairwise_force(p1: &Particle, p2: &Particle, g: f64, softening: f64) -> NVec3 {
    let d = planar(&(p2.x - p1.x));
    let soft2 = d.norm_squared() + softening * softening;
    let magnitude = g * p1.m * p2.m / soft2;
    safe_normalize(&d) * magnitude
}

/// Collection of acceleration terms
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per particle
#[derive(Default)]
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations for all particles in `set`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, set: &ParticleSet, out: &mut [NVec3]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }
        for term in &self.terms {
            term.acceleration(set, out);
        }
    }
}

/// Acceleration source operating on a [`ParticleSet`]
/// Implementations add their contribution into `out[i]` for each particle
pub trait Acceleration {
    fn acceleration(&self, set: &ParticleSet, out: &mut [NVec3]);
}

/// Gravity limited to a square window around each particle.
///
/// A quadtree is rebuilt from the current positions on every call, then each
/// particle queries the window of half-width `query_half_width` centered on
/// itself. Particles outside the window contribute nothing.
#[derive(Debug, Clone)]
pub struct NeighborGravity {
    pub g: f64,
    pub softening: f64,
    pub coupling: f64,
    pub query_half_width: f64,
    pub half_extent: f64, // quadtree root covers [-half_extent, half_extent]^2
    pub leaf_capacity: usize,
    pub max_depth: usize,
    pub parallel: bool,
}

impl NeighborGravity {
    /// Fill `buf` with the handles particle `i` interacts with: everything
    /// the tree returns for its window, minus `i` itself
    pub fn partners(&self, i: usize, tree: &QuadTree, particles: &[Particle], buf: &mut Vec<usize>) {
        let p = &particles[i];
        let window = Rect::centered(p.x.x, p.x.y, self.query_half_width);
        buf.clear();
        tree.query_into(&window, particles, buf);
        buf.retain(|&j| j != i); // don't self-interact
    }

    /// Acceleration on particle `i` from the candidates the tree returns
    fn accel_on(&self, i: usize, tree: &QuadTree, particles: &[Particle], buf: &mut Vec<usize>) -> NVec3 {
        self.partners(i, tree, particles, buf);

        let p = &particles[i];
        let scale = self.coupling / p.m;
        buf.iter().fold(NVec3::zeros(), |acc, &j| {
            acc + pairwise_force(p, &particles[j], self.g, self.softening) * scale
        })
    }

    /// Quadtree over this term's domain
    pub fn build_tree(&self, particles: &[Particle]) -> (QuadTree, usize) {
        QuadTree::build(
            particles,
            Rect::domain(self.half_extent),
            self.leaf_capacity,
            self.max_depth,
        )
    }
}

impl Acceleration for NeighborGravity {
    fn acceleration(&self, set: &ParticleSet, out: &mut [NVec3]) {
        let particles = &set.particles;
        if particles.is_empty() {
            return;
        }

        // The tree is complete before any query runs
        let (tree, dropped) = self.build_tree(particles);
        if dropped > 0 {
            log::warn!("{dropped} particle(s) outside the domain were left out of this step's neighbor search");
        }

        if self.parallel {
            out.par_iter_mut()
                .enumerate()
                .for_each_init(Vec::new, |buf, (i, a)| {
                    *a += self.accel_on(i, &tree, particles, buf);
                });
        } else {
            let mut buf = Vec::new();
            for (i, a) in out.iter_mut().enumerate() {
                *a += self.accel_on(i, &tree, particles, &mut buf);
            }
        }
    }
}

/// Gravity summed over every other particle (O(n^2))
#[derive(Debug, Clone)]
pub struct DirectGravity {
    pub g: f64,
    pub softening: f64,
    pub coupling: f64,
    pub parallel: bool,
}

impl DirectGravity {
    fn accel_on(&self, i: usize, particles: &[Particle]) -> NVec3 {
        let p = &particles[i];
        let scale = self.coupling / p.m;
        particles
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold(NVec3::zeros(), |acc, (_, other)| {
                acc + pairwise_force(p, other, self.g, self.softening) * scale
            })
    }
}

impl Acceleration for DirectGravity {
    fn acceleration(&self, set: &ParticleSet, out: &mut [NVec3]) {
        let particles = &set.particles;
        if self.parallel {
            out.par_iter_mut().enumerate().for_each(|(i, a)| {
                *a += self.accel_on(i, particles);
            });
        } else {
            for (i, a) in out.iter_mut().enumerate() {
                *a += self.accel_on(i, particles);
            }
        }
    }
}
