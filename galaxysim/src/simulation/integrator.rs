//! Fixed-step integrator for the particle set
//!
//! One call to [`step`] is one complete, ordered pass: accelerations from
//! the `AccelSet` (which rebuilds its own spatial index), then damped
//! semi-implicit Euler integration and toroidal wrap for every particle
//! that is not an anchor.

use std::time::Instant;

use super::forces::AccelSet;
use super::params::Parameters;
use super::states::{NVec3, ParticleSet};

/// Advance `set` by `dt` in place.
///
/// For every non-anchor particle:
/// `v += a * dt`, `v *= damping`, `x += v * dt`, then wrap into the domain.
/// Anchors keep their position and velocity; their acceleration is still
/// recorded. A non-finite `dt` leaves `set` untouched.
pub fn step(set: &mut ParticleSet, forces: &AccelSet, params: &Parameters, dt: f64) {
    let n = set.particles.len();
    if n == 0 { // no particles, return
        return;
    }
    if !dt.is_finite() {
        log::warn!("skipping step with non-finite dt {dt}");
        return;
    }
    let started = Instant::now();

    let mut accels = vec![NVec3::zeros(); n];
    forces.accumulate_accels(&*set, &mut accels);

    for (p, a) in set.particles.iter_mut().zip(accels) {
        p.a = a;
        if p.is_anchor() {
            continue;
        }
        p.v += a * dt;
        p.v *= params.damping;
        p.x.x += p.v.x * dt;
        p.x.y += p.v.y * dt;
        wrap_position(&mut p.x, params.half_extent);
    }

    set.t += dt;
    set.steps += 1;

    log::debug!(
        "step {} (t = {:.4}) took {:.3} ms",
        set.steps,
        set.t,
        started.elapsed().as_secs_f64() * 1000.0
    );
}

/// Toroidal wrap: leaving through one edge re-enters at the opposite edge.
/// `x < -h` becomes `h`, `x > h` becomes `-h`, and likewise for `y`.
pub fn wrap_position(x: &mut NVec3, half_extent: f64) {
    x.x = wrap_coord(x.x, half_extent);
    x.y = wrap_coord(x.y, half_extent);
}

fn wrap_coord(c: f64, h: f64) -> f64 {
    if c < -h {
        h
    } else if c > h {
        -h
    } else {
        c
    }
}
