use std::time::Instant;

use crate::simulation::forces::{AccelSet, Acceleration, DirectGravity, NeighborGravity};
use crate::simulation::integrator::step;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Particle, ParticleSet, Role};

/// Helper to build a deterministic particle set of size `n` inside the unit domain
fn make_set(n: usize) -> ParticleSet {
    let particles = (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec3::new((i_f * 0.37).sin() * 0.95, (i_f * 0.13).cos() * 0.95, 0.0);
            Particle::new(x, NVec3::zeros(), 1.0, Role::Normal)
        })
        .collect();
    ParticleSet::new(particles)
}

fn make_params() -> Parameters {
    Parameters {
        t_end: 100.0,
        h0: 0.01,
        g: 0.01,
        softening: 0.9,
        damping: 0.9983,
        coupling: 0.8,
        query_half_width: 0.1,
        half_extent: 1.0,
        seed: Some(42),
    }
}

fn neighbor(p: &Parameters, parallel: bool) -> NeighborGravity {
    NeighborGravity {
        g: p.g,
        softening: p.softening,
        coupling: p.coupling,
        query_half_width: p.query_half_width,
        half_extent: p.half_extent,
        leaf_capacity: 4,
        max_depth: 16,
        parallel,
    }
}

fn direct(p: &Parameters) -> DirectGravity {
    DirectGravity {
        g: p.g,
        softening: p.softening,
        coupling: p.coupling,
        parallel: false,
    }
}

/// Time one force evaluation: direct, quadtree window, and parallel quadtree window
pub fn bench_neighbor_vs_direct() {
    let ns = [500, 1000, 2000, 4000, 8000, 16000];
    let params = make_params();

    for n in ns {
        let set = make_set(n);
        let mut out = vec![NVec3::zeros(); n];

        let direct = direct(&params);
        let serial = neighbor(&params, false);
        let parallel = neighbor(&params, true);

        // Warm up
        direct.acceleration(&set, &mut out);
        serial.acceleration(&set, &mut out);

        let t0 = Instant::now();
        direct.acceleration(&set, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        serial.acceleration(&set, &mut out);
        let dt_tree = t1.elapsed().as_secs_f64();

        let t2 = Instant::now();
        parallel.acceleration(&set, &mut out);
        let dt_par = t2.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {dt_direct:8.6} s, quadtree = {dt_tree:8.6} s, quadtree par = {dt_par:8.6} s");
    }
}

/// Milliseconds per full step for a range of n, as CSV
pub fn bench_step_curve() {
    println!("N,direct_ms,quadtree_ms");

    let params = make_params();

    for n in (1000..=20000).step_by(1000) {
        // Large n: only 1 direct step to avoid minutes of runtime
        let steps_direct = if n <= 4000 { 3 } else { 1 };
        let steps_tree = 3;

        let mut set_direct = make_set(n);
        let forces_direct = AccelSet::new().with(direct(&params));
        let t0 = Instant::now();
        for _ in 0..steps_direct {
            step(&mut set_direct, &forces_direct, &params, params.h0);
        }
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0 / steps_direct as f64;

        let mut set_tree = make_set(n);
        let forces_tree = AccelSet::new().with(neighbor(&params, false));
        let t1 = Instant::now();
        for _ in 0..steps_tree {
            step(&mut set_tree, &forces_tree, &params, params.h0);
        }
        let ms_tree = t1.elapsed().as_secs_f64() * 1000.0 / steps_tree as f64;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_tree);
    }
}
