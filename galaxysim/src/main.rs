use galaxysim::{ScenarioConfig, Scenario};
use galaxysim::{bench_neighbor_vs_direct, bench_step_curve};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Headless quadtree gravity simulation")]
struct Args {
    /// Scenario file, looked up under `scenarios/` unless it is an existing path
    #[arg(short, default_value = "galaxy.yaml")]
    file_name: String,

    /// Number of steps to run instead of `t_end / h0`
    #[arg(long)]
    steps: Option<u64>,

    /// Log diagnostics every this many steps
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Run the force and step benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let given = PathBuf::from(file_name);
    if given.exists() {
        return given;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_neighbor_vs_direct();
        bench_step_curve();
        return Ok(());
    }

    let path = scenario_path(&args.file_name);
    let cfg = ScenarioConfig::from_path(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?;
    let mut scenario = Scenario::build_scenario(&cfg).context("building scenario")?;

    let total = args.steps.unwrap_or_else(|| scenario.total_steps());
    let report_every = args.report_every.max(1);
    log::info!("running {} steps of h0 = {}", total, scenario.parameters.h0);

    let started = Instant::now();
    let mut window = Instant::now();
    for i in 1..=total {
        scenario.step();

        if i % report_every == 0 || i == total {
            let rate = report_every.min(i) as f64 / window.elapsed().as_secs_f64().max(1e-9);
            window = Instant::now();
            log::info!(
                "step {:6}  t = {:8.3}  KE = {:12.6e}  mean r = {:.4}  ({:.1} steps/s)",
                i,
                scenario.particles.t,
                scenario.particles.kinetic_energy(),
                scenario.particles.mean_radius(),
                rate,
            );
        }
    }

    log::info!("finished {} steps in {:.2} s", total, started.elapsed().as_secs_f64());
    Ok(())
}
