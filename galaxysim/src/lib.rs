pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Particle, ParticleSet, Role, NVec3, safe_normalize, perp};
pub use simulation::quadtree::{QuadTree, Rect, MAX_TREE_DEPTH};
pub use simulation::forces::{pairwise_force, Acceleration, AccelSet, NeighborGravity, DirectGravity};
pub use simulation::integrator::{step, wrap_position};
pub use simulation::scenario::{initialize, spin_velocity, Scenario};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::error::SimError;

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, InitConfig, AnchorConfig, BodyConfig, InitMode};

pub use benchmark::benchmark::{bench_neighbor_vs_direct, bench_step_curve};
