pub mod configuration;
pub mod core;
pub mod simulation;
pub mod visualization;

pub use crate::configuration::config::{load_parameters, Args, DisplayConfig, SimConfig};
pub use crate::core::worker_pool::{SubmitError, TaskHandle, WorkerPool};
pub use crate::simulation::forces::{gravitational_force, Attractor};
pub use crate::simulation::frame::{GalaxySim, SimCommand, SimState};
pub use crate::simulation::params::Parameters;
pub use crate::simulation::pool::ParticlePool;
pub use crate::simulation::states::{MassiveBody, NVec2, Particle, Rgba};

pub use crate::visualization::vis2d::{panic_message, run_app};
