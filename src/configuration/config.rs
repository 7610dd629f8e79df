//! Command-line and runtime configuration.
//!
//! The binary is configured from flags, with an optional YAML file
//! overriding the numerical parameters:
//!
//! ```text
//! galsim --width 1280 --height 720 --no-vsync --preset 2 --seed 7
//! galsim --demo                  # cycle every preset round-robin, 8s each
//! galsim --params tuned.yaml
//! ```
//!
//! # YAML format
//! Every field is optional and falls back to its default:
//!
//! ```yaml
//! g: 100.0            # gravitational constant
//! dist_sq_floor: 10.0 # squared-separation floor in force evaluation
//! seed: 42            # base preset seed
//! time_dilation_min: 0.1
//! time_dilation_max: 10.0
//! ```
//!
//! `Args` is the clap-facing surface; [`DisplayConfig`] and [`SimConfig`]
//! are the plain runtime structs handed to the viewer and the simulation.
//! An explicit `--seed` and the window-derived cull radius take precedence
//! over the file.

use anyhow::Result;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::simulation::params::Parameters;

#[derive(Parser, Debug)]
#[command(name = "galsim", about = "Interactive N-body particle galaxy demo")]
pub struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// Start fullscreen
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Disable vsync
    #[arg(long)]
    pub no_vsync: bool,

    /// Cycle presets automatically every few seconds
    #[arg(long)]
    pub demo: bool,

    /// Initial preset index (0..=4)
    #[arg(long, default_value_t = 0)]
    pub preset: usize,

    /// Particle pool capacity
    #[arg(long, default_value_t = 30000)]
    pub particles: usize,

    /// Physics worker threads; 0 = detected parallelism
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    /// Base RNG seed for preset generation (overrides a params file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional YAML file overriding simulation parameters
    #[arg(long)]
    pub params: Option<PathBuf>,
}

/// Load simulation parameters from a YAML file; unspecified fields keep
/// their defaults.
pub fn load_parameters(path: &Path) -> Result<Parameters> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let params = serde_yaml::from_reader(reader)?;
    Ok(params)
}

/// Window parameters consumed by the viewer.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fullscreen: bool,
    pub vsync: bool,
}

/// Simulation parameters consumed by `GalaxySim::new`.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub capacity: usize, // particle pool size
    pub workers: usize,  // 0 = detected
    pub preset: usize,
    pub demo: bool,
}

impl Args {
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            width: self.width,
            height: self.height,
            title: "galsim - particle galaxy".to_string(),
            fullscreen: self.fullscreen,
            vsync: !self.no_vsync,
        }
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            capacity: self.particles,
            workers: self.workers,
            preset: self.preset,
            demo: self.demo,
        }
    }
}
