//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant `g`,
//! - the squared-distance floor that prevents singular forces,
//! - the cull radius beyond which particles are deactivated,
//! - time-dilation clamp bounds and the RNG seed

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub g: f32,             // gravitational constant
    pub dist_sq_floor: f32, // minimum squared separation used in force evaluation
    pub cull_radius: f32,   // particles farther than this from the center are deactivated
    pub time_dilation_min: f32, // lower clamp for the user-adjustable time scale
    pub time_dilation_max: f32, // upper clamp for the user-adjustable time scale
    pub seed: u64,          // base seed for preset generation
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: 100.0,
            dist_sq_floor: 10.0,
            cull_radius: 2880.0, // 1.5x a 1920px-wide view
            time_dilation_min: 0.1,
            time_dilation_max: 10.0,
            seed: 42,
        }
    }
}
