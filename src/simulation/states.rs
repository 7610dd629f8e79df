//! Core state types for the particle galaxy simulation.
//!
//! Defines the two simulated populations:
//! - [`Particle`] — lightweight pooled point masses, attracted by massive
//!   bodies but never by each other
//! - [`MassiveBody`] — gravitationally significant objects with a bounded
//!   trail history, directly controlled by simulation logic
//!
//! Positions and velocities use `NVec2` (nalgebra, single precision).

use nalgebra::Vector2;
use std::collections::VecDeque;

pub type NVec2 = Vector2<f32>;

/// RGBA color with 8-bit channels, independent of the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a replaced alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// One pooled point mass. An inactive particle's fields are don't-care
/// except `active`; hot-path physics never iterates past the pool's
/// active prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: NVec2, // world position
    pub velocity: NVec2,
    pub acceleration: NVec2, // last computed net acceleration
    pub mass: f32,
    pub size: f32, // visual size in world units
    pub color: Rgba,
    pub age: f32,      // seconds since emission
    pub lifetime: f32, // seconds until automatic deactivation
    pub active: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: NVec2::zeros(),
            velocity: NVec2::zeros(),
            acceleration: NVec2::zeros(),
            mass: 1.0,
            size: 1.0,
            color: Rgba::WHITE,
            age: 0.0,
            lifetime: 1.0,
            active: false,
        }
    }
}

/// A gravity source, rendered distinctly from particles and limited in
/// count. Lives for the duration of the active preset; cleared wholesale
/// on preset switch.
#[derive(Debug, Clone)]
pub struct MassiveBody {
    pub position: NVec2,
    pub velocity: NVec2,
    pub mass: f32,
    pub radius: f32, // visual radius
    pub color: Rgba,
    pub trail: VecDeque<NVec2>, // recent positions, capped ring buffer
}

impl MassiveBody {
    /// Trail length cap; the oldest entry is evicted on overflow.
    pub const MAX_TRAIL_LENGTH: usize = 50;

    pub fn new(position: NVec2, velocity: NVec2, mass: f32, radius: f32, color: Rgba) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius,
            color,
            trail: VecDeque::with_capacity(Self::MAX_TRAIL_LENGTH),
        }
    }

    /// Append the current position to the trail, evicting the oldest
    /// entry once the cap is reached.
    pub fn record_trail(&mut self) {
        if self.trail.len() == Self::MAX_TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(self.position);
    }
}
