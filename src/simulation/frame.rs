//! Per-frame simulation driver.
//!
//! `GalaxySim` is the runtime bundle inserted into Bevy as a `Resource`
//! and driven once per frame by the viewer. Each frame runs, in order:
//!
//! 1. massive-body mutual gravity + integration + trail recording
//! 2. parallel particle batch dispatch (barriered)
//! 3. particle pool aging / cull compaction
//! 4. hand-off of the active view to rendering (read-only)
//!
//! Step 3 must run strictly after step 2 — compaction during concurrent
//! physics would race. The worker pool never touches the active-count
//! boundary; only this driver does.

use bevy::log::{info, warn};
use bevy::prelude::Resource;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::configuration::config::SimConfig;
use crate::core::worker_pool::WorkerPool;
use crate::simulation::params::Parameters;
use crate::simulation::pool::ParticlePool;
use crate::simulation::states::{MassiveBody, NVec2, Particle, Rgba};
use crate::simulation::{forces, preset, scheduler};

/// Demo mode switches preset round-robin on this period.
const DEMO_DURATION: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Running,
    Paused,
    Stopped, // terminal
}

/// Discrete commands produced by the input boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    SwitchPreset(usize),
    ResetPreset,
    TogglePause,
    ToggleTrails,
    ToggleGrid,
    AddBody(NVec2),
    ScaleTimeDilation { up: bool },
    Shutdown,
}

#[derive(Resource)]
pub struct GalaxySim {
    params: Parameters,
    // Declared before the pool: drop order joins the workers while the
    // particle storage they may still reference is alive
    workers: WorkerPool,
    pool: ParticlePool,
    bodies: Vec<MassiveBody>,
    rng: ChaCha8Rng,
    state: SimState,
    time_dilation: f32,
    current_preset: usize,
    show_trails: bool,
    show_grid: bool,
    demo_timer: Option<f32>, // Some while demo mode cycles presets
    center: NVec2,
}

impl GalaxySim {
    /// Build the simulation and populate the initial preset.
    pub fn new(config: &SimConfig, params: Parameters) -> Self {
        let mut sim = Self {
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            params,
            pool: ParticlePool::new(config.capacity),
            bodies: Vec::new(),
            workers: WorkerPool::new(config.workers),
            state: SimState::Running,
            time_dilation: 1.0,
            current_preset: 0,
            show_trails: true,
            show_grid: false,
            demo_timer: config.demo.then_some(0.0),
            center: NVec2::zeros(),
        };
        sim.create_preset(config.preset.min(preset::COUNT - 1));
        sim
    }

    /// Advance one frame by `dt` seconds of wall time. A no-op unless
    /// Running; rendering and input continue regardless.
    pub fn advance(&mut self, dt: f32) {
        if self.state != SimState::Running {
            return;
        }

        // Demo cycling runs on wall time, not dilated time
        if let Some(timer) = &mut self.demo_timer {
            *timer += dt;
            if *timer >= DEMO_DURATION {
                *timer = 0.0;
                let next = (self.current_preset + 1) % preset::COUNT;
                self.create_preset(next);
                info!("demo mode: switched to preset '{}'", preset::name(next));
            }
        }

        let dt = dt * self.time_dilation;

        // Phase 1: bodies integrate sequentially; read-only afterwards
        forces::step_massive_bodies(&mut self.bodies, dt, &self.params, self.show_trails);

        // Phase 2: parallel particle batches, barriered inside dispatch
        scheduler::dispatch(
            &self.workers,
            self.pool.active_mut(),
            &self.bodies,
            self.center,
            dt,
            &self.params,
        );

        // Phase 3: age and compact, strictly after the barrier
        self.pool.update(dt);
    }

    /// React to one input command. Everything here is a recoverable
    /// condition; out-of-range presets are reported and dropped.
    pub fn apply(&mut self, command: SimCommand) {
        if self.state == SimState::Stopped {
            return;
        }
        match command {
            SimCommand::SwitchPreset(index) => {
                if index < preset::COUNT {
                    self.create_preset(index);
                } else {
                    warn!("ignoring unknown preset {index}");
                }
            }
            SimCommand::ResetPreset => self.create_preset(self.current_preset),
            SimCommand::TogglePause => {
                self.state = match self.state {
                    SimState::Running => SimState::Paused,
                    SimState::Paused => SimState::Running,
                    SimState::Stopped => SimState::Stopped,
                };
            }
            SimCommand::ToggleTrails => {
                self.show_trails = !self.show_trails;
                if !self.show_trails {
                    for body in &mut self.bodies {
                        body.trail.clear();
                    }
                }
            }
            SimCommand::ToggleGrid => self.show_grid = !self.show_grid,
            SimCommand::AddBody(position) => self.add_body(position),
            SimCommand::ScaleTimeDilation { up } => {
                let factor = if up { 1.1 } else { 0.9 };
                self.time_dilation = (self.time_dilation * factor)
                    .clamp(self.params.time_dilation_min, self.params.time_dilation_max);
            }
            SimCommand::Shutdown => {
                self.state = SimState::Stopped;
                self.workers.shutdown();
                info!("simulation stopped");
            }
        }
    }

    /// Wipe bodies and particles, reseed, and build preset `index`.
    /// The seed policy makes every (seed, preset) pair reproducible.
    fn create_preset(&mut self, index: usize) {
        self.current_preset = index;
        self.bodies.clear();
        self.pool.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.params.seed.wrapping_add(index as u64));
        preset::populate(
            index,
            &mut self.rng,
            self.center,
            &self.params,
            &mut self.bodies,
            &mut self.pool,
        );
        info!(
            "created preset '{}' with {} particles and {} massive bodies",
            preset::name(index),
            self.pool.active_count(),
            self.bodies.len(),
        );
    }

    /// Inject a new massive body at a world position (mouse click).
    fn add_body(&mut self, position: NVec2) {
        let color = Rgba::new(
            self.rng.gen_range(150..=255),
            self.rng.gen_range(150..=255),
            self.rng.gen_range(150..=255),
            255,
        );
        self.bodies
            .push(MassiveBody::new(position, NVec2::zeros(), 1000.0, 8.0, color));
        info!("added massive body at ({:.1}, {:.1})", position.x, position.y);
    }

    // Read accessors for the render/input boundary

    pub fn particles(&self) -> &[Particle] {
        self.pool.active()
    }

    pub fn bodies(&self) -> &[MassiveBody] {
        &self.bodies
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn time_dilation(&self) -> f32 {
        self.time_dilation
    }

    pub fn current_preset(&self) -> usize {
        self.current_preset
    }

    pub fn show_trails(&self) -> bool {
        self.show_trails
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }
}
