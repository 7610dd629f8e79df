//! Fixed-capacity particle pool with a packed active prefix.
//!
//! Slots `[0, active)` hold live particles; `[active, capacity)` are
//! inactive and unordered. Emission copies a template into the first
//! inactive slot; removal swaps the dead particle with the last active
//! one and shrinks the prefix, so the hot physics loops only ever touch
//! the active range. Emission on a full pool is a silent no-op — that is
//! backpressure, not an error.

use crate::simulation::states::Particle;

#[derive(Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    active: usize, // indices [0, active) are live
}

impl ParticlePool {
    /// Create a pool with `capacity` slots, all inactive.
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            active: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Activate one particle by copying `template` with its age reset.
    /// Returns `false` when the pool is full (normal condition).
    pub fn emit(&mut self, template: &Particle) -> bool {
        if self.active == self.particles.len() {
            return false;
        }
        let slot = &mut self.particles[self.active];
        *slot = *template;
        slot.age = 0.0;
        slot.active = true;
        self.active += 1;
        true
    }

    /// Emit up to `count` copies of `template`, stopping early without
    /// error once the pool fills. Returns the number actually emitted.
    pub fn emit_burst(&mut self, count: usize, template: &Particle) -> usize {
        let mut emitted = 0;
        for _ in 0..count {
            if !self.emit(template) {
                break;
            }
            emitted += 1;
        }
        emitted
    }

    /// Age every active particle by `dt` and compact away the dead.
    ///
    /// A particle dies when its age reaches its lifetime, or when the
    /// physics phase already flagged it inactive (out-of-radius cull).
    /// Removal swaps with the last active slot and shrinks the prefix,
    /// so the swapped-in particle is re-examined at the same index.
    /// Ordering among active particles is not preserved.
    pub fn update(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.active {
            let p = &mut self.particles[i];
            p.age += dt;
            if !p.active || p.age >= p.lifetime {
                p.active = false;
                self.active -= 1;
                self.particles.swap(i, self.active);
                // slot i now holds what was the last active particle
            } else {
                i += 1;
            }
        }
    }

    /// Deactivate everything. Slot memory is left as-is.
    pub fn clear(&mut self) {
        self.active = 0;
    }

    /// Read view of the active prefix (rendering).
    pub fn active(&self) -> &[Particle] {
        &self.particles[..self.active]
    }

    /// Mutable view of the active prefix (physics). Parallel batch
    /// access must stay within disjoint sub-ranges of this slice.
    pub fn active_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.active]
    }
}
