//! Gravitational force evaluation and integration.
//!
//! Two interaction classes, both using the same force law with a
//! squared-distance floor against singular forces at close range:
//! - massive body <-> massive body: full O(n^2) pairwise, sequential
//!   (n is small, typically tens)
//! - particle <- massive body: O(particles x bodies); particles do not
//!   attract each other, keeping per-particle cost linear in body count
//!
//! Integration is semi-implicit Euler: `v += (F/m) dt; x += v dt`.

use crate::simulation::params::Parameters;
use crate::simulation::states::{MassiveBody, NVec2, Particle};

/// Read-only snapshot of a massive body for the parallel particle phase.
#[derive(Debug, Clone, Copy)]
pub struct Attractor {
    pub position: NVec2,
    pub mass: f32,
}

impl From<&MassiveBody> for Attractor {
    fn from(body: &MassiveBody) -> Self {
        Self {
            position: body.position,
            mass: body.mass,
        }
    }
}

/// Force exerted on a mass at `pos_a` by a mass at `pos_b`:
/// `g * mass_a * mass_b / max(|r|^2, dist_sq_floor)` along `r`.
///
/// The floor softens close encounters instead of modeling collisions.
/// Exactly coincident points produce the zero vector, never NaN.
pub fn gravitational_force(
    pos_a: NVec2,
    pos_b: NVec2,
    mass_a: f32,
    mass_b: f32,
    g: f32,
    dist_sq_floor: f32,
) -> NVec2 {
    let r = pos_b - pos_a;
    let dist_sq = r.norm_squared();
    if dist_sq == 0.0 {
        return NVec2::zeros();
    }
    let magnitude = g * mass_a * mass_b / dist_sq.max(dist_sq_floor);
    r * (magnitude / dist_sq.sqrt())
}

/// Advance every massive body by one step under their mutual gravity,
/// appending to trails when `record_trails` is set.
///
/// Sequential by design: body counts stay small enough that fan-out
/// overhead would dominate. Bodies are integrated in place, in index
/// order.
pub fn step_massive_bodies(
    bodies: &mut [MassiveBody],
    dt: f32,
    params: &Parameters,
    record_trails: bool,
) {
    let n = bodies.len();
    for i in 0..n {
        let mut net = NVec2::zeros();
        for j in 0..n {
            if i == j {
                continue;
            }
            net += gravitational_force(
                bodies[i].position,
                bodies[j].position,
                bodies[i].mass,
                bodies[j].mass,
                params.g,
                params.dist_sq_floor,
            );
        }

        let body = &mut bodies[i];
        let acceleration = net / body.mass;
        body.velocity += acceleration * dt;
        body.position += body.velocity * dt;

        if record_trails {
            body.record_trail();
        }
    }
}

/// Advance one contiguous batch of particles against all attractors.
///
/// Writes are confined to the batch's own slots, so disjoint batches are
/// safe to run concurrently without locking. A particle drifting farther
/// than the cull radius from `center` is flagged inactive here; the pool
/// compacts it away afterwards, on the frame thread.
pub fn update_particle_batch(
    batch: &mut [Particle],
    attractors: &[Attractor],
    center: NVec2,
    dt: f32,
    params: &Parameters,
) {
    let cull_sq = params.cull_radius * params.cull_radius;

    for p in batch.iter_mut() {
        if !p.active {
            continue;
        }

        let mut net = NVec2::zeros();
        for attractor in attractors {
            net += gravitational_force(
                p.position,
                attractor.position,
                p.mass,
                attractor.mass,
                params.g,
                params.dist_sq_floor,
            );
        }

        p.acceleration = net / p.mass;
        p.velocity += p.acceleration * dt;
        p.position += p.velocity * dt;

        if (p.position - center).norm_squared() > cull_sq {
            p.active = false;
        }
    }
}
