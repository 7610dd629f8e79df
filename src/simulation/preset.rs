//! Preset initial-condition generators.
//!
//! Each preset clears nothing itself — the frame driver wipes the pool
//! and body list first — it only populates massive bodies and emits
//! particles. Generation is driven by a caller-seeded RNG, so a given
//! seed always reproduces the same initial conditions.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f32::consts::TAU;

use crate::simulation::params::Parameters;
use crate::simulation::pool::ParticlePool;
use crate::simulation::states::{MassiveBody, NVec2, Particle, Rgba};

/// Number of presets cycled by demo mode.
pub const COUNT: usize = 5;

/// Stars effectively never expire on their own; they leave by drifting
/// past the cull radius.
const STAR_LIFETIME: f32 = 1.0e6;

pub fn name(index: usize) -> &'static str {
    match index {
        0 => "spiral galaxy",
        1 => "binary system",
        2 => "globular cluster",
        3 => "galactic collision",
        4 => "planetary ring",
        _ => "unknown",
    }
}

/// Populate `bodies` and `pool` for preset `index`. Out-of-range indices
/// fall back to the spiral galaxy.
pub fn populate<R: Rng>(
    index: usize,
    rng: &mut R,
    center: NVec2,
    params: &Parameters,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    match index {
        0 => spiral_galaxy(rng, center, params, bodies, pool),
        1 => binary_system(rng, center, params, bodies, pool),
        2 => globular_cluster(rng, center, bodies, pool),
        3 => galactic_collision(rng, center, params, bodies, pool),
        4 => planetary_ring(rng, center, params, bodies, pool),
        _ => spiral_galaxy(rng, center, params, bodies, pool),
    }
}

/// Star particle with the shared defaults filled in.
fn star(position: NVec2, velocity: NVec2, color: Rgba, size: f32) -> Particle {
    Particle {
        position,
        velocity,
        color,
        size,
        mass: 1.0,
        lifetime: STAR_LIFETIME,
        ..Particle::default()
    }
}

/// Circular-orbit velocity around a focus body, tangential to the radial
/// direction, added on top of the focus's own velocity.
fn orbit_velocity(
    position: NVec2,
    focus: NVec2,
    focus_velocity: NVec2,
    g: f32,
    focus_mass: f32,
    scale: f32,
) -> NVec2 {
    let offset = focus - position;
    let r = offset.norm().max(1.0);
    let speed = (g * focus_mass / r).sqrt() * scale;
    let to_focus = offset / r;
    focus_velocity + NVec2::new(-to_focus.y, to_focus.x) * speed
}

/// Rough main-sequence palette: mostly cool red/orange dwarfs, a few
/// hot blue giants. Returns color and size.
fn star_type<R: Rng>(rng: &mut R, young_population: bool) -> (Rgba, f32) {
    let roll: f32 = rng.gen_range(0.0..1.0);
    let jitter: f32 = rng.gen_range(0.0..1.0);
    if young_population {
        match roll {
            r if r < 0.10 => (Rgba::new(155, 176, 255, 255), 2.0 + jitter), // blue supergiant
            r if r < 0.30 => (Rgba::new(170, 191, 255, 255), 1.2 + jitter * 0.6), // blue giant
            r if r < 0.55 => (Rgba::new(202, 215, 255, 255), 0.8 + jitter * 0.4), // blue-white
            r if r < 0.80 => (Rgba::new(248, 247, 255, 255), 0.7 + jitter * 0.3), // white
            _ => (Rgba::new(255, 244, 234, 255), 0.6 + jitter * 0.3),             // yellow
        }
    } else {
        match roll {
            r if r < 0.60 => (Rgba::new(255, 160, 100, 255), 0.3 + jitter * 0.3), // red dwarf
            r if r < 0.85 => (Rgba::new(255, 200, 150, 255), 0.5 + jitter * 0.5), // orange
            r if r < 0.95 => (Rgba::new(255, 240, 200, 255), 0.8 + jitter * 0.4), // yellow
            _ => (Rgba::new(255, 120, 80, 255), 1.5 + jitter * 0.8),              // red giant
        }
    }
}

// =========================================================================
// Preset 0: spiral galaxy
// =========================================================================

fn spiral_galaxy<R: Rng>(
    rng: &mut R,
    center: NVec2,
    params: &Parameters,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    // Central supermassive object
    let core = MassiveBody::new(
        center,
        NVec2::zeros(),
        30000.0,
        5.0,
        Rgba::new(255, 255, 200, 255),
    );
    let core_mass = core.mass;
    bodies.push(core);

    const NUM_ARMS: usize = 4;
    const MAX_RADIUS: f32 = 600.0;
    const CORE_RADIUS: f32 = 80.0;
    const ARM_WIDTH: f32 = 40.0;

    let disk_height = Normal::new(0.0f32, 15.0).unwrap();

    // Galactic bulge: dense, old, yellowish
    let bulge_height = Normal::new(0.0f32, CORE_RADIUS * 0.3).unwrap();
    for _ in 0..8000 {
        let r = rng.gen_range(3.0..CORE_RADIUS);
        let angle = rng.gen_range(0.0..TAU);
        let position = center
            + NVec2::new(
                r * angle.cos(),
                r * angle.sin() + bulge_height.sample(rng),
            );
        let speed_jitter = rng.gen_range(0.5..1.5);
        let velocity = orbit_velocity(
            position,
            center,
            NVec2::zeros(),
            params.g,
            core_mass,
            speed_jitter,
        );
        let (color, size) = star_type(rng, false);
        pool.emit(&star(position, velocity, color, size));
    }

    // Spiral arms: younger, bluer stars on a logarithmic spiral, with a
    // bar structure inside 1.5 core radii
    let bar_radius = CORE_RADIUS * 1.5;
    let arm_offset = TAU / NUM_ARMS as f32;
    for i in 0..20000usize {
        let shape: f32 = rng.gen_range(0.0..1.0);
        let radius = CORE_RADIUS + (MAX_RADIUS - CORE_RADIUS) * shape.powf(0.6);
        let distance_ratio = (radius - CORE_RADIUS) / (MAX_RADIUS - CORE_RADIUS);

        // Thin out the outer rim
        if distance_ratio > 0.7 && rng.gen_range(0.0..1.0f32) > (1.0 - distance_ratio) * 2.0 {
            continue;
        }

        let arm_base = (i % NUM_ARMS) as f32 * arm_offset;
        let mut angle = if radius < bar_radius {
            arm_base
        } else {
            arm_base + (radius / bar_radius).ln() * 0.2
        };

        let in_arm = rng.gen_range(0.0..1.0f32) < 0.6;
        if in_arm {
            let arm_width = ARM_WIDTH * (1.0 - distance_ratio * 0.7);
            let spread = Normal::new(0.0f32, arm_width / radius.max(50.0)).unwrap();
            angle += spread.sample(rng);
        } else {
            angle += rng.gen_range(-arm_offset / 2.0..arm_offset / 2.0);
        }

        let height_scale = 1.0 - distance_ratio * 0.7;
        let position = center
            + NVec2::new(
                radius * angle.cos(),
                radius * angle.sin() + disk_height.sample(rng) * height_scale,
            );
        let speed_jitter = rng.gen_range(0.5..1.5);
        let velocity = orbit_velocity(
            position,
            center,
            NVec2::zeros(),
            params.g,
            core_mass,
            speed_jitter,
        );

        let (color, size) = star_type(rng, in_arm);
        let edge_fade = if distance_ratio > 0.6 {
            (-5.0 * (distance_ratio - 0.6)).exp()
        } else {
            1.0
        };
        let color = color.with_alpha((color.a as f32 * edge_fade) as u8);
        pool.emit(&star(position, velocity, color, size));
    }

    // A few globular side clusters orbiting the disk
    let cluster_spread = Normal::new(0.0f32, 20.0).unwrap();
    let cluster_height = Normal::new(0.0f32, 100.0).unwrap();
    for _ in 0..rng.gen_range(3..=6) {
        let cluster_radius = MAX_RADIUS * rng.gen_range(0.3..1.2);
        let cluster_angle = rng.gen_range(0.0..TAU);
        let cluster_center = center
            + NVec2::new(
                cluster_radius * cluster_angle.cos(),
                cluster_radius * cluster_angle.sin() + cluster_height.sample(rng),
            );
        let velocity = orbit_velocity(
            cluster_center,
            center,
            NVec2::zeros(),
            params.g,
            core_mass,
            0.8,
        );

        for _ in 0..rng.gen_range(100..=300) {
            let offset = NVec2::new(cluster_spread.sample(rng), cluster_spread.sample(rng));
            let size = 0.3 + rng.gen_range(0.0..0.4);
            pool.emit(&star(
                cluster_center + offset,
                velocity,
                Rgba::new(255, 220, 180, 255),
                size,
            ));
        }
    }
}

// =========================================================================
// Preset 1: binary system
// =========================================================================

fn binary_system<R: Rng>(
    rng: &mut R,
    center: NVec2,
    params: &Parameters,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    const SEPARATION: f32 = 200.0;
    const TOTAL_MASS: f32 = 5000.0;

    bodies.push(MassiveBody::new(
        center + NVec2::new(-SEPARATION * 0.5, 0.0),
        NVec2::new(0.0, -30.0),
        TOTAL_MASS * 0.6,
        15.0,
        Rgba::new(255, 200, 100, 255),
    ));
    bodies.push(MassiveBody::new(
        center + NVec2::new(SEPARATION * 0.5, 0.0),
        NVec2::new(0.0, 30.0),
        TOTAL_MASS * 0.4,
        12.0,
        Rgba::new(100, 150, 255, 255),
    ));

    // Flattened accretion disk around each star, two thirds of the
    // material around the lighter companion
    for i in 0..30000usize {
        let which = usize::from(i % 3 != 0);
        let (focus, focus_velocity, focus_mass) = {
            let b = &bodies[which];
            (b.position, b.velocity, b.mass)
        };

        let angle = rng.gen_range(0.0..TAU);
        let shape: f32 = rng.gen_range(0.0..1.0);
        let radius = 50.0 + 300.0 * shape * shape;
        let position = focus + NVec2::new(radius * angle.cos(), radius * angle.sin() * 0.3);
        let velocity = orbit_velocity(position, focus, focus_velocity, params.g, focus_mass, 1.0);

        let color = if which == 0 {
            Rgba::new(255, 220, 180, 150)
        } else {
            Rgba::new(180, 200, 255, 150)
        };
        pool.emit(&star(position, velocity, color, 1.0));
    }
}

// =========================================================================
// Preset 2: globular cluster
// =========================================================================

fn globular_cluster<R: Rng>(
    rng: &mut R,
    center: NVec2,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    const CLUSTER_RADIUS: f32 = 300.0;

    // A modest central mass keeps the cluster loosely bound
    bodies.push(MassiveBody::new(
        center,
        NVec2::zeros(),
        8000.0,
        4.0,
        Rgba::new(255, 240, 220, 255),
    ));

    let velocity_dist = Normal::new(-10.0f32, 20.0).unwrap();
    for _ in 0..40000 {
        let theta = rng.gen_range(0.0..TAU);
        // Cube-root shaping for uniform density in the projected sphere
        let r = CLUSTER_RADIUS * rng.gen_range(0.0..1.0f32).powf(1.0 / 3.0);
        let phi = (1.0 - 2.0 * rng.gen_range(0.0..1.0f32)).acos();
        let position = center
            + NVec2::new(r * phi.sin() * theta.cos(), r * phi.sin() * theta.sin());
        let velocity = NVec2::new(velocity_dist.sample(rng), velocity_dist.sample(rng));

        let roll: f32 = rng.gen_range(0.0..1.0);
        let (color, size) = if roll < 0.7 {
            (Rgba::new(255, 255, 200, 200), 1.0) // main sequence
        } else if roll < 0.9 {
            (Rgba::new(255, 150, 100, 200), 1.0) // red giant
        } else {
            (Rgba::new(150, 180, 255, 255), 1.5) // blue giant
        };
        pool.emit(&star(position, velocity, color, size));
    }
}

// =========================================================================
// Preset 3: galactic collision
// =========================================================================

fn galactic_collision<R: Rng>(
    rng: &mut R,
    center: NVec2,
    params: &Parameters,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    const OFFSET: f32 = 400.0;
    const CORE_MASS: f32 = 15000.0;
    const DISK_RADIUS: f32 = 220.0;

    let cores = [
        (
            center + NVec2::new(-OFFSET, -60.0),
            NVec2::new(35.0, 8.0),
            Rgba::new(255, 230, 180, 255),
        ),
        (
            center + NVec2::new(OFFSET, 60.0),
            NVec2::new(-35.0, -8.0),
            Rgba::new(190, 210, 255, 255),
        ),
    ];
    for (position, velocity, color) in cores {
        bodies.push(MassiveBody::new(position, velocity, CORE_MASS, 6.0, color));
    }

    let disk_height = Normal::new(0.0f32, 10.0).unwrap();
    for i in 0..28000usize {
        let which = i % 2;
        let (focus, focus_velocity, _) = cores[which];

        let shape: f32 = rng.gen_range(0.0..1.0);
        let radius = 15.0 + (DISK_RADIUS - 15.0) * shape.powf(0.7);
        let angle = rng.gen_range(0.0..TAU);
        let position = focus
            + NVec2::new(
                radius * angle.cos(),
                radius * angle.sin() + disk_height.sample(rng),
            );
        let jitter = rng.gen_range(0.85..1.15);
        let velocity =
            orbit_velocity(position, focus, focus_velocity, params.g, CORE_MASS, jitter);

        let (color, size) = star_type(rng, which == 1);
        pool.emit(&star(position, velocity, color, size));
    }
}

// =========================================================================
// Preset 4: planetary ring
// =========================================================================

fn planetary_ring<R: Rng>(
    rng: &mut R,
    center: NVec2,
    params: &Parameters,
    bodies: &mut Vec<MassiveBody>,
    pool: &mut ParticlePool,
) {
    const PRIMARY_MASS: f32 = 25000.0;
    const RING_INNER: f32 = 240.0;
    const RING_OUTER: f32 = 330.0;

    bodies.push(MassiveBody::new(
        center,
        NVec2::zeros(),
        PRIMARY_MASS,
        14.0,
        Rgba::new(230, 210, 170, 255),
    ));

    // A small shepherd moon just outside the ring
    let moon_position = center + NVec2::new(430.0, 0.0);
    let moon_velocity = orbit_velocity(
        moon_position,
        center,
        NVec2::zeros(),
        params.g,
        PRIMARY_MASS,
        1.0,
    );
    bodies.push(MassiveBody::new(
        moon_position,
        moon_velocity,
        800.0,
        5.0,
        Rgba::new(200, 200, 210, 255),
    ));

    let thickness = Normal::new(0.0f32, 6.0).unwrap();
    for _ in 0..25000 {
        let radius = rng.gen_range(RING_INNER..RING_OUTER) + thickness.sample(rng);
        let angle = rng.gen_range(0.0..TAU);
        let position = center + NVec2::new(radius * angle.cos(), radius * angle.sin());
        let jitter = rng.gen_range(0.98..1.02);
        let velocity = orbit_velocity(
            position,
            center,
            NVec2::zeros(),
            params.g,
            PRIMARY_MASS,
            jitter,
        );

        let shade = rng.gen_range(170..=240u8);
        let color = Rgba::new(shade, shade, (shade as f32 * 0.9) as u8, 200);
        pool.emit(&star(position, velocity, color, 0.8));
    }
}
