use galsim::simulation::scheduler::{dispatch, partition};
use galsim::{
    gravitational_force, load_parameters, panic_message, GalaxySim, MassiveBody, NVec2,
    Parameters, Particle, ParticlePool, Rgba, SimCommand, SimConfig, SimState, SubmitError,
    WorkerPool,
};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default physics parameters for tests; huge cull radius so nothing
/// gets deactivated unless a test wants it
fn test_params() -> Parameters {
    Parameters {
        cull_radius: 1.0e9,
        ..Parameters::default()
    }
}

/// Particle template with a given lifetime, at rest at the origin
fn template(lifetime: f32) -> Particle {
    Particle {
        lifetime,
        ..Particle::default()
    }
}

/// Two massive bodies of the given masses separated by `dist` along x
fn two_bodies(dist: f32, m1: f32, m2: f32) -> Vec<MassiveBody> {
    vec![
        MassiveBody::new(NVec2::zeros(), NVec2::zeros(), m1, 1.0, Rgba::WHITE),
        MassiveBody::new(NVec2::new(dist, 0.0), NVec2::zeros(), m2, 1.0, Rgba::WHITE),
    ]
}

/// Small simulation driver for frame-level tests
fn small_sim(preset: usize, demo: bool) -> GalaxySim {
    let config = SimConfig {
        capacity: 500,
        workers: 2,
        preset,
        demo,
    };
    GalaxySim::new(&config, test_params())
}

// ==================================================================================
// Particle pool tests
// ==================================================================================

#[test]
fn pool_capacity_invariant() {
    let mut pool = ParticlePool::new(3);
    assert!(pool.emit(&template(1.0)));
    assert!(pool.emit(&template(1.0)));
    assert!(pool.emit(&template(1.0)));
    assert_eq!(pool.active_count(), 3);

    // Fourth emit fails silently and leaves state unchanged
    assert!(!pool.emit(&template(1.0)));
    assert_eq!(pool.active_count(), 3);
}

#[test]
fn pool_emit_resets_age() {
    let mut pool = ParticlePool::new(1);
    let mut t = template(1.0);
    t.age = 5.0;
    assert!(pool.emit(&t));
    assert_eq!(pool.active()[0].age, 0.0);
    assert!(pool.active()[0].active);
}

#[test]
fn pool_emit_burst_stops_at_capacity() {
    let mut pool = ParticlePool::new(10);
    assert_eq!(pool.emit_burst(7, &template(1.0)), 7);
    assert_eq!(pool.emit_burst(7, &template(1.0)), 3);
    assert_eq!(pool.active_count(), 10);
}

#[test]
fn pool_lifetime_expiry() {
    let mut pool = ParticlePool::new(4);
    pool.emit(&template(1.0));

    // 0.6 + 0.5 = 1.1 >= 1.0 lifetime
    pool.update(0.6);
    assert_eq!(pool.active_count(), 1);
    pool.update(0.5);
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn pool_compaction_keeps_survivors() {
    let mut pool = ParticlePool::new(8);
    // Interleave long- and short-lived particles, tagged by size
    for (i, lifetime) in [10.0, 0.5, 10.0, 0.5, 10.0].iter().enumerate() {
        let mut t = template(*lifetime);
        t.size = i as f32;
        pool.emit(&t);
    }

    pool.update(1.0);

    // Exactly the three long-lived particles remain, order unspecified
    assert_eq!(pool.active_count(), 3);
    let mut tags: Vec<i32> = pool.active().iter().map(|p| p.size as i32).collect();
    tags.sort();
    assert_eq!(tags, vec![0, 2, 4]);
    assert!(pool.active().iter().all(|p| p.active));
}

#[test]
fn pool_compacts_physics_flagged_particles() {
    let mut pool = ParticlePool::new(4);
    pool.emit_burst(4, &template(100.0));

    // Physics phase flags a particle inactive in its own slot
    pool.active_mut()[1].active = false;
    pool.update(0.01);

    assert_eq!(pool.active_count(), 3);
}

#[test]
fn pool_clear_resets_active_count() {
    let mut pool = ParticlePool::new(5);
    pool.emit_burst(5, &template(1.0));
    pool.clear();
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.capacity(), 5);
    // Pool is reusable after clear
    assert!(pool.emit(&template(1.0)));
}

// ==================================================================================
// Worker pool tests
// ==================================================================================

#[test]
fn worker_pool_returns_results() {
    let pool = WorkerPool::new(4);
    let handle = pool.submit(|| 42).unwrap();
    assert_eq!(handle.wait(), 42);

    let handles: Vec<_> = (0..10)
        .map(|i| pool.submit(move || i * i).unwrap())
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.wait(), i * i);
    }
}

#[test]
fn worker_pool_counter_completion() {
    let pool = WorkerPool::new(4);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..100 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.wait_for_all();
    assert_eq!(counter.load(Ordering::SeqCst), 100);
    assert_eq!(pool.pending_tasks(), 0);
}

#[test]
fn worker_pool_parallel_for_each() {
    let pool = WorkerPool::new(4);
    let mut data = vec![0u32; 100];
    let sum = Arc::new(AtomicUsize::new(0));

    let sum_ref = Arc::clone(&sum);
    pool.parallel_for_each(&mut data, move |value| {
        *value = 1;
        sum_ref.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(sum.load(Ordering::SeqCst), 100);
    assert!(data.iter().all(|&v| v == 1));
}

#[test]
fn worker_pool_rejects_submit_after_shutdown() {
    let pool = WorkerPool::new(2);
    pool.shutdown();
    let result = pool.submit(|| ());
    assert!(matches!(result, Err(SubmitError::PoolClosed)));
}

#[test]
fn worker_pool_drains_queue_on_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = WorkerPool::new(2);
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        // Drop joins workers; queued tasks must not be lost
    }
    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

#[test]
#[should_panic(expected = "task failure")]
fn worker_pool_propagates_task_panic() {
    let pool = WorkerPool::new(1);
    let handle = pool.submit(|| panic!("task failure")).unwrap();
    // The panic surfaces at the waiter, not in the worker thread
    handle.wait();
}

#[test]
fn worker_pool_survives_task_panic() {
    let pool = WorkerPool::new(1);
    let handle = pool.submit(|| panic!("task failure")).unwrap();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handle.wait()));
    assert!(outcome.is_err());

    // The worker that ran the faulting task keeps serving the queue
    pool.wait_for_all();
    let handle = pool.submit(|| 7).unwrap();
    assert_eq!(handle.wait(), 7);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn force_newton_third_law() {
    let a = NVec2::new(-3.0, 1.5);
    let b = NVec2::new(4.0, -2.0);
    let f_ab = gravitational_force(a, b, 2.0, 7.0, 100.0, 10.0);
    let f_ba = gravitational_force(b, a, 7.0, 2.0, 100.0, 10.0);
    assert!((f_ab + f_ba).norm() < 1e-4, "forces not equal and opposite");
}

#[test]
fn force_distance_floor_bounds_magnitude() {
    // Zero separation: finite, zero vector
    let p = NVec2::new(1.0, 2.0);
    let f = gravitational_force(p, p, 5.0, 5.0, 100.0, 10.0);
    assert!(f.norm().is_finite());
    assert_eq!(f, NVec2::zeros());

    // Near-zero separation: clamped by the floor, never exceeding
    // G m1 m2 / floor
    let close = gravitational_force(p, p + NVec2::new(1e-4, 0.0), 5.0, 5.0, 100.0, 10.0);
    assert!(close.norm().is_finite());
    assert!(close.norm() <= 100.0 * 5.0 * 5.0 / 10.0 + 1e-3);
}

#[test]
fn force_two_body_scenario() {
    // Masses 100 and 200 at distance 10 with G = 100:
    // |F| = 100 * 100 * 200 / 100 = 20000
    let f = gravitational_force(
        NVec2::zeros(),
        NVec2::new(10.0, 0.0),
        100.0,
        200.0,
        100.0,
        10.0,
    );
    assert!((f.norm() - 20000.0).abs() < 1.0);
    assert!(f.x > 0.0, "force must point toward the other body");
}

#[test]
fn body_integration_step() {
    let mut bodies = two_bodies(10.0, 100.0, 200.0);
    let params = test_params();

    galsim::simulation::forces::step_massive_bodies(&mut bodies, 0.1, &params, false);

    // v1 += (20000 / 100) * 0.1 = 20 toward body 2
    assert!((bodies[0].velocity.x - 20.0).abs() < 1e-2);
    // Body 2 is pulled the other way
    assert!(bodies[1].velocity.x < 0.0);
}

#[test]
fn body_trail_is_capped() {
    let mut body = MassiveBody::new(NVec2::zeros(), NVec2::zeros(), 1.0, 1.0, Rgba::WHITE);
    for i in 0..(MassiveBody::MAX_TRAIL_LENGTH + 20) {
        body.position.x = i as f32;
        body.record_trail();
    }
    assert_eq!(body.trail.len(), MassiveBody::MAX_TRAIL_LENGTH);
    // Oldest entries were evicted
    assert_eq!(body.trail.front().map(|p| p.x), Some(20.0));
}

// ==================================================================================
// Scheduler tests
// ==================================================================================

#[test]
fn partition_covers_every_index_once() {
    for len in [0usize, 1, 7, 250, 999, 1000, 1001] {
        for workers in [1usize, 2, 3, 4, 7, 16] {
            let ranges = partition(len, workers);
            let mut covered = vec![0u8; len];
            for range in &ranges {
                for i in range.clone() {
                    covered[i] += 1;
                }
            }
            assert!(
                covered.iter().all(|&c| c == 1),
                "bad partition for len={len} workers={workers}"
            );
            assert!(ranges.len() <= workers);
        }
    }
}

#[test]
fn partition_batch_sizes() {
    // 1000 over 4 workers: four contiguous batches of 250
    let ranges = partition(1000, 4);
    assert_eq!(ranges, vec![0..250, 250..500, 500..750, 750..1000]);
}

#[test]
fn dispatch_updates_each_particle_exactly_once() {
    let pool = WorkerPool::new(4);
    let params = test_params();

    // No attractors; unit velocity means each position advances by
    // exactly dt per physics phase
    let mut particles = vec![
        Particle {
            velocity: NVec2::new(1.0, 0.0),
            active: true,
            lifetime: 100.0,
            ..Particle::default()
        };
        1000
    ];

    dispatch(&pool, &mut particles, &[], NVec2::zeros(), 1.0, &params);

    assert!(particles.iter().all(|p| (p.position.x - 1.0).abs() < 1e-6));
}

#[test]
fn dispatch_culls_beyond_radius() {
    let pool = WorkerPool::new(2);
    let params = Parameters {
        cull_radius: 100.0,
        ..Parameters::default()
    };

    let mut inside = Particle {
        active: true,
        lifetime: 100.0,
        ..Particle::default()
    };
    inside.position = NVec2::new(50.0, 0.0);
    let mut outside = inside;
    outside.position = NVec2::new(500.0, 0.0);

    let mut particles = vec![inside, outside];
    dispatch(&pool, &mut particles, &[], NVec2::zeros(), 0.01, &params);

    assert!(particles[0].active);
    assert!(!particles[1].active, "out-of-radius particle must be flagged");
}

// ==================================================================================
// Frame driver tests
// ==================================================================================

#[test]
fn preset_generation_is_deterministic() {
    let a = small_sim(0, false);
    let b = small_sim(0, false);

    assert_eq!(a.active_count(), b.active_count());
    assert!(a.active_count() > 0);
    assert_eq!(a.bodies().len(), b.bodies().len());
    for (pa, pb) in a.particles().iter().zip(b.particles()).take(20) {
        assert_eq!(pa.position, pb.position);
        assert_eq!(pa.velocity, pb.velocity);
    }
}

#[test]
fn preset_switch_repopulates() {
    let mut sim = small_sim(0, false);
    let bodies_before = sim.bodies().len();

    sim.apply(SimCommand::SwitchPreset(1));
    assert_eq!(sim.current_preset(), 1);
    assert_eq!(sim.bodies().len(), 2); // binary system
    assert!(sim.active_count() > 0);

    // Unknown preset index is reported and dropped
    sim.apply(SimCommand::SwitchPreset(99));
    assert_eq!(sim.current_preset(), 1);

    sim.apply(SimCommand::SwitchPreset(0));
    assert_eq!(sim.bodies().len(), bodies_before);
}

#[test]
fn pause_skips_updates() {
    let mut sim = small_sim(1, false);
    sim.apply(SimCommand::TogglePause);
    assert_eq!(sim.state(), SimState::Paused);

    let before: Vec<NVec2> = sim.particles().iter().map(|p| p.position).collect();
    sim.advance(0.25);
    let after: Vec<NVec2> = sim.particles().iter().map(|p| p.position).collect();
    assert_eq!(before, after);

    sim.apply(SimCommand::TogglePause);
    assert_eq!(sim.state(), SimState::Running);
    sim.advance(0.25);
    assert_ne!(
        before,
        sim.particles().iter().map(|p| p.position).collect::<Vec<_>>()
    );
}

#[test]
fn time_dilation_is_clamped() {
    let mut sim = small_sim(2, false);
    for _ in 0..60 {
        sim.apply(SimCommand::ScaleTimeDilation { up: true });
    }
    assert_eq!(sim.time_dilation(), 10.0);

    for _ in 0..120 {
        sim.apply(SimCommand::ScaleTimeDilation { up: false });
    }
    assert_eq!(sim.time_dilation(), 0.1);
}

#[test]
fn demo_mode_cycles_presets() {
    let mut sim = small_sim(0, true);
    assert_eq!(sim.current_preset(), 0);

    sim.advance(8.0);
    assert_eq!(sim.current_preset(), 1);

    sim.advance(8.0);
    assert_eq!(sim.current_preset(), 2);
}

#[test]
fn shutdown_is_terminal() {
    let mut sim = small_sim(0, false);
    sim.apply(SimCommand::Shutdown);
    assert_eq!(sim.state(), SimState::Stopped);

    // No state transition or update escapes Stopped
    sim.apply(SimCommand::TogglePause);
    assert_eq!(sim.state(), SimState::Stopped);

    let before: Vec<NVec2> = sim.particles().iter().map(|p| p.position).collect();
    sim.advance(1.0);
    let after: Vec<NVec2> = sim.particles().iter().map(|p| p.position).collect();
    assert_eq!(before, after);
}

#[test]
fn toggle_trails_clears_history() {
    let mut sim = small_sim(1, false);
    sim.advance(0.1);
    assert!(sim.bodies().iter().any(|b| !b.trail.is_empty()));

    sim.apply(SimCommand::ToggleTrails);
    assert!(!sim.show_trails());
    assert!(sim.bodies().iter().all(|b| b.trail.is_empty()));
}

#[test]
fn add_body_appends() {
    let mut sim = small_sim(2, false);
    let before = sim.bodies().len();
    sim.apply(SimCommand::AddBody(NVec2::new(100.0, -50.0)));
    assert_eq!(sim.bodies().len(), before + 1);
    let added = sim.bodies().last().unwrap();
    assert_eq!(added.position, NVec2::new(100.0, -50.0));
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn parameters_deserialize_with_defaults() {
    let params: Parameters = serde_yaml::from_str("g: 250.0\nseed: 7\n").unwrap();
    assert_eq!(params.g, 250.0);
    assert_eq!(params.seed, 7);

    // Unspecified fields keep their defaults
    let defaults = Parameters::default();
    assert_eq!(params.dist_sq_floor, defaults.dist_sq_floor);
    assert_eq!(params.time_dilation_min, defaults.time_dilation_min);
    assert_eq!(params.time_dilation_max, defaults.time_dilation_max);
}

#[test]
fn parameters_load_from_file() {
    let path = std::env::temp_dir().join("galsim_params_test.yaml");
    std::fs::write(&path, "g: 50.0\ndist_sq_floor: 4.0\n").unwrap();

    let params = load_parameters(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(params.g, 50.0);
    assert_eq!(params.dist_sq_floor, 4.0);
    assert_eq!(params.seed, Parameters::default().seed);
}

#[test]
fn load_parameters_reports_missing_file() {
    let path = std::env::temp_dir().join("galsim_params_does_not_exist.yaml");
    assert!(load_parameters(&path).is_err());
}

#[test]
fn panic_payload_is_described() {
    let payload = std::panic::catch_unwind(|| panic!("frame fault")).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "frame fault");

    let payload = std::panic::catch_unwind(|| panic!("code {}", 3)).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "code 3");
}
