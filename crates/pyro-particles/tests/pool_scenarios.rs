use glam::{Vec2, Vec4};
use pyro_particles::{GpuParticle, Particle, ParticlePool};

fn particle(life: f32) -> Particle {
    Particle::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, life)
}

#[test]
fn saturate_expire_and_refill() {
    let mut pool = ParticlePool::new(100);
    let accepted = (0..150).filter(|_| pool.spawn(particle(1.0))).count();
    assert_eq!(accepted, 100);
    assert_eq!(150 - accepted, 50);
    assert_eq!(pool.count_alive(), 100);

    assert_eq!(pool.update(1.1, |_| {}), 0);
    assert_eq!(pool.count_alive(), 0);

    for _ in 0..10 {
        assert!(pool.spawn(particle(1.0)));
    }
    assert_eq!(pool.count_alive(), 10);
    assert_eq!(pool.capacity(), 100);
}

#[test]
fn capacity_holds_across_spawns_and_resizes() {
    let mut pool = ParticlePool::new(200);
    for round in 0..5 {
        for i in 0..120 {
            pool.spawn(particle(0.5 + (i % 7) as f32 * 0.3));
            assert!(pool.count_alive() <= pool.capacity());
        }
        pool.update(0.4, |_| {});
        if round == 2 {
            pool.resize(50);
        }
        assert!(pool.count_alive() <= pool.capacity());
    }
    assert_eq!(pool.capacity(), 50);
}

#[test]
fn age_decreases_linearly_until_death() {
    let mut pool = ParticlePool::new(16);
    let a0 = 1.0f32;
    let dt = 0.15f32;
    pool.spawn(particle(a0));

    for k in 1..=10 {
        pool.update(dt, |_| {});
        let expected = (a0 - k as f32 * dt).max(0.0);
        match pool.iter_alive().next() {
            Some(p) => {
                assert!(expected > 0.0, "alive at step {k}");
                assert!((p.age - expected).abs() < 1e-4, "step {k}: {} vs {expected}", p.age);
            }
            None => assert!(expected < 1e-4, "dead early at step {k}"),
        }
    }
    assert_eq!(pool.count_alive(), 0);
}

#[test]
fn snapshot_has_every_live_particle_up_to_limit() {
    let mut pool = ParticlePool::new(64);
    for i in 0..50 {
        pool.spawn(particle(0.2 + (i % 5) as f32 * 0.2));
    }
    pool.update(0.3, |_| {});
    let alive = pool.count_alive();
    assert!(alive > 0 && alive < 50);

    let mut dest = vec![GpuParticle::default(); 64];
    for max_count in [0, 5, alive, 64] {
        let written = pool.copy_to_snapshot(&mut dest, max_count, GpuParticle::from_particle);
        assert_eq!(written, alive.min(max_count));
        assert!(dest[..written].iter().all(|g| g.age > 0.0));
    }
}

#[test]
fn full_pool_rejects_one_more() {
    let mut pool = ParticlePool::new(32);
    while pool.spawn(particle(5.0)) {}
    let before = pool.count_alive();
    assert_eq!(before, 32);
    assert!(!pool.spawn(particle(5.0)));
    assert_eq!(pool.count_alive(), before);
}
