// benches/mount_probe_benchmark.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::{Mat4, Vec3};
use rand::Rng;
use snowscape::engine_lib::collision::{box_corners, is_intersect_obb};
use snowscape::engine_lib::terrain::{Heightfield, HEIGHTMAP_SAMPLES};

fn random_probe(rng: &mut impl Rng) -> (Vec3, Mat4) {
    let center = Vec3::new(
        rng.gen_range(4.0..12.0),
        rng.gen_range(0.0..4.0),
        rng.gen_range(-4.0..4.0),
    );
    let rotation = Mat4::from_rotation_y(rng.gen_range(0.0..std::f32::consts::TAU));
    (center, rotation)
}

fn mount_probe_benchmark_fn(c: &mut Criterion) {
    let mut rng = rand::thread_rng();

    const NUM_BENCH_PROBES: usize = 100;
    let probes: Vec<(Vec3, Mat4)> = (0..NUM_BENCH_PROBES).map(|_| random_probe(&mut rng)).collect();
    let corners = box_corners(Vec3::new(8.0, 1.725, 0.0), Vec3::ONE);

    let samples: Vec<u16> = (0..HEIGHTMAP_SAMPLES).map(|_| rng.gen()).collect();
    let field = Heightfield::from_samples("bench", &samples, 16.0).unwrap();
    let points: Vec<(f32, f32)> = (0..NUM_BENCH_PROBES)
        .map(|_| (rng.gen_range(0.0..15.0), rng.gen_range(0.0..15.0)))
        .collect();

    let mut group = c.benchmark_group("MountProbeOperations");

    group.bench_function("is_intersect_obb_100_probes", |b| {
        let mut probe_iter = probes.iter().cycle();
        b.iter(|| {
            let (center, rotation) = probe_iter.next().unwrap();
            is_intersect_obb(
                black_box(*center),
                black_box(Vec3::ONE),
                black_box(*rotation),
                black_box(&corners),
            )
        })
    });

    group.bench_function("terrain_get_height_100_points", |b| {
        let mut point_iter = points.iter().cycle();
        b.iter(|| {
            let (x, z) = point_iter.next().unwrap();
            field.get_height(black_box(*x), black_box(*z))
        })
    });
    group.finish();
}

criterion_group!(benches, mount_probe_benchmark_fn);
criterion_main!(benches);
