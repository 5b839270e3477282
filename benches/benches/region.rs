// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_region::{IntPoint, IntRect, IntVec2, Region};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_i32(&mut self, upper_exclusive: i32) -> i32 {
        if upper_exclusive <= 0 {
            return 0;
        }
        (self.next_u32() % upper_exclusive as u32) as i32
    }
}

fn random_rects(n: usize, extent: i32, max_size: i32, seed: u64) -> Vec<IntRect> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| {
            IntRect::from_xywh(
                rng.gen_range_i32(extent),
                rng.gen_range_i32(extent),
                1 + rng.gen_range_i32(max_size),
                1 + rng.gen_range_i32(max_size),
            )
        })
        .collect()
}

fn build_region(n: usize, seed: u64) -> Region {
    random_rects(n, 1_000, 80, seed).into_iter().collect()
}

fn bench_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_region");
    group.sample_size(50);

    for &n in &[16_usize, 128, 1_024] {
        let rects = random_rects(n, 1_000, 80, 0x5EA1_0000_0000_0001);
        group.bench_function(format!("unite_rects(n={n})"), |b| {
            b.iter(|| {
                let mut region = Region::new();
                for rect in &rects {
                    region.unite_rect(*rect);
                }
                black_box(region);
            });
        });

        group.bench_function(format!("subtract_region(n={n})"), |b| {
            b.iter_batched(
                || {
                    (
                        build_region(n, 0x5EA1_0000_0000_0002),
                        build_region(n, 0x5EA1_0000_0000_0003),
                    )
                },
                |(mut a, b)| {
                    a.subtract(&b);
                    black_box(a);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("intersect_region(n={n})"), |b| {
            b.iter_batched(
                || {
                    (
                        build_region(n, 0x5EA1_0000_0000_0004),
                        build_region(n, 0x5EA1_0000_0000_0005),
                    )
                },
                |(mut a, b)| {
                    a.intersect(&b);
                    black_box(a);
                },
                BatchSize::LargeInput,
            );
        });

        let region = build_region(n, 0x5EA1_0000_0000_0006);
        let probes = random_rects(256, 1_000, 1, 0x5EA1_0000_0000_0007);
        group.bench_function(format!("contains_point_x256(n={n})"), |b| {
            b.iter(|| {
                let hits = probes
                    .iter()
                    .filter(|r| region.contains_point(IntPoint::new(r.x0, r.y0)))
                    .count();
                black_box(hits);
            });
        });

        let small = random_rects(256, 1_000, 40, 0x5EA1_0000_0000_0008)
            .into_iter()
            .map(Region::from_rect)
            .collect::<Vec<_>>();
        group.bench_function(format!("intersects_x256(n={n})"), |b| {
            b.iter(|| {
                let hits = small.iter().filter(|r| region.intersects(r)).count();
                black_box(hits);
            });
        });

        group.bench_function(format!("rects_and_translate(n={n})"), |b| {
            b.iter_batched(
                || region.clone(),
                |mut region| {
                    region.translate(IntVec2::new(17, -9));
                    black_box(region.rects());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_region);
criterion_main!(benches);
