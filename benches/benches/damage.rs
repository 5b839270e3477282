// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_damage::{Damage, DamageConfig, DamageMode};
use understory_region::{IntRect, IntSize};

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

const SURFACE: IntSize = IntSize::new(1920, 1080);

fn random_rects(n: usize, seed: u64) -> Vec<IntRect> {
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| {
            IntRect::from_xywh(
                rng.gen_range_i32(SURFACE.width),
                rng.gen_range_i32(SURFACE.height),
                1 + rng.gen_range_i32(64),
                1 + rng.gen_range_i32(64),
            )
        })
        .collect()
}

fn bench_damage(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_damage");
    group.sample_size(50);

    let configs = [
        ("default_grid", DamageConfig::default()),
        ("budget_16", DamageConfig::default().with_max_rectangles(16)),
        (
            "bounding_box",
            DamageConfig::default().with_mode(DamageMode::BoundingBox),
        ),
    ];

    for &n in &[32_usize, 1_024, 16_384] {
        let rects = random_rects(n, 0xDA3A_0000_0000_0001);

        for (name, config) in configs {
            group.bench_function(format!("add({name},n={n})"), |b| {
                b.iter(|| {
                    let mut damage = Damage::with_config(SURFACE, config);
                    for rect in &rects {
                        damage.add(*rect);
                    }
                    black_box(damage.size());
                });
            });

            group.bench_function(format!("add_rects({name},n={n})"), |b| {
                b.iter(|| {
                    let mut damage = Damage::with_config(SURFACE, config);
                    damage.add_rects(&rects);
                    black_box(damage.size());
                });
            });
        }

        group.bench_function(format!("add_damage_unified(n={n})"), |b| {
            b.iter_batched(
                || {
                    let config = DamageConfig::default().with_max_rectangles(16);
                    let mut target = Damage::with_config(SURFACE, config);
                    let mut other = Damage::with_config(SURFACE, config);
                    target.add_rects(&rects);
                    other.add_rects(&random_rects(n, 0xDA3A_0000_0000_0002));
                    (target, other)
                },
                |(mut target, other)| {
                    target.add_damage(&other);
                    black_box(target);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("to_region(n={n})"), |b| {
            let mut damage = Damage::new(SURFACE);
            damage.add_rects(&rects);
            b.iter(|| black_box(damage.to_region()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_damage);
criterion_main!(benches);
