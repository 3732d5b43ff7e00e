//! Transform and product benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench ntt
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ntt_red::ntt::{shift_array, Direction, Variant, INPUT_BOUND};
use ntt_red::params::Q;
use ntt_red::product::ProductVariant;
use ntt_red::rounds::{ntt_ct_bounds, ntt_gs_bounds};
use ntt_red::tables::NttTables;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SIZES: [usize; 3] = [256, 512, 1024];

fn random_poly(rng: &mut ChaCha8Rng, n: usize) -> Vec<i32> {
    (0..n).map(|_| rng.gen_range(0..Q)).collect()
}

// ============================================================================
// Forward transforms
// ============================================================================

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for n in SIZES {
        let tables = NttTables::standard(n).unwrap();
        let mut input = random_poly(&mut rng, n);
        shift_array(&mut input);
        group.throughput(Throughput::Elements(n as u64));

        for variant in Variant::ALL {
            let p = variant.table(tables, Direction::Forward);
            group.bench_with_input(BenchmarkId::new(variant.name(), n), &n, |b, _| {
                b.iter(|| {
                    let mut a = input.clone();
                    variant.apply(&mut a, p);
                    a
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Products
// ============================================================================

fn bench_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("product");
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for n in SIZES {
        let tables = NttTables::standard(n).unwrap();
        let x = random_poly(&mut rng, n);
        let y = random_poly(&mut rng, n);

        for variant in ProductVariant::ALL {
            group.bench_with_input(BenchmarkId::new(variant.to_string(), n), &n, |bencher, &n| {
                bencher.iter(|| {
                    let (mut a, mut b) = (x.clone(), y.clone());
                    let mut c = vec![0; n];
                    variant.apply(&mut c, &mut a, &mut b, tables);
                    c
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Bound propagation
// ============================================================================

fn bench_round_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_bounds");
    group.sample_size(10);

    for n in SIZES {
        let tables = NttTables::standard(n).unwrap();
        group.bench_with_input(BenchmarkId::new("ct", n), &n, |b, _| {
            b.iter(|| ntt_ct_bounds(INPUT_BOUND as i64, tables.omega_powers_rev()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("gs", n), &n, |b, _| {
            b.iter(|| ntt_gs_bounds(INPUT_BOUND as i64, tables.omega_powers()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transforms, bench_products, bench_round_bounds);
criterion_main!(benches);
