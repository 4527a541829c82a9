use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shmseg_core::SharedMemory;

const SEGMENT_SIZE: usize = 64 * 1024;

fn bench_access(c: &mut Criterion) {
    let name = format!("/shmseg_bench_{}", std::process::id());
    let mut shm = match SharedMemory::create_with_size(&name, SEGMENT_SIZE) {
        Ok(shm) => shm,
        Err(e) => {
            eprintln!("skipping access benchmarks: {}", e);
            return;
        }
    };
    let elements = SEGMENT_SIZE / std::mem::size_of::<u64>();

    c.bench_function("at_mut_u64_sweep", |b| {
        b.iter(|| {
            for i in 0..elements {
                if let Ok(slot) = shm.at_mut::<u64>(i) {
                    *slot = black_box(i as u64);
                }
            }
        })
    });

    c.bench_function("at_u64_sweep", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..elements {
                sum = sum.wrapping_add(shm.at::<u64>(i).copied().unwrap_or(0));
            }
            black_box(sum)
        })
    });

    c.bench_function("get_unchecked_u64_sweep", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..elements {
                sum = sum.wrapping_add(unsafe { *shm.get_unchecked::<u64>(i) });
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_access);
criterion_main!(benches);
