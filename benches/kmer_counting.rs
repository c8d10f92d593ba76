use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use kmerc::alphabet;
use kmerc::kmer::KmerFactory;
use kmerc::mathutil;
use kmerc::rolling_hash::RollingHasherDual;
use kmerc::table::flag::FlagLockTable;
use kmerc::table::KmerTable;

/// A pseudo-random DNA sequence of length `len`, built from a simple linear
/// congruential generator so the benchmark has no external `rand` dependency
/// and is reproducible run to run.
fn generate_dna(len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        out.push(BASES[((seed >> 33) & 3) as usize]);
    }
    out
}

fn default_modulus() -> u64 {
    (1u64 << 61) - 1
}

fn bench_rolling_hash(c: &mut Criterion) {
    let seq = generate_dna(1_000_000);
    let k = 31usize;

    let mut group = c.benchmark_group("rolling_hash");
    group.throughput(Throughput::Bytes(seq.len() as u64));

    group.bench_with_input(BenchmarkId::new("dual_update", seq.len()), &seq, |b, seq| {
        b.iter(|| {
            let mut hasher = RollingHasherDual::new(default_modulus(), k);
            let mut window: std::collections::VecDeque<u8> = std::collections::VecDeque::with_capacity(k);
            for &byte in seq {
                let code = alphabet::encode(byte);
                if window.len() < k {
                    hasher.update_rolling_hash_in(code);
                } else {
                    let out = window.pop_front().unwrap();
                    hasher.update_rolling_hash_in_and_out(code, out);
                }
                window.push_back(code);
                let _ = hasher.hash_forward();
            }
        })
    });

    group.finish();
}

fn bench_table_insert(c: &mut Criterion) {
    let seq = generate_dna(200_000);
    let k = 21usize;

    let mut group = c.benchmark_group("table_insert");
    group.throughput(Throughput::Bytes(seq.len() as u64));

    group.bench_with_input(BenchmarkId::new("flag_lock_table", seq.len()), &seq, |b, seq| {
        b.iter(|| {
            let table = FlagLockTable::new(mathutil::next_prime(1 << 18));
            let mut factory = KmerFactory::new(k);
            let mut hasher = RollingHasherDual::new(default_modulus(), k);

            for &byte in seq {
                let code = alphabet::encode(byte);
                if code >= alphabet::BREAK {
                    factory.reset();
                    hasher.reset();
                    continue;
                }

                factory.push_character(code);

                if factory.previous_kmer_exists() {
                    hasher.update_rolling_hash_in_and_out(code, factory.pushed_off_character_forward());
                } else {
                    hasher.update_rolling_hash_in(code);
                }

                if !factory.is_full() {
                    continue;
                }

                let canonical = factory.forward_is_canonical();
                let hash = if canonical {
                    hasher.hash_forward()
                } else {
                    hasher.hash_backward()
                };

                table
                    .process_kmer(
                        factory.canonical_blocks(),
                        factory.characters_stored(),
                        hash,
                        canonical,
                        None,
                    )
                    .expect("table insert");
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_rolling_hash, bench_table_insert);
criterion_main!(benches);
