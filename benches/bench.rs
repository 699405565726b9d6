use criterion::*;
use momu::SkipList;
use parking_lot::Mutex;
use rand::prelude::*;
use std::{
  collections::*,
  sync::{atomic::*, *},
  thread,
};

fn random_key(rng: &mut ThreadRng) -> Vec<u8> {
  let mut key = vec![0; 16];
  rng.fill_bytes(&mut key);
  key
}

fn skiplist_round(l: &SkipList<Vec<u8>, Vec<u8>>, case: &(Vec<u8>, bool), exp: &Vec<u8>) {
  if case.1 {
    if let Some(v) = l.get(&case.0) {
      assert_eq!(&v, exp);
    }
  } else {
    l.put(case.0.clone(), exp.clone());
  }
}

fn map_round(l: &Mutex<BTreeMap<Vec<u8>, Vec<u8>>>, case: &(Vec<u8>, bool), exp: &Vec<u8>) {
  let mut l = l.lock();
  if case.1 {
    if let Some(v) = l.get(&case.0) {
      assert_eq!(v, exp);
    }
  } else {
    l.insert(case.0.clone(), exp.clone());
  }
}

/// Runs `round` from the benchmark loop while a background thread hammers the
/// same structure, `frac` out of 10 operations being reads.
fn bench_read_write_frac<T, F>(b: &mut Bencher<'_>, frac: usize, target: Arc<T>, round: F)
where
  T: Send + Sync + 'static,
  F: Fn(&T, &(Vec<u8>, bool), &Vec<u8>) + Send + Copy + 'static,
{
  let value = b"00123".to_vec();
  let stop = Arc::new(AtomicBool::new(false));
  let s = stop.clone();
  let t = target.clone();
  let v = value.clone();
  let h = thread::spawn(move || {
    let mut rng = rand::rng();
    while !s.load(Ordering::SeqCst) {
      let case = (random_key(&mut rng), rng.random_range(0..11) < frac);
      round(&t, &case, &v);
    }
  });

  let mut rng = rand::rng();
  b.iter_batched_ref(
    || (random_key(&mut rng), rng.random_range(0..11) < frac),
    |case| round(&target, case, &value),
    BatchSize::SmallInput,
  );
  stop.store(true, Ordering::SeqCst);
  h.join().unwrap();
}

fn bench_read_write_skiplist(c: &mut Criterion) {
  let mut group = c.benchmark_group("skiplist_read_write");
  for i in 0..=10 {
    group.bench_with_input(BenchmarkId::from_parameter(i), &i, |b, frac| {
      let l = Arc::new(SkipList::new(16).unwrap());
      bench_read_write_frac(b, *frac, l, skiplist_round)
    });
  }
  group.finish();
}

fn bench_read_write_map(c: &mut Criterion) {
  let mut group = c.benchmark_group("btreemap_read_write");
  for i in 0..=10 {
    group.bench_with_input(BenchmarkId::from_parameter(i), &i, |b, frac| {
      let m = Arc::new(Mutex::new(BTreeMap::new()));
      bench_read_write_frac(b, *frac, m, map_round)
    });
  }
  group.finish();
}

fn bench_sequential_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("sequential_insert");
  for n in [1_000u64, 10_000, 100_000] {
    group.throughput(Throughput::Elements(n));
    group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
      b.iter(|| {
        let l = SkipList::with_seed(20, 7).unwrap();
        for i in 0..n {
          l.put(i, i);
        }
        black_box(l.len())
      })
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_read_write_skiplist,
  bench_read_write_map,
  bench_sequential_insert
);
criterion_main!(benches);
