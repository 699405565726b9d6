use momu::{Options, SkipList, MAX_LEVEL};

#[test]
#[cfg_attr(miri, ignore)]
fn height_concentrates_near_log2_n() {
  const N: u32 = 100_000;

  let l: SkipList<u32, ()> = Options::new()
    .with_max_level(MAX_LEVEL)
    .with_seed(0xdead_beef)
    .build()
    .unwrap();
  for i in 0..N {
    l.put(i, ());
  }
  assert_eq!(l.len(), N as usize);

  let expected = (N as f64).log2();
  let height = l.height() as f64;
  assert!(
    height >= expected - 4.0 && height <= expected + 8.0,
    "height {height} is far from log2(N) = {expected:.2}"
  );
}

#[test]
#[cfg_attr(miri, ignore)]
fn height_is_reproducible_with_seed() {
  let build = || {
    let l = SkipList::<u32, u32>::with_seed(20, 12345).unwrap();
    for i in (0..10_000).rev() {
      l.put(i, i);
    }
    for i in (0..10_000).step_by(3) {
      l.remove(&i);
    }
    l.height()
  };
  assert_eq!(build(), build());
}
