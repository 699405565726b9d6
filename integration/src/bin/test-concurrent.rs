use integration::{key, new_value};
use momu::SkipList;
use std::sync::Arc;

fn main() {
  const N: usize = 1000;
  let l = Arc::new(SkipList::with_seed(16, 0).unwrap());
  let wg = Arc::new(());
  for i in 0..N {
    let w = wg.clone();
    let l = l.clone();
    std::thread::spawn(move || {
      l.put(key(i), new_value(i));
      drop(w);
    });
  }
  while Arc::strong_count(&wg) > 1 {}
  assert_eq!(N, l.len());

  for i in 0..N {
    let w = wg.clone();
    let l = l.clone();
    std::thread::spawn(move || {
      assert_eq!(l.get(key(i).as_str()), Some(new_value(i)), "broken: {i}");
      assert!(l.remove(key(i).as_str()));
      drop(w);
    });
  }
  while Arc::strong_count(&wg) > 1 {}
  assert!(l.is_empty());
  assert_eq!(l.height(), 0);
}
