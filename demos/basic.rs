use momu::SkipList;
use std::sync::Arc;

pub fn key(i: usize) -> String {
  format!("{:05}", i)
}

pub fn new_value(i: usize) -> String {
  format!("{:05}", i)
}

fn main() {
  const N: usize = 1000;

  let l = Arc::new(SkipList::new(16).unwrap());

  let handles: Vec<_> = (0..N)
    .map(|i| {
      let l = l.clone();
      std::thread::spawn(move || l.put(key(i), new_value(i)))
    })
    .collect();
  for h in handles {
    h.join().unwrap();
  }

  for i in 0..N {
    let k = key(i);
    assert_eq!(l.get(k.as_str()), Some(new_value(i)), "broken: {i}");
  }

  for i in (0..N).step_by(2) {
    assert!(l.remove(key(i).as_str()));
  }
  println!("{} entries left, height {}", l.len(), l.height());
}
