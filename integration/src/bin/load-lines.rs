use integration::load_lines;
use momu::SkipList;

fn main() {
  let list = SkipList::new(16).unwrap();
  let stats = load_lines(std::io::stdin().lock(), &list).unwrap();
  println!(
    "loaded {} lines, skipped {}, {} distinct keys, height {}",
    stats.loaded,
    stats.skipped,
    list.len(),
    list.height()
  );
}
