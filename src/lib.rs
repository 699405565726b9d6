#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

use rand::RngCore;

mod error;
pub use error::Error;

mod options;
pub use options::Options;

mod list;
pub use list::SkipList;

/// The largest `max_level` an [`Options`] accepts.
///
/// The header keeps one link per level, so a list built with `max_level = n`
/// holds `n + 1` header links regardless of how many entries it stores.
pub const MAX_LEVEL: usize = 32;

/// The `max_level` used by [`Options::new`] and [`SkipList::default`].
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Draws the level of a new node by flipping a fair coin until it lands tails
/// or `max_level` is reached.
///
/// A single `u64` supplies all the flips: every trailing one bit is a head, so
/// `P(level = h) = 2^-(h + 1)` for `h < max_level`.
#[inline]
pub(crate) fn random_level<R: RngCore + ?Sized>(rng: &mut R, max_level: usize) -> usize {
  let flips = rng.next_u64();
  (flips.trailing_ones() as usize).min(max_level)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{rngs::StdRng, SeedableRng};

  #[test]
  fn test_random_level_capped() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10_000 {
      assert!(random_level(&mut rng, 3) <= 3);
    }
    for _ in 0..100 {
      assert_eq!(random_level(&mut rng, 0), 0);
    }
  }

  #[test]
  fn test_random_level_geometric() {
    const N: usize = 100_000;
    let mut rng = StdRng::seed_from_u64(42);
    let mut counts = [0usize; MAX_LEVEL + 1];
    for _ in 0..N {
      counts[random_level(&mut rng, MAX_LEVEL)] += 1;
    }

    // Roughly half of the draws stop at level 0, a quarter at level 1.
    let ground = counts[0] as f64 / N as f64;
    let first = counts[1] as f64 / N as f64;
    assert!((0.48..0.52).contains(&ground), "level 0 ratio {ground}");
    assert!((0.23..0.27).contains(&first), "level 1 ratio {first}");
  }

  #[test]
  fn test_random_level_reproducible() {
    let mut a = StdRng::seed_from_u64(99);
    let mut b = StdRng::seed_from_u64(99);
    for _ in 0..1000 {
      assert_eq!(
        random_level(&mut a, DEFAULT_MAX_LEVEL),
        random_level(&mut b, DEFAULT_MAX_LEVEL)
      );
    }
  }
}
