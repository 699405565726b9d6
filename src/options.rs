use crate::{Error, SkipList, DEFAULT_MAX_LEVEL, MAX_LEVEL};

/// Options for constructing a [`SkipList`].
#[viewit::viewit(vis_all = "pub(super)", getters(skip), setters(skip))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
  max_level: usize,
  seed: Option<u64>,
}

impl Default for Options {
  #[inline]
  fn default() -> Options {
    Options::new()
  }
}

impl Options {
  /// Creates a new set of options with the default values.
  #[inline]
  pub const fn new() -> Self {
    Self {
      max_level: DEFAULT_MAX_LEVEL,
      seed: None,
    }
  }

  /// Set the maximum level a node can be promoted to.
  ///
  /// Every node lives on levels `0..=level`, where `level` is drawn at insertion
  /// time and never exceeds `max_level`. A list holding `N` entries populates
  /// about `log2(N)` levels, so the bound only matters once `N` approaches
  /// `2^max_level`.
  ///
  /// The value must be between `1` and [`MAX_LEVEL`] (inclusive), otherwise
  /// construction fails with [`Error::InvalidMaxLevel`].
  ///
  /// The default max level is [`DEFAULT_MAX_LEVEL`].
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::Options;
  ///
  /// let opts = Options::new().with_max_level(12);
  /// assert_eq!(opts.max_level(), 12);
  /// ```
  #[inline]
  pub const fn with_max_level(mut self, max_level: usize) -> Self {
    self.max_level = max_level;
    self
  }

  /// Set the seed of the per-instance random generator used to draw node levels.
  ///
  /// Two lists built from the same seed and fed the same sequence of
  /// operations end up with exactly the same shape. Without a seed, the
  /// generator is seeded from the operating system.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::Options;
  ///
  /// let opts = Options::new().with_seed(42);
  /// assert_eq!(opts.seed(), Some(42));
  /// ```
  #[inline]
  pub const fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  /// Returns the maximum level.
  #[inline]
  pub const fn max_level(&self) -> usize {
    self.max_level
  }

  /// Returns the seed, if one was set.
  #[inline]
  pub const fn seed(&self) -> Option<u64> {
    self.seed
  }

  /// Checks that the options describe a valid skiplist.
  #[inline]
  pub const fn validate(&self) -> Result<(), Error> {
    if self.max_level == 0 || self.max_level > MAX_LEVEL {
      return Err(Error::InvalidMaxLevel(self.max_level));
    }
    Ok(())
  }

  /// Builds a [`SkipList`] with these options.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::{Options, SkipList};
  ///
  /// let list: SkipList<u32, &str> = Options::new().with_seed(7).build().unwrap();
  /// list.put(1, "one");
  /// assert_eq!(list.get(&1), Some("one"));
  /// ```
  #[inline]
  pub fn build<K: Ord, V>(self) -> Result<SkipList<K, V>, Error> {
    SkipList::with_options(self)
  }
}
