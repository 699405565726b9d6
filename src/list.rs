use core::borrow::Borrow;
use std::collections::TryReserveError;

use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};

use crate::{random_level, Error, Options};

mod arena;
use arena::Arena;


/// State guarded by the skiplist's lock.
struct Inner<K, V> {
  arena: Arena<K, V>,
  rng: StdRng,
}

#[cold]
#[inline(never)]
fn alloc_failed(e: TryReserveError) -> ! {
  panic!("skiplist failed to allocate a node: {e}")
}

impl<K: Ord, V> Inner<K, V> {
  #[inline]
  fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TryReserveError> {
    let Self { arena, rng } = self;
    arena.insert(key, value, |max_level| random_level(rng, max_level))
  }
}

/// An ordered map based on a skiplist, safe to share between threads.
///
/// Entries are kept sorted by key in an arena of nodes. Each node is linked on
/// a randomly drawn number of levels, which keeps lookups, insertions and
/// removals at `O(log n)` expected cost.
///
/// Every operation takes the list's own mutex for its whole duration, so a
/// `SkipList` can be shared through an [`Arc`](std::sync::Arc) without any
/// external locking. Reads and writes are serialized alike. Two lists never
/// share a lock or a random generator.
///
/// ## Example
///
/// ```rust
/// use momu::SkipList;
///
/// let list = SkipList::with_seed(16, 42).unwrap();
/// list.put(3, "c");
/// list.put(1, "a");
/// list.put(2, "b");
///
/// assert_eq!(list.get(&2), Some("b"));
/// assert!(list.remove(&1));
/// assert!(!list.contains(&1));
/// assert_eq!(list.len(), 2);
/// ```
pub struct SkipList<K, V> {
  inner: Mutex<Inner<K, V>>,
  max_level: usize,
}

impl<K: Ord, V> Default for SkipList<K, V> {
  #[inline]
  fn default() -> Self {
    Self::construct(Options::new())
  }
}

impl<K: Ord, V> SkipList<K, V> {
  /// Creates an empty skiplist whose nodes are promoted to at most `max_level`,
  /// seeding its level generator from the operating system.
  ///
  /// Returns [`Error::InvalidMaxLevel`] if `max_level` is `0` or larger than
  /// [`MAX_LEVEL`](crate::MAX_LEVEL).
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::{Error, SkipList};
  ///
  /// let list = SkipList::<u64, u64>::new(12).unwrap();
  /// assert!(list.is_empty());
  ///
  /// assert!(matches!(SkipList::<u64, u64>::new(0), Err(Error::InvalidMaxLevel(0))));
  /// ```
  #[inline]
  pub fn new(max_level: usize) -> Result<Self, Error> {
    Self::with_options(Options::new().with_max_level(max_level))
  }

  /// Creates an empty skiplist whose level generator is seeded with `seed`.
  ///
  /// Lists built from the same seed and fed the same operations have the same
  /// shape, which makes level assignment reproducible in tests.
  #[inline]
  pub fn with_seed(max_level: usize, seed: u64) -> Result<Self, Error> {
    Self::with_options(Options::new().with_max_level(max_level).with_seed(seed))
  }

  /// Creates an empty skiplist from [`Options`].
  pub fn with_options(opts: Options) -> Result<Self, Error> {
    opts.validate()?;
    Ok(Self::construct(opts))
  }

  fn construct(opts: Options) -> Self {
    let rng = match opts.seed() {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
      max_level = opts.max_level(),
      seeded = opts.seed().is_some(),
      "skiplist created"
    );

    Self {
      inner: Mutex::new(Inner {
        arena: Arena::new(opts.max_level()),
        rng,
      }),
      max_level: opts.max_level(),
    }
  }

  /// Inserts `key` with `value`, or overwrites the value if `key` is already present.
  ///
  /// An overwrite keeps the node where it is; no duplicate entry is ever created.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let list = SkipList::new(8).unwrap();
  /// list.put(5, "x");
  /// list.put(5, "y");
  /// assert_eq!(list.get(&5), Some("y"));
  /// assert_eq!(list.len(), 1);
  /// ```
  #[inline]
  pub fn put(&self, key: K, value: V) {
    self.insert(key, value);
  }

  /// Inserts `key` with `value`, returning the value it replaced, if any.
  ///
  /// # Panics
  ///
  /// Panics if the memory for a new node cannot be reserved. The lock is
  /// released and the list is left unchanged. Use
  /// [`try_put`](SkipList::try_put) to get the error back instead.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let list = SkipList::new(8).unwrap();
  /// assert_eq!(list.insert("a", 1), None);
  /// assert_eq!(list.insert("a", 2), Some(1));
  /// ```
  pub fn insert(&self, key: K, value: V) -> Option<V> {
    let res = self.inner.lock().insert(key, value);
    match res {
      Ok(old) => old,
      Err(e) => alloc_failed(e),
    }
  }

  /// Like [`put`](SkipList::put), but reports allocation failure instead of panicking.
  ///
  /// If the memory for the new node cannot be reserved, [`Error::Alloc`] is
  /// returned and the list is left exactly as it was.
  pub fn try_put(&self, key: K, value: V) -> Result<(), Error> {
    // The replaced value, if any, drops after the guard.
    let res = self.inner.lock().insert(key, value);
    match res {
      Ok(_) => Ok(()),
      Err(e) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(err = %e, "failed to allocate a skiplist node");
        Err(Error::Alloc(e))
      }
    }
  }

  /// Returns a clone of the value stored for `key`.
  ///
  /// The key may be any borrowed form of the list's key type.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let list = SkipList::new(8).unwrap();
  /// list.put("hello".to_string(), 1);
  /// assert_eq!(list.get("hello"), Some(1));
  /// assert_eq!(list.get("world"), None);
  /// ```
  #[inline]
  pub fn get<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
    V: Clone,
  {
    self.inner.lock().arena.get(key).cloned()
  }

  /// Calls `f` with a reference to the value stored for `key`, while holding the lock.
  ///
  /// The lock is not reentrant: `f` must not call back into the same list,
  /// or it deadlocks. Other lists may be used freely.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let list = SkipList::new(8).unwrap();
  /// list.put(1, vec![1, 2, 3]);
  /// assert_eq!(list.get_with(&1, |v| v.len()), Some(3));
  /// ```
  #[inline]
  pub fn get_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.inner.lock().arena.get(key).map(f)
  }

  /// Returns `true` if the list holds `key`.
  #[inline]
  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.inner.lock().arena.contains(key)
  }

  /// Removes `key`, returning `true` if it was present.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let list = SkipList::new(8).unwrap();
  /// list.put(1, "a");
  /// assert!(list.remove(&1));
  /// assert!(!list.remove(&1));
  /// ```
  #[inline]
  pub fn remove<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.remove_entry(key).is_some()
  }

  /// Removes `key`, returning the stored key and value if it was present.
  pub fn remove_entry<Q>(&self, key: &Q) -> Option<(K, V)>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.inner.lock().arena.remove(key)
  }

  /// Removes every entry, returning the list to its freshly created state.
  ///
  /// The random generator keeps its state.
  ///
  /// The entries are dropped after the lock is released. If a value panics
  /// while being dropped, the list is already empty and stays usable.
  pub fn clear(&self) {
    let detached = self.inner.lock().arena.clear();

    #[cfg(feature = "tracing")]
    tracing::debug!("skiplist cleared");
    drop(detached);
  }
}

impl<K, V> SkipList<K, V> {
  /// Returns the number of entries in the list.
  #[inline]
  pub fn len(&self) -> usize {
    self.inner.lock().arena.len()
  }

  /// Returns `true` if the list holds no entries.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Alias of [`len`](SkipList::len).
  #[inline]
  pub fn size(&self) -> usize {
    self.len()
  }

  /// Alias of [`is_empty`](SkipList::is_empty).
  #[inline]
  pub fn empty(&self) -> bool {
    self.is_empty()
  }

  /// Returns the highest level occupied by any entry, `0` when the list is empty.
  #[inline]
  pub fn height(&self) -> usize {
    self.inner.lock().arena.height()
  }

  /// Returns the maximum level the list was created with.
  #[inline]
  pub const fn max_level(&self) -> usize {
    self.max_level
  }
}

impl<K: core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for SkipList<K, V> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let inner = self.inner.lock();
    f.debug_map().entries(inner.arena.iter()).finish()
  }
}

impl<K: Ord, V> Extend<(K, V)> for SkipList<K, V> {
  fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
    let inner = self.inner.get_mut();
    for (key, value) in iter {
      if let Err(e) = inner.insert(key, value) {
        alloc_failed(e);
      }
    }
  }
}

impl<K: Ord, V> FromIterator<(K, V)> for SkipList<K, V> {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut list = Self::default();
    list.extend(iter);
    list
  }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for SkipList<K, V> {
  /// ```rust
  /// use momu::SkipList;
  ///
  /// let distances = SkipList::from([("Mercury", 0.4), ("Venus", 0.7), ("Earth", 1.0)]);
  /// assert_eq!(distances.get("Venus"), Some(0.7));
  /// ```
  fn from(entries: [(K, V); N]) -> Self {
    Self::from_iter(entries)
  }
}
