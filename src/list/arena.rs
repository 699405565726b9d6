use core::{borrow::Borrow, cmp, mem};
use std::collections::TryReserveError;

use crate::MAX_LEVEL;

/// Stable index of a node inside the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NodeId(usize);

/// Predecessor slots gathered by a descending search, one per level.
/// `None` stands for the header.
type Predecessors = [Option<NodeId>; MAX_LEVEL + 1];

#[derive(Debug)]
struct Node<K, V> {
  key: K,
  value: V,
  /// Forward links for levels `0..=level`.
  tower: Vec<Option<NodeId>>,
}

impl<K, V> Node<K, V> {
  #[inline]
  fn level(&self) -> usize {
    self.tower.len() - 1
  }
}

#[derive(Debug)]
enum Slot<K, V> {
  Occupied(Node<K, V>),
  /// A freed slot, pointing at the next free one.
  Vacant(Option<NodeId>),
}

/// Node storage of a skiplist.
///
/// Every node lives in `slots` and is only ever referred to by its [`NodeId`],
/// so the arena is the single owner of all entries. Links at every level,
/// the header's included, are plain indices. Removed nodes leave a vacant slot
/// behind which is threaded onto an intrusive free list and reused by the next
/// insertion.
#[derive(Debug)]
pub(super) struct Arena<K, V> {
  /// Header links, one per level in `0..=max_level`.
  head: Vec<Option<NodeId>>,
  slots: Vec<Slot<K, V>>,
  free: Option<NodeId>,
  len: usize,
  /// Highest level occupied by a live node, `0` when empty.
  height: usize,
  /// Makes the next node allocation fail.
  #[cfg(test)]
  pub(super) fail_next_alloc: bool,
}

impl<K, V> Arena<K, V> {
  pub(super) fn new(max_level: usize) -> Self {
    debug_assert!((1..=MAX_LEVEL).contains(&max_level));
    Self {
      head: vec![None; max_level + 1],
      slots: Vec::new(),
      free: None,
      len: 0,
      height: 0,
      #[cfg(test)]
      fail_next_alloc: false,
    }
  }

  #[inline]
  pub(super) fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub(super) fn height(&self) -> usize {
    self.height
  }

  #[inline]
  pub(super) fn max_level(&self) -> usize {
    self.head.len() - 1
  }

  /// Returns the arena to its freshly constructed state and hands back the
  /// detached nodes, so the caller decides where they are dropped.
  ///
  /// The arena is already consistent when this returns, even if dropping the
  /// nodes later panics.
  pub(super) fn clear(&mut self) -> impl Sized {
    self.head.fill(None);
    self.free = None;
    self.len = 0;
    self.height = 0;
    // Dropping the slot vector walks it in place, no matter how long the chain is.
    mem::take(&mut self.slots)
  }

  /// Iterates the entries in key order by walking level 0.
  pub(super) fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
    let mut cursor = self.head[0];
    core::iter::from_fn(move || {
      let id = cursor?;
      let node = self.node(id);
      cursor = node.tower[0];
      Some((&node.key, &node.value))
    })
  }

  #[inline]
  fn node(&self, id: NodeId) -> &Node<K, V> {
    match &self.slots[id.0] {
      Slot::Occupied(node) => node,
      Slot::Vacant(_) => unreachable!("skiplist link points at a freed node {}", id.0),
    }
  }

  #[inline]
  fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
    match &mut self.slots[id.0] {
      Slot::Occupied(node) => node,
      Slot::Vacant(_) => unreachable!("skiplist link points at a freed node {}", id.0),
    }
  }

  /// The forward link of `prev` (the header when `None`) at `level`.
  #[inline]
  fn next(&self, prev: Option<NodeId>, level: usize) -> Option<NodeId> {
    match prev {
      None => self.head[level],
      Some(id) => self.node(id).tower[level],
    }
  }

  #[inline]
  fn link_mut(&mut self, prev: Option<NodeId>, level: usize) -> &mut Option<NodeId> {
    match prev {
      None => &mut self.head[level],
      Some(id) => &mut self.node_mut(id).tower[level],
    }
  }

  /// Moves right on `level` while the next key is strictly less than `key`.
  #[inline]
  fn advance<Q>(&self, mut cursor: Option<NodeId>, level: usize, key: &Q) -> Option<NodeId>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    while let Some(next) = self.next(cursor, level) {
      match Borrow::<Q>::borrow(&self.node(next).key).cmp(key) {
        cmp::Ordering::Less => cursor = Some(next),
        _ => break,
      }
    }
    cursor
  }

  /// Returns the level 0 successor of `prev` when its key equals `key`.
  #[inline]
  fn successor_eq<Q>(&self, prev: Option<NodeId>, key: &Q) -> Option<NodeId>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self
      .next(prev, 0)
      .filter(|&id| Borrow::<Q>::borrow(&self.node(id).key) == key)
  }

  fn find<Q>(&self, key: &Q) -> Option<NodeId>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    let mut cursor = None;
    for level in (0..=self.height).rev() {
      cursor = self.advance(cursor, level, key);
    }
    self.successor_eq(cursor, key)
  }

  /// Descends from `height` to level 0, recording the predecessor on each level.
  fn find_predecessors<Q>(&self, key: &Q, preds: &mut Predecessors) -> Option<NodeId>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    let mut cursor = None;
    for level in (0..=self.height).rev() {
      cursor = self.advance(cursor, level, key);
      preds[level] = cursor;
    }
    self.successor_eq(cursor, key)
  }

  pub(super) fn get<Q>(&self, key: &Q) -> Option<&V>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.find(key).map(|id| &self.node(id).value)
  }

  pub(super) fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    self.find(key).is_some()
  }

  /// Inserts `key` or overwrites its value, returning the old value.
  ///
  /// `level` is only called when a new node is needed; it receives the max
  /// level and returns the level of the new node. All memory is reserved
  /// before any link is touched, so on error the arena is unchanged.
  pub(super) fn insert(
    &mut self,
    key: K,
    value: V,
    level: impl FnOnce(usize) -> usize,
  ) -> Result<Option<V>, TryReserveError>
  where
    K: Ord,
  {
    let mut preds: Predecessors = [None; MAX_LEVEL + 1];
    if let Some(id) = self.find_predecessors(&key, &mut preds) {
      return Ok(Some(mem::replace(&mut self.node_mut(id).value, value)));
    }

    let level = level(self.max_level()).min(self.max_level());
    #[cfg(test)]
    let () = self.injected_failure()?;
    let mut tower = Vec::new();
    tower.try_reserve_exact(level + 1)?;
    tower.resize(level + 1, None);
    if self.free.is_none() {
      self.slots.try_reserve(1)?;
    }

    if level > self.height {
      // Levels above the old height start at the header.
      for pred in &mut preds[self.height + 1..=level] {
        *pred = None;
      }
      #[cfg(feature = "tracing")]
      tracing::trace!(from = self.height, to = level, "skiplist height raised");
      self.height = level;
    }

    let node = Node { key, value, tower };
    let id = match self.free {
      Some(id) => {
        self.free = match mem::replace(&mut self.slots[id.0], Slot::Occupied(node)) {
          Slot::Vacant(next) => next,
          Slot::Occupied(_) => unreachable!("free list points at a live node {}", id.0),
        };
        id
      }
      None => {
        self.slots.push(Slot::Occupied(node));
        NodeId(self.slots.len() - 1)
      }
    };

    for (l, &pred) in preds.iter().enumerate().take(level + 1) {
      let link = self.link_mut(pred, l);
      let next = mem::replace(link, Some(id));
      self.node_mut(id).tower[l] = next;
    }

    self.len += 1;
    Ok(None)
  }

  /// Unlinks and frees the node holding `key`, returning its entry.
  pub(super) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
  where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
  {
    let mut preds: Predecessors = [None; MAX_LEVEL + 1];
    let target = self.find_predecessors(key, &mut preds)?;

    // Levels above the node's own never pointed at it.
    for l in 0..=self.node(target).level() {
      let next = self.node(target).tower[l];
      let link = self.link_mut(preds[l], l);
      debug_assert_eq!(*link, Some(target));
      if *link == Some(target) {
        *link = next;
      }
    }

    let node = match mem::replace(&mut self.slots[target.0], Slot::Vacant(self.free)) {
      Slot::Occupied(node) => node,
      Slot::Vacant(_) => unreachable!("skiplist link points at a freed node {}", target.0),
    };
    self.free = Some(target);
    self.len -= 1;

    while self.height > 0 && self.head[self.height].is_none() {
      self.height -= 1;
      #[cfg(feature = "tracing")]
      tracing::trace!(to = self.height, "skiplist height lowered");
    }

    Some((node.key, node.value))
  }
}

#[cfg(test)]
impl<K, V> Arena<K, V> {
  /// Fails once after `fail_next_alloc` is set, with a real reservation error.
  fn injected_failure(&mut self) -> Result<(), TryReserveError> {
    if mem::take(&mut self.fail_next_alloc) {
      return Vec::<u8>::new().try_reserve(usize::MAX);
    }
    Ok(())
  }
}

#[cfg(test)]
impl<K: Ord + core::fmt::Debug, V> Arena<K, V> {
  /// Panics unless every structural invariant of the skiplist holds.
  pub(super) fn check_invariants(&self) {
    let mut live = 0;
    let mut top = 0;
    for slot in &self.slots {
      if let Slot::Occupied(node) = slot {
        live += 1;
        top = top.max(node.level());
        assert!(node.level() <= self.max_level());
      }
    }
    assert_eq!(live, self.len, "live slots disagree with len");
    assert_eq!(top, self.height, "height is not the highest live level");

    for level in 0..=self.max_level() {
      let mut prev: Option<&K> = None;
      let mut count = 0;
      let mut cursor = self.head[level];
      while let Some(id) = cursor {
        let node = self.node(id);
        assert!(node.level() >= level, "node {:?} linked above its level", node.key);
        if let Some(prev) = prev {
          assert!(prev < &node.key, "level {level} out of order: {prev:?} >= {:?}", node.key);
        }
        prev = Some(&node.key);
        count += 1;
        cursor = node.tower[level];
      }

      let expected = self
        .slots
        .iter()
        .filter(|slot| matches!(slot, Slot::Occupied(node) if node.level() >= level))
        .count();
      assert_eq!(count, expected, "level {level} is missing nodes");
      if level > self.height {
        assert!(self.head[level].is_none());
      }
    }
  }

  /// Number of vacant slots waiting on the free list.
  pub(super) fn free_slots(&self) -> usize {
    let mut count = 0;
    let mut cursor = self.free;
    while let Some(id) = cursor {
      count += 1;
      cursor = match &self.slots[id.0] {
        Slot::Vacant(next) => *next,
        Slot::Occupied(_) => panic!("free list points at a live node"),
      };
    }
    count
  }
}
