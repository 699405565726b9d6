use std::collections::TryReserveError;

use crate::MAX_LEVEL;

/// Error type for the [`SkipList`](crate::SkipList).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Indicates that the requested maximum level is `0` or larger than [`MAX_LEVEL`].
  InvalidMaxLevel(usize),

  /// Indicates that the memory for a new node could not be reserved.
  /// The skiplist is left exactly as it was before the call.
  Alloc(TryReserveError),
}

impl core::fmt::Display for Error {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::InvalidMaxLevel(level) => write!(
        f,
        "max level {level} is out of range, it must be between 1 and {MAX_LEVEL}"
      ),
      Self::Alloc(e) => write!(f, "failed to allocate a new node: {e}"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::InvalidMaxLevel(_) => None,
      Self::Alloc(e) => Some(e),
    }
  }
}

impl From<TryReserveError> for Error {
  #[inline]
  fn from(e: TryReserveError) -> Self {
    Self::Alloc(e)
  }
}
