//! Allocator construction parameters.

use crate::{
  align::next_pot,
  block::node_count,
  error::{BuddyError, Result},
};

/// Deepest tree the allocator accepts. Bounds both recursion depth and tree size.
pub const MAX_LEVELS: usize = 32;

/// [`MAX_LEVELS`], lowered on targets where the tree length would not fit a `usize`.
pub const fn max_levels() -> usize {
  let width_limit = usize::BITS as usize - 2;

  if MAX_LEVELS < width_limit { MAX_LEVELS } else { width_limit }
}

/// Size and depth of a buddy arena.
///
/// `arena_size` is rounded up to a power of two when the allocator is built;
/// `levels` is the number of times the arena may be halved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuddyConfig {
  pub arena_size: usize,
  pub levels: usize,
}

impl BuddyConfig {
  pub const DEFAULT_ARENA_SIZE: usize = 4096;
  pub const DEFAULT_LEVELS: usize = 6;

  pub const fn new(
    arena_size: usize,
    levels: usize,
  ) -> Self {
    Self { arena_size, levels }
  }

  /// The arena size actually managed, after power-of-two rounding.
  pub fn rounded_arena_size(&self) -> Result<usize> {
    next_pot(self.arena_size).ok_or(BuddyError::SizeOverflow {
      requested: self.arena_size,
    })
  }

  /// Arena size halved `levels` times; `0` when the arena cannot be halved that often.
  pub fn smallest_block(&self) -> Result<usize> {
    let arena_size = self.rounded_arena_size()?;

    Ok(
      u32::try_from(self.levels)
        .ok()
        .and_then(|shift| arena_size.checked_shr(shift))
        .unwrap_or(0),
    )
  }

  /// Number of state bytes in the bookkeeping tree.
  pub const fn tree_len(&self) -> usize {
    node_count(self.levels)
  }

  pub fn validate(&self) -> Result<()> {
    if self.levels > max_levels() {
      return Err(BuddyError::LevelsTooDeep {
        levels: self.levels,
        max: max_levels(),
      });
    }

    let arena_size = self.rounded_arena_size()?;

    if self.smallest_block()? == 0 {
      return Err(BuddyError::ArenaTooSmall {
        arena_size,
        levels: self.levels,
      });
    }

    Ok(())
  }
}

impl Default for BuddyConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_ARENA_SIZE, Self::DEFAULT_LEVELS)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_is_valid() {
    let config = BuddyConfig::default();

    assert_eq!(Ok(()), config.validate());
    assert_eq!(Ok(64), config.smallest_block());
    assert_eq!(127, config.tree_len());
  }

  #[test]
  fn test_rounding() {
    let config = BuddyConfig::new(100, 5);

    assert_eq!(Ok(128), config.rounded_arena_size());
    assert_eq!(Ok(4), config.smallest_block());
    assert_eq!(Ok(1), BuddyConfig::new(0, 0).rounded_arena_size());
  }

  #[test]
  fn test_validation_errors() {
    assert_eq!(
      Err(BuddyError::LevelsTooDeep { levels: 33, max: max_levels() }),
      BuddyConfig::new(1 << 20, 33).validate()
    );

    assert_eq!(
      Err(BuddyError::ArenaTooSmall { arena_size: 8, levels: 4 }),
      BuddyConfig::new(5, 4).validate()
    );

    assert_eq!(
      Err(BuddyError::SizeOverflow { requested: usize::MAX }),
      BuddyConfig::new(usize::MAX, 2).validate()
    );

    assert_eq!(Ok(()), BuddyConfig::new(8, 3).validate());
  }

  #[test]
  fn test_levels_near_pointer_width() {
    let bits = usize::BITS as usize;

    assert!(max_levels() <= MAX_LEVELS);
    assert!(max_levels() + 1 < bits);

    for levels in [max_levels() + 1, bits - 1, bits, usize::MAX] {
      let config = BuddyConfig::new(8, levels);

      assert_eq!(Err(BuddyError::LevelsTooDeep { levels, max: max_levels() }), config.validate());
      assert_eq!(Ok(0), config.smallest_block());
    }
  }

  #[test]
  fn test_deepest_accepted_tree_fits() {
    let config = BuddyConfig::new(1 << max_levels(), max_levels());

    assert_eq!(Ok(()), config.validate());
    assert_eq!(Ok(1), config.smallest_block());
    assert_eq!((1 << (max_levels() + 1)) - 1, config.tree_len());
  }
}
