/// State of one node in the bookkeeping tree.
///
/// Stored as a single byte per node, so the discriminants are fixed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
  /// The whole block is unused and not split.
  Free = 0,
  /// The block is divided in two and at least one half is not free.
  Split = 1,
  /// Both halves are fully occupied. Cached so that searches can skip the subtree.
  Used = 2,
  /// This exact block was handed out and is still outstanding.
  Alloc = 3,
}

impl BlockState {
  /// Decodes a tree byte. Only bytes written by the allocator are ever decoded.
  pub const fn from_byte(byte: u8) -> Self {
    match byte {
      0 => Self::Free,
      1 => Self::Split,
      2 => Self::Used,
      _ => Self::Alloc,
    }
  }

  pub const fn as_byte(self) -> u8 {
    self as u8
  }

  /// No free capacity left anywhere in the block.
  pub const fn in_use(self) -> bool {
    matches!(self, Self::Used | Self::Alloc)
  }

  /// The block has children whose states are defined.
  pub const fn has_children(self) -> bool {
    matches!(self, Self::Split | Self::Used)
  }
}

pub const fn left_child(index: usize) -> usize {
  index * 2 + 1
}

pub const fn right_child(index: usize) -> usize {
  index * 2 + 2
}

/// Number of nodes in a complete binary tree with `levels` halvings below the root.
///
/// Saturates at `usize::MAX` once the count no longer fits.
pub const fn node_count(levels: usize) -> usize {
  if levels >= usize::BITS as usize - 1 {
    return usize::MAX;
  }

  (1 << (levels + 1)) - 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_byte_encoding() {
    for state in [BlockState::Free, BlockState::Split, BlockState::Used, BlockState::Alloc] {
      assert_eq!(state, BlockState::from_byte(state.as_byte()));
    }

    assert_eq!(0, BlockState::Free.as_byte());
  }

  #[test]
  fn test_in_use() {
    assert!(!BlockState::Free.in_use());
    assert!(!BlockState::Split.in_use());
    assert!(BlockState::Used.in_use());
    assert!(BlockState::Alloc.in_use());
  }

  #[test]
  fn test_tree_indexing() {
    assert_eq!((1, 2), (left_child(0), right_child(0)));
    assert_eq!((5, 6), (left_child(2), right_child(2)));

    assert_eq!(1, node_count(0));
    assert_eq!(63, node_count(5));
  }

  #[test]
  fn test_node_count_saturates() {
    let bits = usize::BITS as usize;

    assert_eq!(usize::MAX >> 1, node_count(bits - 2));
    assert_eq!(usize::MAX, node_count(bits - 1));
    assert_eq!(usize::MAX, node_count(bits));
    assert_eq!(usize::MAX, node_count(usize::MAX));
  }
}
