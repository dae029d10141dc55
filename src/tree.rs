//! Read-only diagnostic export of the bookkeeping tree.
//!
//! Only nodes reachable from the root are reported: the children of a `Free`
//! or `Alloc` node hold stale bytes and are never visited.

use crate::block::{BlockState, left_child, right_child};

/// One reachable node of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
  pub index: usize,
  /// Distance from the root; the root is at depth 0.
  pub depth: usize,
  /// Byte offset of the block inside the arena.
  pub offset: usize,
  pub size: usize,
  pub state: BlockState,
}

/// Borrowed view over an allocator's tree. Querying it never changes allocator state.
#[derive(Debug, Clone, Copy)]
pub struct TreeView<'a> {
  bytes: &'a [u8],
  arena_size: usize,
  levels: usize,
}

impl<'a> TreeView<'a> {
  pub(crate) fn new(
    bytes: &'a [u8],
    arena_size: usize,
    levels: usize,
  ) -> Self {
    Self { bytes, arena_size, levels }
  }

  pub fn levels(&self) -> usize {
    self.levels
  }

  pub fn arena_size(&self) -> usize {
    self.arena_size
  }

  /// The raw state array, one byte per node in index order.
  ///
  /// Bytes of unreachable nodes are stale; use [`state`](Self::state) to tell them apart.
  pub fn states(&self) -> &'a [u8] {
    self.bytes
  }

  pub fn root_state(&self) -> BlockState {
    BlockState::from_byte(self.bytes[0])
  }

  /// State of node `index`, or `None` if the node is not currently reachable.
  pub fn state(
    &self,
    index: usize,
  ) -> Option<BlockState> {
    if index >= self.bytes.len() {
      return None;
    }

    let mut ancestor = index;
    while ancestor > 0 {
      ancestor = (ancestor - 1) / 2;

      if !BlockState::from_byte(self.bytes[ancestor]).has_children() {
        return None;
      }
    }

    Some(BlockState::from_byte(self.bytes[index]))
  }

  /// Reachable nodes in pre-order, left subtree before right.
  pub fn nodes(&self) -> Nodes<'a> {
    Nodes {
      bytes: self.bytes,
      stack: vec![(0, 0, 0)],
      arena_size: self.arena_size,
    }
  }

  /// Outstanding blocks in ascending address order.
  pub fn allocations(self) -> impl Iterator<Item = NodeInfo> + 'a {
    self.nodes().filter(|node| node.state == BlockState::Alloc)
  }
}

/// Iterator returned by [`TreeView::nodes`].
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
  bytes: &'a [u8],
  /// Pending `(index, depth, offset)` triples.
  stack: Vec<(usize, usize, usize)>,
  arena_size: usize,
}

impl Iterator for Nodes<'_> {
  type Item = NodeInfo;

  fn next(&mut self) -> Option<Self::Item> {
    let (index, depth, offset) = self.stack.pop()?;
    let state = BlockState::from_byte(self.bytes[index]);
    let size = self.arena_size >> depth;

    if state.has_children() {
      let half = size >> 1;
      self.stack.push((right_child(index), depth + 1, offset + half));
      self.stack.push((left_child(index), depth + 1, offset));
    }

    Some(NodeInfo { index, depth, offset, size, state })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // Root split, left half allocated, right half split into a free and an allocated quarter.
  const BYTES: [u8; 7] = [1, 3, 1, 0xFF, 0xFF, 0, 3];

  #[test]
  fn test_nodes_skip_unreachable() {
    let view = TreeView::new(&BYTES, 64, 2);

    let nodes: Vec<_> = view.nodes().map(|node| (node.index, node.offset, node.size, node.state)).collect();

    assert_eq!(
      vec![
        (0, 0, 64, BlockState::Split),
        (1, 0, 32, BlockState::Alloc),
        (2, 32, 32, BlockState::Split),
        (5, 32, 16, BlockState::Free),
        (6, 48, 16, BlockState::Alloc),
      ],
      nodes
    );
  }

  #[test]
  fn test_state_lookup() {
    let view = TreeView::new(&BYTES, 64, 2);

    assert_eq!(BlockState::Split, view.root_state());
    assert_eq!(Some(BlockState::Alloc), view.state(1));
    assert_eq!(None, view.state(3));
    assert_eq!(Some(BlockState::Free), view.state(5));
    assert_eq!(None, view.state(7));
  }

  #[test]
  fn test_raw_states() {
    let view = TreeView::new(&BYTES, 64, 2);

    assert_eq!(&BYTES[..], view.states());
    assert_eq!(7, view.states().len());
    assert_eq!(BlockState::Alloc.as_byte(), view.states()[6]);
  }

  #[test]
  fn test_allocations() {
    let view = TreeView::new(&BYTES, 64, 2);

    let blocks: Vec<_> = view.allocations().map(|node| (node.offset, node.size)).collect();
    assert_eq!(vec![(0, 32), (48, 16)], blocks);
  }
}
