use std::{ptr::{self, NonNull}, slice};

use log::{debug, trace, warn};

use crate::{
  align::next_pot,
  block::{BlockState, left_child, right_child},
  config::BuddyConfig,
  error::{Buffer, BuddyError, Result},
  provider::{LibcProvider, RawProvider},
  tree::TreeView,
};

/// Alignment requested for the bookkeeping tree.
const TREE_ALIGN: usize = 1;

/// Fixed-capacity buddy allocator over a single power-of-two arena.
///
/// Both the arena and the bookkeeping tree come from the provider `P` and are
/// handed back to it exactly once, when the allocator is dropped.
pub struct BuddyAllocator<P: RawProvider = LibcProvider> {
  memory: NonNull<u8>,
  tree: NonNull<u8>,
  tree_len: usize,
  arena_size: usize,
  smallest_block: usize,
  levels: usize,
  provider: P,
}

// The allocator owns both buffers exclusively; moving it to another thread
// moves that ownership along with it.
unsafe impl<P: RawProvider + Send> Send for BuddyAllocator<P> {}

impl BuddyAllocator<LibcProvider> {
  /// Builds an allocator for `arena_size` bytes (rounded up to a power of two)
  /// that can halve the arena `levels` times.
  pub fn new(
    arena_size: usize,
    levels: usize,
  ) -> Result<Self> {
    Self::with_config(BuddyConfig::new(arena_size, levels))
  }

  pub fn with_config(config: BuddyConfig) -> Result<Self> {
    Self::with_provider(config, LibcProvider)
  }
}

impl<P: RawProvider> BuddyAllocator<P> {
  pub fn with_provider(
    config: BuddyConfig,
    mut provider: P,
  ) -> Result<Self> {
    config.validate()?;

    let arena_size = config.rounded_arena_size()?;
    let tree_len = config.tree_len();

    let tree = provider
      .allocate_raw(tree_len, TREE_ALIGN)
      .ok_or(BuddyError::ProviderExhausted {
        buffer: Buffer::Tree,
        size: tree_len,
      })?;

    // Children are only read after their parent splits; zeroing keeps every
    // byte a valid `BlockState::Free` until then.
    unsafe { ptr::write_bytes(tree.as_ptr(), BlockState::Free.as_byte(), tree_len) };

    let Some(memory) = provider.allocate_raw(arena_size, arena_size) else {
      unsafe { provider.release_raw(tree, tree_len, TREE_ALIGN) };

      return Err(BuddyError::ProviderExhausted {
        buffer: Buffer::Arena,
        size: arena_size,
      });
    };

    debug!(
      "buddy arena ready: {} bytes at {:?}, {} levels, smallest block {} bytes",
      arena_size,
      memory,
      config.levels,
      arena_size >> config.levels
    );

    Ok(Self {
      memory,
      tree,
      tree_len,
      arena_size,
      smallest_block: arena_size >> config.levels,
      levels: config.levels,
      provider,
    })
  }

  pub fn arena_size(&self) -> usize {
    self.arena_size
  }

  pub fn levels(&self) -> usize {
    self.levels
  }

  pub fn smallest_block(&self) -> usize {
    self.smallest_block
  }

  pub fn arena_start(&self) -> NonNull<u8> {
    self.memory
  }

  /// Whether `ptr` points anywhere inside the arena.
  pub fn contains(
    &self,
    ptr: NonNull<u8>,
  ) -> bool {
    let start = self.memory.as_ptr() as usize;
    let addr = ptr.as_ptr() as usize;

    addr >= start && addr - start < self.arena_size
  }

  /// Size of the block `alloc(size)` would occupy, or `None` if no block is large enough.
  pub fn block_size_for(
    &self,
    size: usize,
  ) -> Option<usize> {
    let block_size = next_pot(size)?.max(self.smallest_block);

    (block_size <= self.arena_size).then_some(block_size)
  }

  /// Hands out a block of at least `size` bytes, aligned to its own size.
  ///
  /// Returns `None` when the arena is exhausted or too fragmented to serve the
  /// request; the allocator stays fully usable afterwards.
  pub fn alloc(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let Some(block_size) = self.block_size_for(size) else {
      trace!("alloc({}) exceeds the {} byte arena", size, self.arena_size);
      return None;
    };

    let Some(offset) = self.alloc_r(block_size, 0, self.arena_size, 0) else {
      trace!("alloc({}): no free {} byte block", size, block_size);
      return None;
    };

    trace!("alloc({}) -> {} byte block at offset {}", size, block_size, offset);

    debug_assert!(crate::is_aligned!(offset, block_size));

    Some(unsafe { self.memory.add(offset) })
  }

  /// Returns a block obtained from [`alloc`](Self::alloc).
  ///
  /// Pointers that are not currently allocated, including double frees, are
  /// ignored and leave the allocator untouched.
  pub fn free(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    self.try_free(ptr);
  }

  /// Like [`free`](Self::free), but reports whether a block was released.
  pub fn try_free(
    &mut self,
    ptr: NonNull<u8>,
  ) -> bool {
    if !self.contains(ptr) {
      warn!("free({:?}): pointer outside the arena", ptr);
      return false;
    }

    let target = ptr.as_ptr() as usize - self.memory.as_ptr() as usize;
    let freed = self.free_r(target, 0, self.arena_size, 0);

    if freed {
      trace!("free: released block at offset {}", target);
    } else {
      warn!("free({:?}): no outstanding block at offset {}", ptr, target);
    }

    freed
  }

  /// Total bytes of all outstanding blocks.
  pub fn allocated_bytes(&self) -> usize {
    self.tree().allocations().map(|node| node.size).sum()
  }

  /// No block is outstanding and the root is unsplit.
  pub fn is_empty(&self) -> bool {
    self.state(0) == BlockState::Free
  }

  /// Read-only view of the bookkeeping tree.
  pub fn tree(&self) -> TreeView<'_> {
    TreeView::new(self.tree_bytes(), self.arena_size, self.levels)
  }

  fn tree_bytes(&self) -> &[u8] {
    unsafe { slice::from_raw_parts(self.tree.as_ptr(), self.tree_len) }
  }

  fn tree_bytes_mut(&mut self) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(self.tree.as_ptr(), self.tree_len) }
  }

  fn state(
    &self,
    index: usize,
  ) -> BlockState {
    BlockState::from_byte(self.tree_bytes()[index])
  }

  fn set_state(
    &mut self,
    index: usize,
    state: BlockState,
  ) {
    self.tree_bytes_mut()[index] = state.as_byte();
  }

  fn alloc_r(
    &mut self,
    target: usize,
    index: usize,
    block_size: usize,
    offset: usize,
  ) -> Option<usize> {
    if block_size == target {
      if self.state(index) == BlockState::Free {
        self.set_state(index, BlockState::Alloc);
        return Some(offset);
      }
      return None;
    }

    let left = left_child(index);
    let right = right_child(index);

    if self.state(index) == BlockState::Free {
      self.set_state(index, BlockState::Split);
      self.set_state(left, BlockState::Free);
      self.set_state(right, BlockState::Free);
    }

    if self.state(index) != BlockState::Split {
      return None;
    }

    let half = block_size >> 1;

    // Left half first: lower addresses are always preferred.
    let found = match self.alloc_r(target, left, half, offset) {
      Some(found) => Some(found),
      None => self.alloc_r(target, right, half, offset + half),
    };

    if self.state(left).in_use() && self.state(right).in_use() {
      self.set_state(index, BlockState::Used);
    }

    found
  }

  fn free_r(
    &mut self,
    target: usize,
    index: usize,
    block_size: usize,
    offset: usize,
  ) -> bool {
    let state = self.state(index);

    if target == offset && state == BlockState::Alloc {
      self.set_state(index, BlockState::Free);
      return true;
    }

    if !state.has_children() {
      return false;
    }

    let left = left_child(index);
    let right = right_child(index);
    let half = block_size >> 1;

    let freed = if target - offset < half {
      self.free_r(target, left, half, offset)
    } else {
      self.free_r(target, right, half, offset + half)
    };

    if freed {
      let merged = self.state(left) == BlockState::Free && self.state(right) == BlockState::Free;

      self.set_state(index, if merged { BlockState::Free } else { BlockState::Split });
    }

    freed
  }
}

impl<P: RawProvider> Drop for BuddyAllocator<P> {
  fn drop(&mut self) {
    debug!("releasing buddy arena at {:?}", self.memory);

    unsafe {
      self.provider.release_raw(self.memory, self.arena_size, self.arena_size);
      self.provider.release_raw(self.tree, self.tree_len, TREE_ALIGN);
    }
  }
}
