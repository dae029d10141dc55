//! Construction errors.
//!
//! Running out of blocks is not an error: `alloc` reports it as `None`.

use std::fmt;

use thiserror::Error;

/// Which of the two backing buffers a provider failed to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
  Arena,
  Tree,
}

impl fmt::Display for Buffer {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::Arena => f.write_str("arena"),
      Self::Tree => f.write_str("bookkeeping tree"),
    }
  }
}

/// Errors raised while building a [`BuddyAllocator`](crate::BuddyAllocator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuddyError {
  /// The tree would be deeper than the supported maximum.
  #[error("tree depth {levels} exceeds the maximum of {max} levels")]
  LevelsTooDeep {
    levels: usize,
    max: usize,
  },

  /// Halving the arena `levels` times leaves a zero-byte block.
  #[error("arena of {arena_size} bytes cannot be halved {levels} times")]
  ArenaTooSmall {
    arena_size: usize,
    levels: usize,
  },

  /// The requested arena size has no power of two representable in `usize`.
  #[error("arena size {requested} cannot be rounded up to a power of two")]
  SizeOverflow {
    requested: usize,
  },

  /// The backing provider refused to supply a buffer.
  #[error("backing provider could not supply {size} bytes for the {buffer}")]
  ProviderExhausted {
    buffer: Buffer,
    size: usize,
  },
}

pub type Result<T> = std::result::Result<T, BuddyError>;
