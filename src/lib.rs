//! # buddy_arena - A Fixed-Capacity Buddy Allocator
//!
//! This crate provides a **buddy allocator** that manages a single
//! power-of-two arena by recursively halving it into pairs of "buddy" blocks.
//!
//! ## Overview
//!
//! Every block in the arena is a node of a complete binary tree. Splitting a
//! block produces two buddies of half its size; when both buddies are free
//! again they are merged back into their parent:
//!
//! ```text
//!   Arena of 128 bytes, 5 levels (blocks of 128, 64, 32, 16, 8, 4 bytes):
//!
//!   depth 0   ┌───────────────────────────────────────────────────────────┐
//!             │                           128                             │
//!             └───────────────────────────────────────────────────────────┘
//!   depth 1   ┌─────────────────────────────┬─────────────────────────────┐
//!             │             64              │             64              │
//!             └─────────────────────────────┴─────────────────────────────┘
//!   depth 2   ┌──────────────┬──────────────┬──────────────┬──────────────┐
//!             │      32      │      32      │      32      │      32      │
//!             └──────────────┴──────────────┴──────────────┴──────────────┘
//!                  ...            ...            ...            ...
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   buddy_arena
//!   ├── align      - Power-of-two rounding and the is_aligned! macro
//!   ├── block      - Per-node state and tree index arithmetic
//!   ├── buddy      - BuddyAllocator implementation
//!   ├── config     - Arena size and tree depth
//!   ├── error      - Construction errors
//!   ├── provider   - Backing memory supplier (RawProvider, LibcProvider)
//!   └── tree       - Read-only view of the bookkeeping tree
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use buddy_arena::BuddyAllocator;
//!
//! let mut allocator = BuddyAllocator::new(128, 5).unwrap();
//!
//! // 24 bytes are served from a 32 byte block.
//! let ptr = allocator.alloc(24).unwrap();
//!
//! unsafe { ptr.as_ptr().write_bytes(0xAB, 24) };
//!
//! allocator.free(ptr);
//! assert!(allocator.is_empty());
//! ```
//!
//! ## How It Works
//!
//! The tree is stored as a flat byte array: node `i` has children `2i + 1`
//! and `2i + 2`. Each byte holds one of four states:
//!
//! ```text
//!   FREE  ──split on demand──▶ SPLIT ──both halves full──▶ USED
//!     ▲                          │                           │
//!     └───both halves free───────┘◀──one half released───────┘
//!
//!   FREE ──exact size taken──▶ ALLOC ──released──▶ FREE
//! ```
//!
//! `alloc` rounds the request up to a power of two (never below the smallest
//! block), then descends from the root trying the left half before the right
//! one. `free` follows the address down to the exact block that was handed out
//! and merges buddies on the way back up.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **Fixed capacity**: The arena never grows or shrinks
//! - **Power-of-two blocks**: A request may use up to twice its size
//!
//! ## Safety
//!
//! The allocator hands out raw pointers into memory it owns. Using a pointer
//! after it was freed, or after the allocator is dropped, is undefined behavior.

pub mod align;
pub mod block;
mod buddy;
pub mod config;
pub mod error;
pub mod provider;
pub mod tree;

pub use block::BlockState;
pub use buddy::BuddyAllocator;
pub use config::{BuddyConfig, MAX_LEVELS, max_levels};
pub use error::{Buffer, BuddyError, Result};
pub use provider::{LibcProvider, RawProvider};
pub use tree::{NodeInfo, TreeView};
