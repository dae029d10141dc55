use std::ptr::NonNull;

use buddy_arena::{BlockState, BuddyAllocator};

/// Prints every reachable node of the tree, indented by depth.
fn print_tree(allocator: &BuddyAllocator) {
  for node in allocator.tree().nodes() {
    let label = match node.state {
      BlockState::Free => "free",
      BlockState::Split => "split",
      BlockState::Used => "used",
      BlockState::Alloc => "ALLOC",
    };

    println!(
      "{:indent$}[{:>3}..{:>3}) {}",
      "",
      node.offset,
      node.offset + node.size,
      label,
      indent = node.depth * 2
    );
  }
}

fn main() -> buddy_arena::Result<()> {
  // RUST_LOG=trace shows every block as it is served and released.
  env_logger::init();

  // 128 byte arena, halved at most 5 times: blocks of 128, 64, 32, 16, 8 and 4 bytes.
  let mut allocator = BuddyAllocator::new(128, 5)?;

  // --------------------------------------------------------------------
  // 1) Fill the arena with odd-sized requests.
  //    Each one is rounded up to a power of two.
  // --------------------------------------------------------------------
  let mut live: Vec<NonNull<u8>> = Vec::new();

  for size in [24, 21, 19, 7, 7, 7, 1, 1, 1] {
    match allocator.alloc(size) {
      Some(ptr) => {
        let offset = ptr.as_ptr() as usize - allocator.arena_start().as_ptr() as usize;
        println!("alloc({:>2}) -> offset {:>3}", size, offset);
        live.push(ptr);
      }
      None => println!("alloc({:>2}) -> no block left", size),
    }
  }

  println!("\n{} of {} bytes in use", allocator.allocated_bytes(), allocator.arena_size());
  print_tree(&allocator);

  // --------------------------------------------------------------------
  // 2) Release everything, newest first. Buddies merge on the way up.
  // --------------------------------------------------------------------
  for ptr in live.into_iter().rev() {
    allocator.free(ptr);
  }

  println!("\nafter freeing everything:");
  print_tree(&allocator);

  // --------------------------------------------------------------------
  // 3) The whole arena is available again.
  // --------------------------------------------------------------------
  let whole = allocator.alloc(128);
  println!("\nalloc(128) succeeded: {}", whole.is_some());

  Ok(())
}
