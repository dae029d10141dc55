/// Checks whether `addr` is a multiple of the power of two `size`.
///
/// # Examples
///
/// ```rust
/// use buddy_arena::is_aligned;
///
/// assert!(is_aligned!(64usize, 16usize));
/// assert!(!is_aligned!(72usize, 16usize));
/// ```
#[macro_export]
macro_rules! is_aligned {
  ($addr:expr, $size:expr) => {
    ($addr) & (($size) - 1) == 0
  };
}

/// Rounds `n` up to the next power of two. `0` rounds to `1`.
///
/// Returns `None` when the result does not fit in a `usize`.
pub const fn next_pot(n: usize) -> Option<usize> {
  n.checked_next_power_of_two()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_next_pot() {
    let cases = [(0, 1), (1, 1), (2, 2), (3, 4), (7, 8), (8, 8), (19, 32), (21, 32), (24, 32), (100, 128)];

    for (input, expected) in cases {
      assert_eq!(Some(expected), next_pot(input));
    }
  }

  #[test]
  fn test_next_pot_overflow() {
    assert_eq!(None, next_pot(usize::MAX));
    assert_eq!(None, next_pot((1 << (usize::BITS - 1)) + 1));
    assert_eq!(Some(1 << (usize::BITS - 1)), next_pot(1 << (usize::BITS - 1)));
  }

  #[test]
  fn test_is_aligned() {
    for shift in 0..10 {
      let size: usize = 1 << shift;

      for i in 0..8 {
        assert!(is_aligned!(size * i, size));
      }

      if size > 1 {
        assert!(!is_aligned!(size + 1, size));
      }
    }
  }
}
