use std::{mem, ptr::{self, NonNull}};

use libc::c_void;

/// Supplier of the raw buffers backing an allocator.
///
/// # Safety
///
/// A pointer returned by `allocate_raw` must be valid for reads and writes of
/// `size` bytes, aligned to `align`, and stay valid until it is passed back to
/// `release_raw` with the same `size` and `align`.
pub unsafe trait RawProvider {
  /// Returns `None` when the request cannot be satisfied. `align` is a power of two.
  fn allocate_raw(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<NonNull<u8>>;

  /// # Safety
  ///
  /// `ptr` must come from `allocate_raw` on this provider with the same `size`
  /// and `align`, and must not be released twice.
  unsafe fn release_raw(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
  );
}

/// Default provider backed by `posix_memalign(3)` and `free(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcProvider;

unsafe impl RawProvider for LibcProvider {
  fn allocate_raw(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<NonNull<u8>> {
    let align = align.max(mem::size_of::<*mut c_void>());
    let mut out: *mut c_void = ptr::null_mut();

    let rc = unsafe { libc::posix_memalign(&mut out, align, size.max(1)) };

    if rc != 0 {
      return None;
    }

    NonNull::new(out as *mut u8)
  }

  unsafe fn release_raw(
    &mut self,
    ptr: NonNull<u8>,
    _size: usize,
    _align: usize,
  ) {
    unsafe { libc::free(ptr.as_ptr() as *mut c_void) }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  /// Shared view of what a [`CountingProvider`] has done.
  #[derive(Debug, Default)]
  pub struct Counters {
    pub allocations: Cell<usize>,
    pub releases: Cell<usize>,
    pub bytes_live: Cell<usize>,
  }

  /// Wraps [`LibcProvider`], counting calls and failing the n-th allocation on request.
  #[derive(Debug, Default)]
  pub struct CountingProvider {
    pub counters: Rc<Counters>,
    pub fail_on: Option<usize>,
  }

  impl CountingProvider {
    pub fn failing_on(call: usize) -> Self {
      Self {
        fail_on: Some(call),
        ..Self::default()
      }
    }
  }

  unsafe impl RawProvider for CountingProvider {
    fn allocate_raw(
      &mut self,
      size: usize,
      align: usize,
    ) -> Option<NonNull<u8>> {
      let call = self.counters.allocations.get();

      if self.fail_on == Some(call) {
        return None;
      }

      let ptr = LibcProvider.allocate_raw(size, align)?;
      self.counters.allocations.set(call + 1);
      self.counters.bytes_live.set(self.counters.bytes_live.get() + size);

      Some(ptr)
    }

    unsafe fn release_raw(
      &mut self,
      ptr: NonNull<u8>,
      size: usize,
      align: usize,
    ) {
      self.counters.releases.set(self.counters.releases.get() + 1);
      self.counters.bytes_live.set(self.counters.bytes_live.get() - size);

      unsafe { LibcProvider.release_raw(ptr, size, align) }
    }
  }
}
