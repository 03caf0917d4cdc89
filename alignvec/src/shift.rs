//! Relocation of runs of live elements, to open a gap for insertion or close one after
//! deletion.
//!
//! Each element moves by cloning it into its destination slot and then dropping the
//! source slot, so side effects in `Clone` and `Drop` run for every relocation. While a
//! relocation is in progress the container's `len` is lowered to the start of the run: if a
//! `Clone` panics part-way, the run and everything after it are leaked rather than dropped
//! twice.

use crate::storage::RawAlloc;
use crate::{AlignVec, Error};

use core::ptr;

impl<T: Clone, A: RawAlloc> AlignVec<T, A> {
    /// Moves the live elements at `[begin, end)` to `[begin + offset, end + offset)`,
    /// growing the buffer first if the destination does not fit.
    ///
    /// Elements are processed from `end - 1` down to `begin`, so overlapping source and
    /// destination ranges are safe. Afterwards slots `[begin, begin + offset)` are
    /// uninitialized, and `len` is unchanged.
    ///
    /// Does nothing when `offset == 0` or `end <= begin`. Only rightward shifts exist;
    /// see [`close_gap`](Self::close_gap) for the leftward direction.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if growing fails. No element has moved in that case.
    ///
    /// # Safety
    ///
    /// * `end <= len()`, so every slot in `[begin, end)` is live.
    /// * Slots `[end, end + offset)` must be uninitialized, which holds when `end == len()`.
    /// * Before the container is used or dropped, the caller must construct the vacated
    ///   slots and adjust `len` (see [`construct_at`](Self::construct_at) and
    ///   [`set_len`](Self::set_len)).
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![1u32, 2, 3];
    /// unsafe {
    ///     v.shift_elements(1, 3, 2).unwrap();
    ///     v.construct_at(1, &8);
    ///     v.construct_at(2, &9);
    ///     v.set_len(5);
    /// }
    /// assert_eq!(v.as_slice(), &[1, 8, 9, 2, 3]);
    /// ```
    pub unsafe fn shift_elements(
        &mut self,
        begin: usize,
        end: usize,
        offset: usize,
    ) -> Result<(), Error> {
        if offset == 0 || end <= begin {
            return Ok(());
        }
        debug_assert!(end <= self.len);
        let dest_end = end
            .checked_add(offset)
            .ok_or(Error::AllocationFailure { bytes: usize::MAX })?;
        self.grow_to(dest_end)?;

        let len = self.len;
        self.len = begin;
        let base = self.ptr.as_ptr();
        for src in (begin..end).rev() {
            let value = (*base.add(src)).clone();
            base.add(src + offset).write(value);
            ptr::drop_in_place(base.add(src));
        }
        self.len = len;
        Ok(())
    }

    /// Closes a gap of `count` already-destroyed slots starting at `begin`, by moving the
    /// tail `[begin + count, len)` left by `count` in increasing index order, then reducing
    /// `len` by `count`.
    ///
    /// # Safety
    ///
    /// * `begin + count <= len()`.
    /// * Slots `[begin, begin + count)` must be uninitialized, and every other slot below
    ///   `len()` must be live.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![10u32, 20, 30, 40];
    /// unsafe {
    ///     v.destroy_range(1, 3);
    ///     v.close_gap(1, 2);
    /// }
    /// assert_eq!(v.as_slice(), &[10, 40]);
    /// ```
    pub unsafe fn close_gap(&mut self, begin: usize, count: usize) {
        if count == 0 {
            return;
        }
        let len = self.len;
        debug_assert!(begin + count <= len);
        self.len = begin;
        let base = self.ptr.as_ptr();
        for src in begin + count..len {
            let value = (*base.add(src)).clone();
            base.add(src - count).write(value);
            ptr::drop_in_place(base.add(src));
        }
        self.len = len - count;
    }
}
