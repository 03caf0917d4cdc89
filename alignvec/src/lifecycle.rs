//! In-place construction and destruction of individual slots.
//!
//! These are the primitives the rest of the container is built from. They do no
//! bookkeeping: a slot is either uninitialized or live, and the caller tracks which.
//! Constructing into a live slot leaks its old value; destroying a slot twice is undefined
//! behavior.

use crate::storage::RawAlloc;
use crate::AlignVec;

use core::ptr;

impl<T, A: RawAlloc> AlignVec<T, A> {
    /// Clones `value` into slot `index`.
    ///
    /// `len` is not changed.
    ///
    /// # Safety
    ///
    /// * `index < capacity()`.
    /// * Slot `index` must be uninitialized (at or beyond `len()`, or previously destroyed
    ///   with [`destroy_range`](Self::destroy_range)).
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let mut v: AlignVec<String> = AlignVec::with_capacity(2).unwrap();
    /// unsafe {
    ///     v.construct_at(0, &"hello".to_string());
    ///     v.set_len(1);
    /// }
    /// assert_eq!(v[0], "hello");
    /// ```
    #[inline]
    pub unsafe fn construct_at(&mut self, index: usize, value: &T)
    where
        T: Clone,
    {
        debug_assert!(index < self.capacity);
        self.ptr.as_ptr().add(index).write(value.clone());
    }

    /// Drops slots `[begin, end)` in increasing index order, without touching `len`.
    ///
    /// If one destructor panics, the remaining slots in the range are still dropped before
    /// the panic continues.
    ///
    /// # Safety
    ///
    /// * `begin <= end <= capacity()`, and every slot in `[begin, end)` must be live.
    /// * Afterwards the slots are uninitialized: the caller must reconstruct them or lower
    ///   `len` (see [`set_len`](Self::set_len)) before the container is used or dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![String::from("a"), String::from("b"), String::from("c")];
    /// unsafe {
    ///     v.destroy_range(1, 3);
    ///     v.set_len(1);
    /// }
    /// assert_eq!(v.as_slice(), &["a"]);
    /// ```
    #[inline]
    pub unsafe fn destroy_range(&mut self, begin: usize, end: usize) {
        debug_assert!(begin <= end);
        debug_assert!(end <= self.capacity);
        if begin >= end {
            return;
        }
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
            self.ptr.as_ptr().add(begin),
            end - begin,
        ));
    }

    /// Sets the number of live elements.
    ///
    /// # Safety
    ///
    /// * `len <= capacity()`.
    /// * Slots `[0, len)` must all be live, and no live slot may remain at or beyond `len`
    ///   (it would be leaked, which is safe but rarely intended).
    #[inline]
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity);
        self.len = len;
    }
}
