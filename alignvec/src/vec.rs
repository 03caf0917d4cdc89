//! The [`AlignVec`] container.

use crate::storage::{Global, RawAlloc, RawBlock};
use crate::Error;

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};

/// A growable, contiguous sequence over explicitly managed, alignment-correct storage.
///
/// Elements live in slots `[0, len)` of a single raw block obtained from `A`. Appending
/// doubles the capacity when full; inserting and deleting shift the following elements.
/// Every relocation, whether from growth or from a shift, clones the element into its new
/// slot and then drops the old one, so side effects in `Clone` and `Drop` run on each move.
///
/// # Element addresses
///
/// Element addresses are **not stable**. Any operation that can reallocate or shift
/// ([`reserve`](Self::reserve), [`grow`](Self::grow), [`append`](Self::append),
/// [`insert`](Self::insert), [`delete`](Self::delete),
/// [`shift_elements`](Self::shift_elements), ...) invalidates every pointer obtained from
/// [`as_ptr`](Self::as_ptr) or from converting an element reference to a raw pointer.
/// For references the borrow checker enforces this:
///
/// ```compile_fail,E0502
/// use alignvec::AlignVec;
///
/// let mut v: AlignVec<u32> = AlignVec::new();
/// v.append(&1).unwrap();
/// let first = &v[0];
/// v.append(&2).unwrap(); // may move `v[0]`
/// assert_eq!(*first, 1);
/// ```
///
/// Types that record their own address (registering `self` with some registry and
/// deregistering in `Drop`) do not survive relocation: the registered original is dropped,
/// and its clone lands in a slot whose address was never registered.
///
/// # Examples
///
/// ```
/// use alignvec::AlignVec;
///
/// let mut v: AlignVec<i32> = AlignVec::new();
/// for i in 0..4 {
///     v.append(&i).unwrap();
/// }
/// v.insert(&-1, 0).unwrap();
/// assert_eq!(v.as_slice(), &[-1, 0, 1, 2, 3]);
/// v.delete(3).unwrap();
/// assert_eq!(v.as_slice(), &[-1, 0, 1, 3]);
/// assert_eq!(v.capacity(), 8);
/// ```
pub struct AlignVec<T, A: RawAlloc = Global> {
    // Aligned to align_of::<T>(); dangling while `block` is None.
    pub(crate) ptr: NonNull<T>,
    pub(crate) len: usize,
    pub(crate) capacity: usize,
    pub(crate) block: Option<RawBlock>,
    pub(crate) alloc: A,
    marker: PhantomData<T>,
}

unsafe impl<T: Send, A: RawAlloc + Send> Send for AlignVec<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for AlignVec<T, A> {}

#[inline(never)]
#[cold]
fn out_of_range(index: usize, len: usize) -> ! {
    panic!("index {} out of range for length {}", index, len)
}

#[inline(never)]
#[cold]
pub(crate) fn allocation_failed(e: Error) -> ! {
    panic!("{}", e)
}

impl<T> AlignVec<T, Global> {
    /// Creates an empty container. Nothing is allocated until the first element arrives.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let v: AlignVec<f32> = AlignVec::new();
    /// assert_eq!(v.len(), 0);
    /// assert_eq!(v.capacity(), 0);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T: Clone> AlignVec<T, Global> {
    /// Creates an empty container with room for exactly `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let v: AlignVec<u16> = AlignVec::with_capacity(100).unwrap();
    /// assert_eq!(v.capacity(), 100);
    /// assert!(v.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: RawAlloc> AlignVec<T, A> {
    /// Creates an empty container that will draw its storage from `alloc`.
    #[inline]
    pub fn new_in(alloc: A) -> Self {
        AlignVec {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            block: None,
            alloc,
            marker: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of uninitialized slots after the last element.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.capacity - self.len
    }

    /// The allocator backing this container.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Drops every element in increasing index order. Capacity and the allocation are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![1u8, 2, 3];
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert_eq!(v.capacity(), 4);
    /// ```
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // Safety: [0, len) were live, and len is already 0, so a panicking destructor
        // cannot lead to a second drop.
        unsafe { self.destroy_range(0, len) }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < len()`. Anything else is undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.ptr.as_ptr().add(index)
    }

    /// Returns a mutable reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < len()`. Anything else is undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.ptr.as_ptr().add(index)
    }

    /// Returns the element at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the element at `index` mutably, or `None` if out of range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the element at `index`, or [`Error::OutOfRange`].
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::{alignvec, Error};
    ///
    /// let v = alignvec!['a', 'b'];
    /// assert_eq!(v.try_get(1), Ok(&'b'));
    /// assert_eq!(v.try_get(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    #[inline]
    pub fn try_get(&self, index: usize) -> Result<&T, Error> {
        self.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.len,
        })
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // Safety: [0, len) are live; ptr is aligned and non-null even when nothing is
        // allocated.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Address of slot 0. Dangling (but aligned) while nothing is allocated.
    ///
    /// The pointer is invalidated by any operation that reallocates or shifts.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable address of slot 0. Same invalidation rules as [`as_ptr`](Self::as_ptr).
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Iterate over references.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate over mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// The first element, if any.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The last element, if any.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }
}

impl<T: Clone, A: RawAlloc> AlignVec<T, A> {
    /// Creates an empty container with room for exactly `capacity` elements, drawing its
    /// storage from `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, Error> {
        let mut v = Self::new_in(alloc);
        v.reserve(capacity)?;
        Ok(v)
    }

    /// Clones `value` onto the end, doubling the capacity first if there is no free slot.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if growing fails; nothing is changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let mut v: AlignVec<String> = AlignVec::new();
    /// v.append(&"x".to_string()).unwrap();
    /// assert_eq!(v.len(), 1);
    /// assert_eq!(v.capacity(), 1);
    /// ```
    pub fn append(&mut self, value: &T) -> Result<(), Error> {
        if self.free_space() == 0 {
            self.grow()?;
        }
        // Safety: len < capacity, and slots at or past len are uninitialized.
        unsafe { self.construct_at(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Inserts a clone of `value` at `position`, shifting `[position, len)` up by one.
    ///
    /// The clone is made before any element moves. Inserting at `len()` is
    /// [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// * [`Error::OutOfRange`] if `position > len()`.
    /// * [`Error::AllocationFailure`] if growing fails.
    ///
    /// Either way nothing is changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::{alignvec, Error};
    ///
    /// let mut v = alignvec![0, 1, 2, 3];
    /// v.insert(&-1, 0).unwrap();
    /// assert_eq!(v.as_slice(), &[-1, 0, 1, 2, 3]);
    /// assert_eq!(v.insert(&9, 6), Err(Error::OutOfRange { index: 6, len: 5 }));
    /// ```
    pub fn insert(&mut self, value: &T, position: usize) -> Result<(), Error> {
        let len = self.len;
        if position > len {
            return Err(Error::OutOfRange {
                index: position,
                len,
            });
        }
        if position == len {
            return self.append(value);
        }
        let value = value.clone();
        // Safety: [position, len) is live and [len, len + 1) is uninitialized. The shift
        // leaves slot `position` uninitialized, which the write fills.
        unsafe {
            self.shift_elements(position, len, 1)?;
            self.ptr.as_ptr().add(position).write(value);
        }
        self.len = len + 1;
        Ok(())
    }

    /// Inserts clones of `values` starting at `position`, shifting `[position, len)` up by
    /// `values.len()` in one pass.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert); nothing is changed on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![1, 5];
    /// v.insert_slice(1, &[2, 3, 4]).unwrap();
    /// assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_slice(&mut self, position: usize, values: &[T]) -> Result<(), Error> {
        let len = self.len;
        if position > len {
            return Err(Error::OutOfRange {
                index: position,
                len,
            });
        }
        if values.is_empty() {
            return Ok(());
        }
        let new_len = len
            .checked_add(values.len())
            .ok_or(Error::AllocationFailure { bytes: usize::MAX })?;
        self.grow_to(new_len)?;
        unsafe {
            self.shift_elements(position, len, values.len())?;
            // A panicking clone leaks the shifted tail instead of exposing the gap.
            self.len = position;
            for (i, value) in values.iter().enumerate() {
                self.construct_at(position + i, value);
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// Drops the element at `position` and shifts `[position + 1, len)` down by one.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `position >= len()`; nothing is changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![0, 1, 2, 3];
    /// v.delete(2).unwrap();
    /// assert_eq!(v.as_slice(), &[0, 1, 3]);
    /// assert!(v.delete(3).is_err());
    /// ```
    pub fn delete(&mut self, position: usize) -> Result<(), Error> {
        let len = self.len;
        if position >= len {
            return Err(Error::OutOfRange {
                index: position,
                len,
            });
        }
        self.remove_run(position, position + 1);
        Ok(())
    }

    /// Drops the elements in `[begin, end)` and shifts the tail down to close the gap.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `begin > end` or `end > len()`; nothing is changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::alignvec;
    ///
    /// let mut v = alignvec![0, 1, 2, 3, 4, 5];
    /// v.delete_range(1, 4).unwrap();
    /// assert_eq!(v.as_slice(), &[0, 4, 5]);
    /// ```
    pub fn delete_range(&mut self, begin: usize, end: usize) -> Result<(), Error> {
        let len = self.len;
        if end > len {
            return Err(Error::OutOfRange { index: end, len });
        }
        if begin > end {
            return Err(Error::OutOfRange { index: begin, len });
        }
        self.remove_run(begin, end);
        Ok(())
    }

    fn remove_run(&mut self, begin: usize, end: usize) {
        if begin == end {
            return;
        }
        let len = self.len;
        // Safety: begin < end <= len. While destroying, len is lowered so that a panicking
        // destructor leaks the tail rather than dropping the run again.
        unsafe {
            self.len = begin;
            self.destroy_range(begin, end);
            self.len = len;
            self.close_gap(begin, end - begin);
        }
    }
}

impl<T, A: RawAlloc> Drop for AlignVec<T, A> {
    fn drop(&mut self) {
        let len = core::mem::replace(&mut self.len, 0);
        // Safety: the block came from self.alloc. The guard is dropped after the elements,
        // and still runs if one of their destructors panics.
        let _release = self
            .block
            .take()
            .map(|block| unsafe { block.release_on_drop(&self.alloc) });
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), len));
        }
    }
}

impl<T> Default for AlignVec<T, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: RawAlloc> Index<usize> for AlignVec<T, A> {
    type Output = T;

    /// Checked access; panics if `index >= len()`. For the unchecked variant see
    /// [`AlignVec::get_unchecked`].
    #[inline]
    fn index(&self, index: usize) -> &T {
        if index < self.len {
            // Safety: just checked.
            unsafe { self.get_unchecked(index) }
        } else {
            out_of_range(index, self.len)
        }
    }
}

impl<T, A: RawAlloc> IndexMut<usize> for AlignVec<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        if index < self.len {
            unsafe { self.get_unchecked_mut(index) }
        } else {
            out_of_range(index, self.len)
        }
    }
}

/// Two containers are equal when they have the same length and their elements compare
/// equal index by index. Comparison stops at the first mismatch.
impl<T: PartialEq, A: RawAlloc, B: RawAlloc> PartialEq<AlignVec<T, B>> for AlignVec<T, A> {
    fn eq(&self, other: &AlignVec<T, B>) -> bool {
        if self.len != other.len {
            return false;
        }
        for i in 0..self.len {
            // Safety: i < len of both.
            if unsafe { self.get_unchecked(i) != other.get_unchecked(i) } {
                return false;
            }
        }
        true
    }
}

impl<T: Eq, A: RawAlloc> Eq for AlignVec<T, A> {}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for AlignVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Clones into a fresh block sized exactly to `len()`.
///
/// # Panics
///
/// Panics if the allocation fails.
impl<T: Clone, A: RawAlloc + Clone> Clone for AlignVec<T, A> {
    fn clone(&self) -> Self {
        let mut v = Self::new_in(self.alloc.clone());
        v.reserve(self.len).unwrap_or_else(|e| allocation_failed(e));
        for value in self.iter() {
            v.append(value).unwrap_or_else(|e| allocation_failed(e));
        }
        v
    }
}

/// Appends clones of each item.
///
/// # Panics
///
/// Panics if growing fails.
impl<'a, T: Clone + 'a, A: RawAlloc> Extend<&'a T> for AlignVec<T, A> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        for value in iter {
            self.append(value).unwrap_or_else(|e| allocation_failed(e));
        }
    }
}

/// Appends each item; the item itself is dropped once its clone is in place.
///
/// # Panics
///
/// Panics if growing fails.
impl<T: Clone> FromIterator<T> for AlignVec<T, Global> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut v = AlignVec::new();
        for value in iter {
            v.append(&value).unwrap_or_else(|e| allocation_failed(e));
        }
        v
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a AlignVec<T, A> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut AlignVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Creates an [`AlignVec`] by appending each value in turn, so the capacity follows the
/// usual doubling sequence.
///
/// # Examples
///
/// ```
/// use alignvec::alignvec;
///
/// let v = alignvec![1u32, 2, 3];
/// assert_eq!(v.as_slice(), &[1, 2, 3]);
/// assert_eq!(v.capacity(), 4);
/// ```
#[macro_export]
macro_rules! alignvec {
    () => (
        $crate::AlignVec::new()
    );
    ($($x:expr),+ $(,)?) => (
        <$crate::AlignVec<_> as ::core::iter::FromIterator<_>>::from_iter([$($x),+])
    );
}
