//! Raw, alignment-correct storage for [`AlignVec`].
//!
//! Every block is requested from a [`RawAlloc`] with byte alignment only, padded by
//! `align_of::<T>()` bytes of slack. The element region is then placed at the first
//! suitably aligned address inside the block, as computed by [`usable_offset`]. This works
//! on any allocator, including ones that make no alignment promises at all.
//!
//! # Examples
//!
//! ```
//! use alignvec::storage::usable_offset;
//!
//! // A block starting at address 0x1003, holding elements aligned to 8:
//! let offset = usable_offset(0x1003, 8);
//! assert_eq!(offset, 5);
//! assert_eq!((0x1003 + offset) % 8, 0);
//! ```

use crate::{AlignVec, Error};

use core::alloc::Layout;
use core::mem;
use core::ptr::{self, NonNull};

/// Returns the number of bytes from `raw_address` to the first address that is a multiple
/// of `alignment`, skipping `raw_address` itself.
///
/// The result lies in `1..=alignment`, so a block with `alignment` bytes of slack always
/// contains the returned position plus the full element region.
///
/// `alignment` must be a power of two.
///
/// # Examples
///
/// ```
/// use alignvec::storage::usable_offset;
///
/// assert_eq!(usable_offset(0x1000, 4), 4);
/// assert_eq!(usable_offset(0x1001, 4), 3);
/// assert_eq!(usable_offset(0x1007, 1), 1);
/// ```
#[inline]
pub fn usable_offset(raw_address: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    let misalignment_mask = alignment - 1;
    let misalignment = raw_address & misalignment_mask;
    alignment - misalignment
}

/// A source of raw memory blocks for [`AlignVec`].
///
/// # Safety
///
/// An implementor must ensure that a pointer returned by `allocate(layout)` is valid for
/// reads and writes of `layout.size()` bytes, aligned to `layout.align()`, and stays valid
/// and unaliased until it is passed back to `release` (or until the allocator itself goes
/// away, for arena-style allocators whose lifetime bounds the container).
pub unsafe trait RawAlloc {
    /// Allocates a block for `layout`, or returns `None` if the memory is unavailable.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `self.allocate(layout)` with this same `layout`, and must
    /// not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The global allocator of the `alloc` crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // Safety: the layout has non-zero size.
        NonNull::new(unsafe { alloc::alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::alloc::dealloc(ptr.as_ptr(), layout)
    }
}

/// Arena-backed storage. Released blocks are reclaimed only when the arena is dropped.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "bumpalo")] {
/// use alignvec::AlignVec;
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let mut v = AlignVec::new_in(&arena);
/// v.append(&1.5f64).unwrap();
/// v.append(&2.5f64).unwrap();
/// assert_eq!(v.as_slice(), &[1.5, 2.5]);
/// # }
/// ```
#[cfg(feature = "bumpalo")]
unsafe impl RawAlloc for &bumpalo::Bump {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.try_alloc_layout(layout).ok()
    }

    #[inline]
    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}

/// Ownership handle for one raw allocation. Its start is generally not where the elements
/// begin, because of alignment slack.
#[derive(Debug)]
pub(crate) struct RawBlock {
    start: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    /// Hands the block to a guard that gives it back to `alloc` when dropped, including
    /// while unwinding from a panicking element destructor.
    ///
    /// Safety: the block must have come from `alloc`, and no live element may remain in it
    /// by the time the guard is dropped.
    #[inline]
    pub(crate) unsafe fn release_on_drop<A: RawAlloc>(self, alloc: &A) -> Release<'_, A> {
        Release { alloc, block: self }
    }
}

pub(crate) struct Release<'a, A: RawAlloc> {
    alloc: &'a A,
    block: RawBlock,
}

impl<'a, A: RawAlloc> Drop for Release<'a, A> {
    fn drop(&mut self) {
        unsafe { self.alloc.release(self.block.start, self.block.layout) }
    }
}

#[inline(never)]
#[cold]
fn size_overflow() -> Error {
    Error::AllocationFailure { bytes: usize::MAX }
}

/// Layout of a block holding `capacity` elements of `T` plus alignment slack.
#[inline]
pub(crate) fn slack_layout<T>(capacity: usize) -> Result<Layout, Error> {
    let required_alignment = mem::align_of::<T>();
    let bytes = mem::size_of::<T>()
        .checked_mul(capacity)
        .and_then(|b| b.checked_add(required_alignment))
        .ok_or_else(size_overflow)?;
    Layout::from_size_align(bytes, 1).map_err(|_| Error::AllocationFailure { bytes })
}

/// Allocates a block for `capacity` elements and returns it with its aligned usable region.
pub(crate) fn allocate_aligned<T, A: RawAlloc>(
    alloc: &A,
    capacity: usize,
) -> Result<(RawBlock, NonNull<T>), Error> {
    let layout = slack_layout::<T>(capacity)?;
    let start = alloc
        .allocate(layout)
        .ok_or(Error::AllocationFailure {
            bytes: layout.size(),
        })?;
    let offset = usable_offset(start.as_ptr() as usize, mem::align_of::<T>());
    // Safety: offset <= align_of::<T>(), which is the slack at the end of the layout, so the
    // usable region stays inside the block.
    let usable = unsafe { NonNull::new_unchecked(start.as_ptr().add(offset).cast::<T>()) };
    debug_assert_eq!(usable.as_ptr() as usize % mem::align_of::<T>(), 0);
    Ok((RawBlock { start, layout }, usable))
}

/// A freshly allocated block that is being filled with clones. Dropping it (on a panicking
/// `Clone`) destroys the clones made so far and releases the block.
struct Transfer<'a, T, A: RawAlloc> {
    alloc: &'a A,
    block: RawBlock,
    usable: NonNull<T>,
    initialized: usize,
}

impl<'a, T, A: RawAlloc> Transfer<'a, T, A> {
    fn finish(self) -> (RawBlock, NonNull<T>) {
        let block = RawBlock {
            start: self.block.start,
            layout: self.block.layout,
        };
        let usable = self.usable;
        core::mem::forget(self);
        (block, usable)
    }
}

impl<'a, T, A: RawAlloc> Drop for Transfer<'a, T, A> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.usable.as_ptr(),
                self.initialized,
            ));
            self.alloc.release(self.block.start, self.block.layout);
        }
    }
}

impl<T: Clone, A: RawAlloc> AlignVec<T, A> {
    /// Ensures room for at least `requested` elements, reallocating when
    /// `requested >= capacity()`. Never shrinks.
    ///
    /// Reallocation clones every live element into the new block in increasing index
    /// order, then drops the old elements in increasing index order and releases the old
    /// block. Every element address changes.
    ///
    /// If allocation fails, nothing is changed. If a `Clone` panics, the clones made so far
    /// are dropped and the container keeps its old buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let mut v: AlignVec<u64> = AlignVec::new();
    /// v.reserve(10).unwrap();
    /// assert_eq!(v.capacity(), 10);
    /// v.reserve(3).unwrap();
    /// assert_eq!(v.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, requested: usize) -> Result<(), Error> {
        if requested < self.capacity || requested == 0 {
            return Ok(());
        }
        let (block, usable) = allocate_aligned::<T, A>(&self.alloc, requested)?;
        let mut transfer = Transfer {
            alloc: &self.alloc,
            block,
            usable,
            initialized: 0,
        };
        for i in 0..self.len {
            // Safety: i < len, so the source is live; i < requested, so the destination is
            // an uninitialized slot of the new block.
            unsafe {
                let value = (*self.ptr.as_ptr().add(i)).clone();
                transfer.usable.as_ptr().add(i).write(value);
            }
            transfer.initialized += 1;
        }
        let (block, usable) = transfer.finish();

        let len = self.len;
        let old_ptr = core::mem::replace(&mut self.ptr, usable);
        let old_block = self.block.replace(block);
        self.capacity = requested;
        unsafe {
            let _release = old_block.map(|b| b.release_on_drop(&self.alloc));
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(old_ptr.as_ptr(), len));
        }
        Ok(())
    }

    /// Doubles the capacity, or makes room for one element if there is none yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use alignvec::AlignVec;
    ///
    /// let mut v: AlignVec<u8> = AlignVec::new();
    /// v.grow().unwrap();
    /// assert_eq!(v.capacity(), 1);
    /// v.grow().unwrap();
    /// v.grow().unwrap();
    /// assert_eq!(v.capacity(), 4);
    /// assert_eq!(v.len(), 0);
    /// ```
    pub fn grow(&mut self) -> Result<(), Error> {
        let requested = if self.capacity == 0 {
            1
        } else {
            self.capacity.checked_mul(2).ok_or_else(size_overflow)?
        };
        self.reserve(requested)
    }

    /// Grows by doubling until at least `minimum` slots exist.
    pub(crate) fn grow_to(&mut self, minimum: usize) -> Result<(), Error> {
        if minimum <= self.capacity {
            return Ok(());
        }
        let mut requested = core::cmp::max(self.capacity, 1);
        while requested < minimum {
            requested = requested.checked_mul(2).ok_or_else(size_overflow)?;
        }
        self.reserve(requested)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::Cell;

    /// Hands out blocks shifted `skew` bytes past what the global allocator returned, so the
    /// slack computation sees misaligned starts.
    pub(crate) struct Skewed {
        pub(crate) skew: usize,
    }

    unsafe impl RawAlloc for Skewed {
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            let inner = Layout::from_size_align(layout.size() + self.skew, 1).ok()?;
            let p = Global.allocate(inner)?;
            NonNull::new(unsafe { p.as_ptr().add(self.skew) })
        }

        unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
            let inner = Layout::from_size_align_unchecked(layout.size() + self.skew, 1);
            Global.release(NonNull::new_unchecked(ptr.as_ptr().sub(self.skew)), inner)
        }
    }

    /// Succeeds `budget` times, then refuses every request.
    pub(crate) struct Budget {
        pub(crate) budget: Cell<usize>,
        pub(crate) live: Cell<isize>,
    }

    impl Budget {
        pub(crate) fn new(budget: usize) -> Self {
            Budget {
                budget: Cell::new(budget),
                live: Cell::new(0),
            }
        }
    }

    unsafe impl RawAlloc for &Budget {
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            let remaining = self.budget.get();
            if remaining == 0 {
                return None;
            }
            self.budget.set(remaining - 1);
            let p = Global.allocate(layout)?;
            self.live.set(self.live.get() + 1);
            Some(p)
        }

        unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.set(self.live.get() - 1);
            Global.release(ptr, layout)
        }
    }

    #[test]
    fn offset_lands_on_alignment_within_slack() {
        for align in [1usize, 2, 4, 8, 16, 64] {
            for addr in 0x4000usize..0x4000 + 2 * align {
                let offset = usable_offset(addr, align);
                assert!(offset >= 1 && offset <= align);
                assert_eq!((addr + offset) % align, 0);
            }
        }
    }

    #[test]
    fn slack_layout_adds_alignment_bytes() {
        let layout = slack_layout::<u64>(3).unwrap();
        assert_eq!(layout.size(), 3 * 8 + 8);
        assert_eq!(layout.align(), 1);
        let layout = slack_layout::<()>(1000).unwrap();
        assert_eq!(layout.size(), 1);
    }

    #[test]
    fn slack_layout_overflow_is_allocation_failure() {
        assert_eq!(
            slack_layout::<u64>(usize::MAX),
            Err(Error::AllocationFailure { bytes: usize::MAX })
        );
    }

    #[test]
    fn skewed_blocks_are_realigned() {
        for skew in 0..8 {
            let alloc = Skewed { skew };
            let (block, usable) = allocate_aligned::<f64, _>(&alloc, 4).unwrap();
            assert_eq!(usable.as_ptr() as usize % 8, 0);
            let start = block.start.as_ptr() as usize;
            let end = start + block.layout.size();
            assert!(usable.as_ptr() as usize + 4 * 8 <= end);
            drop(unsafe { block.release_on_drop(&alloc) });
        }
    }

    #[test]
    fn refused_allocation_reports_bytes() {
        let budget = Budget::new(0);
        let err = allocate_aligned::<u32, _>(&&budget, 5).unwrap_err();
        assert_eq!(err, Error::AllocationFailure { bytes: 5 * 4 + 4 });
    }
}
