#![doc = crate::doc_macro::layout_doc!(
//! # `alignvec`
//! A growable, contiguous sequence with explicit, alignment-correct storage management.
//!
//! 1. [Summary](#summary)
//! 1. [Storage layout](#storage-layout)
//! 1. [Element lifecycle](#element-lifecycle)
//! 1. [Errors and unchecked operations](#errors-and-unchecked-operations)
//! 1. [Feature flags](#feature-flags)
//!
//! # Summary
//!
//! [`AlignVec<T>`] is a `Vec`-like container whose storage engine is spelled out rather than
//! delegated: it requests raw bytes from an allocator, places its elements at a correctly
//! aligned position inside them, constructs and destroys elements in place, and shifts runs
//! of elements to open or close gaps. Appending is amortized O(1) through capacity doubling;
//! positional insertion and deletion are O(n) in the number of elements moved.
//!
//! ```
//! use alignvec::AlignVec;
//!
//! let mut v: AlignVec<i32> = AlignVec::new();
//! for i in 0..4 {
//!     v.append(&i).unwrap();
//! }
//! assert_eq!(v.len(), 4);
//! assert_eq!(v.capacity(), 4);
//!
//! v.insert(&-1, 0).unwrap();
//! assert_eq!(v.as_slice(), &[-1, 0, 1, 2, 3]);
//!
//! v.delete(2).unwrap();
//! assert_eq!(v.as_slice(), &[-1, 0, 2, 3]);
//! ```
//!
//! # Storage layout
//!
//! Each block is requested with byte alignment only, and is `align_of::<T>()` bytes longer
//! than the elements need. The elements start at the first aligned address strictly after
//! the block's start ([`storage::usable_offset`]), which always falls inside that slack:
//!
//! ```svgbob
//! "raw block start"
//!  |
//!  v
//!  +---------+-----------+-----------+-----+-----------+--------------+
//!  | padding | "slot 0"  | "slot 1"  | ... | "slot n-1"| "rest of"    |
//!  | "1..=A" |           |           |     |           | "slack"      |
//!  +---------+-----------+-----------+-----+-----------+--------------+
//!            ^
//!            |
//!           "usable region, aligned to A = align_of::<T>()"
//! ```
//!
//! Only one block is owned at a time. Growth allocates the new block, copies the live
//! elements over, and only then destroys the old elements and releases the old block.
//!
//! # Element lifecycle
//!
//! Elements are copy-constructed: [`AlignVec::append`] and [`AlignVec::insert`] take `&T`
//! and store a clone. Relocating an element (on growth, or when shifting for an insert or
//! delete) clones it into the new slot and drops the old slot. Element addresses therefore
//! change on every reallocation and every shift, and a value whose address was recorded
//! somewhere is dropped (and so can deregister itself) when it moves.
//!
//! # Errors and unchecked operations
//!
//! Fallible operations return [`Error`], and leave the container unchanged when they do:
//! out-of-range positions give [`Error::OutOfRange`], refused or oversized allocations give
//! [`Error::AllocationFailure`].
//!
//! The lifecycle and shift primitives ([`AlignVec::construct_at`],
//! [`AlignVec::destroy_range`], [`AlignVec::shift_elements`], [`AlignVec::close_gap`]) and
//! unchecked indexing ([`AlignVec::get_unchecked`]) are `unsafe fn`s whose preconditions
//! are checked only by debug assertions.
//!
)]
//! # Feature flags
//!
//! This crate has no *required* dependencies. The following feature flags exist, which can turn
//! on some dependencies.
//!
//! * `bumpalo`. Enables [`storage::RawAlloc`] for `&bumpalo::Bump`, so an `AlignVec` can keep
//!   its blocks in an arena. Adds a dependency on `bumpalo`.
//! * `doc`. Renders the storage layout diagram above as SVG. Adds a dependency on `svgbobdoc`.
//!

#![no_std]
extern crate alloc;

pub mod error;
pub mod lifecycle;
pub mod prelude;
pub mod shift;
pub mod storage;
pub mod vec;

mod doc_macro;

pub use error::Error;
pub use storage::{Global, RawAlloc};
pub use vec::AlignVec;
