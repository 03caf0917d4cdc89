//! Errors reported by [`AlignVec`](crate::AlignVec) operations.
//!
//! Every reported error leaves the container exactly as it was before the call.

use core::fmt;

/// Errors returned by fallible operations on [`AlignVec`](crate::AlignVec).
///
/// # Examples
///
/// ```
/// use alignvec::{AlignVec, Error};
///
/// let mut v: AlignVec<u32> = AlignVec::new();
/// v.append(&7).unwrap();
/// assert_eq!(v.delete(3), Err(Error::OutOfRange { index: 3, len: 1 }));
/// assert_eq!(v.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A position was outside the range accepted by the operation.
    ///
    /// `insert` accepts `index <= len`; `delete` and checked reads accept `index < len`.
    OutOfRange {
        /// The rejected position.
        index: usize,
        /// The container's length at the time of the call.
        len: usize,
    },
    /// The allocator could not provide a block of the requested size, or the size
    /// computation overflowed `usize`.
    AllocationFailure {
        /// Number of bytes requested from the allocator, saturated at `usize::MAX`
        /// when the computation itself overflowed.
        bytes: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OutOfRange { index, len } => {
                write!(f, "position {} out of range for length {}", index, len)
            }
            Self::AllocationFailure { bytes } => {
                write!(f, "failed to allocate {} bytes", bytes)
            }
        }
    }
}

impl core::error::Error for Error {}
