//! Single module with the common `alignvec` exports.
//!
//! # Examples
//!
//! ```
//! use alignvec::prelude::*;
//!
//! let mut v: AlignVec<u8> = alignvec![1, 2];
//! v.append(&3).unwrap();
//! assert_eq!(v.try_get(5), Err(Error::OutOfRange { index: 5, len: 3 }));
//! ```

pub use crate::alignvec;
pub use crate::storage::{Global, RawAlloc};
pub use crate::{AlignVec, Error};
