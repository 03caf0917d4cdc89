//! Element types that exercise `AlignVec`'s storage engine: plain and padded records,
//! a type that counts its destructions, and a type that registers its own address.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Three plain integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ThreeInts {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

/// A record with interior padding: `b` needs 8-byte alignment, `a` does not.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Padded {
    pub a: u8,
    pub b: f64,
}

/// Bumps a shared counter every time a value is dropped.
#[derive(Clone, Debug)]
pub struct DropCounter {
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new(drops: &Rc<Cell<usize>>) -> Self {
        DropCounter {
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl PartialEq for DropCounter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.drops, &other.drops)
    }
}

/// Registry of [`Pigeon`] addresses.
#[derive(Debug, Default)]
pub struct Loft {
    perched: RefCell<BTreeSet<usize>>,
}

impl Loft {
    pub fn new() -> Rc<Self> {
        Rc::new(Loft::default())
    }

    pub fn is_perched(&self, pigeon: *const Pigeon) -> bool {
        self.perched.borrow().contains(&(pigeon as usize))
    }

    pub fn count(&self) -> usize {
        self.perched.borrow().len()
    }
}

/// A value that records its address in a [`Loft`] on request and removes it when dropped.
///
/// Clones start out unregistered: a clone cannot know where it will finally live, so
/// registering is a separate step ([`Pigeon::perch`]) taken once the value is in place.
#[derive(Clone, Debug)]
pub struct Pigeon {
    loft: Rc<Loft>,
}

impl Pigeon {
    pub fn new(loft: &Rc<Loft>) -> Self {
        Pigeon {
            loft: Rc::clone(loft),
        }
    }

    /// Registers the pigeon's current address.
    pub fn perch(&self) {
        self.loft.perched.borrow_mut().insert(self as *const Pigeon as usize);
    }
}

impl Drop for Pigeon {
    fn drop(&mut self) {
        self.loft
            .perched
            .borrow_mut()
            .remove(&(self as *const Pigeon as usize));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alignvec::prelude::*;
    use memoffset::offset_of;
    use std::mem::{align_of, size_of};

    fn slot_zero_is_aligned<T: Clone + Default>() {
        let mut v: AlignVec<T> = AlignVec::new();
        v.append(&T::default()).unwrap();
        assert_eq!(v.as_ptr() as usize % align_of::<T>(), 0);
        for _ in 0..8 {
            v.grow().unwrap();
            assert_eq!(v.as_ptr() as usize % align_of::<T>(), 0);
        }
        assert_eq!(v.capacity(), 256);
    }

    #[test]
    fn alignment_across_reallocations() {
        slot_zero_is_aligned::<u8>();
        slot_zero_is_aligned::<f32>();
        slot_zero_is_aligned::<f64>();
        slot_zero_is_aligned::<ThreeInts>();
        slot_zero_is_aligned::<Padded>();
    }

    #[test]
    fn test_repr() {
        assert_eq!(size_of::<ThreeInts>(), 12);
        assert_eq!(align_of::<ThreeInts>(), 4);
        assert_eq!(0, offset_of!(ThreeInts, a));
        assert_eq!(4, offset_of!(ThreeInts, b));
        assert_eq!(8, offset_of!(ThreeInts, c));
        assert_eq!(size_of::<Padded>(), 16);
        assert_eq!(0, offset_of!(Padded, a));
        assert_eq!(8, offset_of!(Padded, b));
    }

    #[test]
    fn record_elements_survive_shifts() {
        let mut v: AlignVec<Padded> = AlignVec::new();
        for i in 0..5u8 {
            v.append(&Padded { a: i, b: i as f64 * 0.5 }).unwrap();
        }
        v.insert(&Padded { a: 9, b: -1.0 }, 2).unwrap();
        v.delete(0).unwrap();
        let a: Vec<u8> = v.iter().map(|p| p.a).collect();
        assert_eq!(a, [1, 9, 2, 3, 4]);
        assert_eq!(v[1].b, -1.0);
        assert_eq!(v[4].b, 2.0);

        let mut w: AlignVec<ThreeInts> = AlignVec::new();
        w.append(&ThreeInts { a: 1, b: 2, c: 3 }).unwrap();
        w.insert(&ThreeInts { a: 4, b: 5, c: 6 }, 0).unwrap();
        assert_eq!(w[0], ThreeInts { a: 4, b: 5, c: 6 });
        assert_eq!(w[1], ThreeInts { a: 1, b: 2, c: 3 });
    }

    #[test]
    fn clear_counts_each_element_once() {
        let drops = Rc::new(Cell::new(0));
        let mut v = AlignVec::with_capacity(100).unwrap();
        for _ in 0..100 {
            v.append(&DropCounter::new(&drops)).unwrap();
        }
        // Presized, so nothing relocates: only the temporaries passed to append are dropped.
        assert_eq!(drops.get(), 100);
        drops.set(0);
        v.clear();
        assert_eq!(drops.get(), 100);
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 100);
    }

    #[test]
    fn growth_drops_each_relocated_original() {
        let drops = Rc::new(Cell::new(0));
        let counter = DropCounter::new(&drops);
        let mut v = AlignVec::new();
        for _ in 0..100 {
            v.append(&counter).unwrap();
        }
        // Doubling from 1 to 128 relocates 1 + 2 + ... + 64 elements.
        assert_eq!(drops.get(), 127);
        assert_eq!(v.capacity(), 128);
    }

    #[test]
    fn dropping_the_container_drops_elements() {
        let drops = Rc::new(Cell::new(0));
        let counter = DropCounter::new(&drops);
        {
            let mut v = AlignVec::new();
            for _ in 0..10 {
                v.append(&counter).unwrap();
            }
            drops.set(0);
        }
        assert_eq!(drops.get(), 10);
    }

    #[test]
    fn growth_invalidates_registered_addresses() {
        let loft = Loft::new();
        let mut v = AlignVec::new();
        for _ in 0..16 {
            v.append(&Pigeon::new(&loft)).unwrap();
        }
        assert_eq!(loft.count(), 0);
        v.iter().for_each(Pigeon::perch);
        assert_eq!(loft.count(), 16);

        let first: *const Pigeon = &v[0];
        assert!(loft.is_perched(first));
        v.grow().unwrap();
        assert_eq!(v.capacity(), 32);
        assert!(!loft.is_perched(first));
        assert!(!loft.is_perched(&v[0]));
        assert_eq!(loft.count(), 0);
    }

    #[test]
    fn shifting_invalidates_registered_addresses() {
        let loft = Loft::new();
        let mut v = AlignVec::with_capacity(8).unwrap();
        for _ in 0..4 {
            v.append(&Pigeon::new(&loft)).unwrap();
        }
        v.iter().for_each(Pigeon::perch);
        v.insert(&Pigeon::new(&loft), 2).unwrap();
        // Slots 0 and 1 did not move; slots 2 and 3 were relocated to 3 and 4.
        assert!(loft.is_perched(&v[0]));
        assert!(loft.is_perched(&v[1]));
        assert_eq!(loft.count(), 2);
    }

    #[cfg(not(miri))]
    #[test]
    fn demos_run() {
        let t = trybuild::TestCases::new();
        t.pass("demos/*.rs");
    }
}
