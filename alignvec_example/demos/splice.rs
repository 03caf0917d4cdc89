use alignvec::{alignvec, AlignVec};

fn main() {
    let mut v: AlignVec<i32> = AlignVec::new();
    for i in 0..4 {
        v.append(&i).unwrap();
    }
    assert_eq!(v.capacity(), 4);
    v.insert(&-1, 0).unwrap();
    assert_eq!(v.as_slice(), &[-1, 0, 1, 2, 3]);
    assert_eq!(v.capacity(), 8);

    v.delete(3).unwrap();
    assert_eq!(v, alignvec![-1, 0, 1, 3]);

    v.insert_slice(1, &[7, 8, 9]).unwrap();
    assert_eq!(v.as_slice(), &[-1, 7, 8, 9, 0, 1, 3]);
    v.delete_range(0, 4).unwrap();
    assert_eq!(v.as_slice(), &[0, 1, 3]);

    assert!(v.insert(&5, 4).is_err());
    assert!(v.delete(3).is_err());
    assert_eq!(v.len(), 3);
}
