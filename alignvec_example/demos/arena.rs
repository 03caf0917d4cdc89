use alignvec::AlignVec;
use alignvec_example::Padded;
use bumpalo::Bump;

fn main() {
    let arena = Bump::new();
    let mut v = AlignVec::new_in(&arena);
    for i in 0..20u8 {
        v.append(&Padded { a: i, b: f64::from(i) }).unwrap();
        assert_eq!(v.as_ptr() as usize % std::mem::align_of::<Padded>(), 0);
    }
    assert_eq!(v.capacity(), 32);
    assert_eq!(v[19].b, 19.0);
    v.delete(0).unwrap();
    assert_eq!(v.first().map(|p| p.a), Some(1));
}
