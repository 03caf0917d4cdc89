use alignvec::AlignVec;
use alignvec_example::{Loft, Pigeon};

fn main() {
    let loft = Loft::new();
    let mut flock = AlignVec::new();
    for _ in 0..3 {
        flock.append(&Pigeon::new(&loft)).unwrap();
    }
    flock.iter().for_each(Pigeon::perch);
    assert_eq!(loft.count(), 3);

    // Growing relocates every pigeon; the originals deregister as they are dropped.
    flock.grow().unwrap();
    assert_eq!(loft.count(), 0);

    flock.iter().for_each(Pigeon::perch);
    assert_eq!(loft.count(), 3);
    drop(flock);
    assert_eq!(loft.count(), 0);
}
