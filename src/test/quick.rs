use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// a set in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<T> {
    /// Insert the value into the set
    Insert(T),
    /// Erase the value from the set
    Erase(T),
    /// Look the value up
    Find(T),
    /// Look up the first value not less than this one
    LowerBound(T),
    /// Compare iterators
    Iter,
    /// Compare reversed iterators
    IterBack,
}

impl<T> Arbitrary for Op<T>
where
    T: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        // Inserts are weighted up so the set actually grows.
        match g.choose(&[0, 0, 0, 1, 1, 2, 3, 4, 5]).unwrap() {
            0 => Op::Insert(T::arbitrary(g)),
            1 => Op::Erase(T::arbitrary(g)),
            2 => Op::Find(T::arbitrary(g)),
            3 => Op::LowerBound(T::arbitrary(g)),
            4 => Op::Iter,
            5 => Op::IterBack,
            _ => unreachable!(),
        }
    }
}
