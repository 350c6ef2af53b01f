use avl_set::Set;

use std::collections::{BTreeSet, HashSet};

use quickcheck_macros::quickcheck;

use crate::Op;

/// Applies a set of operations to a `Set` and a `BTreeSet`.
/// This way we can ensure that after a random smattering of inserts
/// and erases we have the same values in both.
fn do_ops<T>(ops: &[Op<T>], set: &mut Set<T>, reference: &mut BTreeSet<T>)
where
    T: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(v) => {
                set.insert(v.clone());
                reference.insert(v.clone());
            }
            Op::Erase(v) => {
                set.erase(v);
                reference.remove(v);
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut set = Set::new();
    let mut reference = BTreeSet::new();

    do_ops(&ops, &mut set, &mut reference);
    set.len() == reference.len() && set.iter().eq(reference.iter())
}

#[quickcheck]
fn height_stays_logarithmic(ops: Vec<Op<i16>>) -> bool {
    let mut set = Set::new();
    let mut reference = BTreeSet::new();

    do_ops(&ops, &mut set, &mut reference);
    // An AVL tree with `n` nodes is less than `1.45 * lg(n + 2)` levels tall.
    let bound = 1.45 * ((set.len() + 2) as f64).log2();
    (set.height() as f64) < bound
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let set: Set<i8> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| set.find(x) == set.end())
}

#[quickcheck]
fn with_erasures(xs: Vec<i8>, erases: Vec<i8>) -> bool {
    let mut set: Set<i8> = xs.iter().copied().collect();
    for erase in &erases {
        set.erase(erase);
    }

    let still_present: Vec<_> = xs.iter().filter(|x| !erases.contains(x)).collect();

    erases.iter().all(|x| set.find(x).is_end())
        && still_present.iter().all(|x| set.find(x).get() == Some(*x))
}

#[quickcheck]
fn iteration_is_strictly_increasing(xs: Vec<i32>) -> bool {
    let set: Set<i32> = xs.into_iter().collect();
    let values: Vec<_> = set.iter().collect();

    values.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn clones_are_independent(xs: Vec<i8>, extra: i8) -> bool {
    let original: Set<i8> = xs.iter().copied().collect();
    let before: Vec<_> = original.iter().copied().collect();

    let mut copy = original.clone();
    copy.insert(extra);
    if let Some(first) = xs.first() {
        copy.erase(first);
    }

    original.iter().copied().eq(before.iter().copied()) && original.len() == before.len()
}
