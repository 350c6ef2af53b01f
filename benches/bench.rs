use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use avl_set::Set;

#[derive(Clone)]
enum SetEnum<T: Ord> {
    Avl(Set<T>),
    Std(BTreeSet<T>),
}

impl<T> SetEnum<T>
where
    T: Ord,
{
    fn find(&self, value: &T) -> Option<&T> {
        match self {
            Self::Avl(s) => s.find(value).get(),
            Self::Std(s) => s.get(value),
        }
    }

    fn lower_bound(&self, value: &T) -> Option<&T> {
        match self {
            Self::Avl(s) => s.lower_bound(value).get(),
            Self::Std(s) => s.range(value..).next(),
        }
    }

    fn insert(&mut self, value: T) {
        match self {
            Self::Avl(s) => {
                s.insert(value);
            }
            Self::Std(s) => {
                s.insert(value);
            }
        }
    }

    fn erase(&mut self, value: &T) {
        match self {
            Self::Avl(s) => {
                s.erase(value);
            }
            Self::Std(s) => {
                s.remove(value);
            }
        }
    }
}

/// Helper to bench a function on a set.
/// It creates a group for the given name and closure and runs tests for various sizes and
/// implementations of sets before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut SetEnum<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_set = num_nodes as i32 - 1;

        let set_tests = [
            ("avl", SetEnum::Avl((0..num_nodes as i32).collect())),
            ("btree", SetEnum::Std((0..num_nodes as i32).collect())),
        ];
        for (name, set) in set_tests {
            let id = BenchmarkId::new(name, largest_element_in_set);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut set = black_box(set.clone());
                        let instant = std::time::Instant::now();
                        f(&mut set, black_box(largest_element_in_set));
                        let elapsed = instant.elapsed();
                        time += elapsed;
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |set, i| {
        let _value = black_box(set.find(&i));
    });
    bench_helper(c, "lower_bound", |set, i| {
        let _value = black_box(set.lower_bound(&(i / 2)));
    });
    bench_helper(c, "erase", |set, i| {
        set.erase(&i);
    });

    bench_helper(c, "insert", |set, i| {
        set.insert(i + 1);
    });

    bench_helper(c, "find-miss", |set, i| {
        let _value = black_box(set.find(&(i + 1)));
    });
    bench_helper(c, "lower_bound-miss", |set, i| {
        let _value = black_box(set.lower_bound(&(i + 1)));
    });
    bench_helper(c, "erase-miss", |set, i| {
        set.erase(&(i + 1));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
