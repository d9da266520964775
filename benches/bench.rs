use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use std::collections::BTreeSet;

use avl::Tree;

#[derive(Clone)]
enum SetEnum<K> {
    Avl(Tree<K>),
    Std(BTreeSet<K>),
}

impl<K> SetEnum<K>
where
    K: Ord,
{
    fn contains(&self, k: &K) -> bool {
        match self {
            Self::Avl(t) => t.contains(k),
            Self::Std(s) => s.contains(k),
        }
    }

    fn insert(&mut self, k: K) {
        match self {
            Self::Avl(t) => {
                t.insert(k);
            }
            Self::Std(s) => {
                s.insert(k);
            }
        }
    }

    fn remove(&mut self, k: &K) {
        match self {
            Self::Avl(t) => {
                t.remove(k);
            }
            Self::Std(s) => {
                s.remove(k);
            }
        }
    }
}

/// Helper to bench a function on a set.
/// It creates a group for the given name and closure and runs tests for various sizes and
/// implementations of ordered sets before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut SetEnum<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_tree = num_nodes - 1;

        let avl_tree: Tree<i32> = (0..num_nodes as i32).collect();
        let btree_set: BTreeSet<i32> = (0..num_nodes as i32).collect();
        let set_tests = [
            ("avl", SetEnum::Avl(avl_tree)),
            ("btree_set", SetEnum::Std(btree_set)),
        ];
        for (name, set) in set_tests {
            let id = BenchmarkId::new(name, largest_element_in_tree);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let mut set = black_box(set.clone());
                        let instant = std::time::Instant::now();
                        f(&mut set, black_box(largest_element_in_tree as i32));
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
    bench_helper(c, "contains", |set, i| {
        let _found = black_box(set.contains(&i));
    });
    bench_helper(c, "remove", |set, i| {
        set.remove(&i);
    });

    bench_helper(c, "insert", |set, i| {
        set.insert(i + 1);
    });

    bench_helper(c, "contains-miss", |set, i| {
        let _found = black_box(set.contains(&(i + 1)));
    });
    bench_helper(c, "remove-miss", |set, i| {
        set.remove(&(i + 1));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
