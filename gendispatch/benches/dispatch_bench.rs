//! Dispatch benchmarks using criterion.
//!
//! Benchmarks for exact-match calls, inherited calls that walk the cross
//! product, virtual ancestor resolution and `dispatch_order` on deep chains.
//!
//! Run with: cargo bench --bench dispatch_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gendispatch::{ClassHierarchy, ClassId, GenericFunction, Instance, Signature};

#[derive(Clone, Copy)]
struct Obj(ClassId);

impl Instance for Obj {
    fn class_id(&self) -> ClassId {
        self.0
    }
}

/// A single inheritance chain `C0 <- C1 <- ... <- C{depth-1}`.
fn chain(depth: usize) -> (ClassHierarchy, Vec<ClassId>) {
    let mut h = ClassHierarchy::new();
    let mut ids = Vec::with_capacity(depth);
    for i in 0..depth {
        let bases: Vec<ClassId> = ids.last().copied().into_iter().collect();
        ids.push(h.define_class(format!("C{i}"), &bases).unwrap());
    }
    (h, ids)
}

fn binary() -> GenericFunction<Obj, u32> {
    let signature = Signature::new("f", ["a", "b"]).dispatch_on(["a", "b"]).unwrap();
    GenericFunction::new(signature)
}

/// Benchmark calls resolved by the exact-match fast path
fn bench_exact_match(c: &mut Criterion) {
    let (h, ids) = chain(4);
    let mut f = binary();
    f.register(&h, &[ids[3], ids[3]], |_| Ok(1)).unwrap();
    let args = [Obj(ids[3]), Obj(ids[3])];

    c.bench_function("exact_match", |b| {
        b.iter(|| black_box(f.call(&h, black_box(&args)).unwrap()))
    });
}

/// Benchmark calls that walk up the precedence lists
fn bench_inherited(c: &mut Criterion) {
    let mut group = c.benchmark_group("inherited");

    for depth in [2usize, 8, 32] {
        let (h, ids) = chain(depth);
        let mut f = binary();
        f.register(&h, &[ids[0], ids[0]], |_| Ok(0)).unwrap();
        let leaf = ids[depth - 1];
        let args = [Obj(leaf), Obj(leaf)];

        group.bench_with_input(BenchmarkId::from_parameter(depth), &args, |b, args| {
            b.iter(|| black_box(f.call(&h, args).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark resolution through a virtual ancestor
fn bench_virtual_ancestor(c: &mut Criterion) {
    let mut h = ClassHierarchy::new();
    let sized = h.define("Sized", &[]).unwrap();
    let iterable = h.define("Iterable", &[]).unwrap();
    h.define("Set", &["Sized", "Iterable"]).unwrap();
    let list = h.define("List", &["Iterable"]).unwrap();
    h.register_virtual(sized, list).unwrap();

    let signature = Signature::new("len", ["obj"]).dispatch_on(["obj"]).unwrap();
    let mut f = GenericFunction::<Obj, u32>::new(signature);
    f.register(&h, &[sized], |_| Ok(0)).unwrap();
    f.register(&h, &[iterable], |_| Ok(1)).unwrap();
    f.register_named(&h, &["Set"], |_| Ok(2)).unwrap();
    let args = [Obj(list)];

    c.bench_function("virtual_ancestor", |b| {
        b.iter(|| black_box(f.call(&h, black_box(&args)).unwrap()))
    });
}

/// Benchmark computing the full walk
fn bench_dispatch_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_order");

    for depth in [4usize, 16] {
        let (h, ids) = chain(depth);
        let f = binary();
        let leaf = ids[depth - 1];

        group.bench_with_input(BenchmarkId::from_parameter(depth), &[leaf, leaf], |b, types| {
            b.iter(|| black_box(f.dispatch_order(&h, types).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_exact_match,
    bench_inherited,
    bench_virtual_ancestor,
    bench_dispatch_order,
);
criterion_main!(benches);
