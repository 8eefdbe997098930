// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark for repeated Chaikin3D passes on a cube.
//!
//! Run with: cargo bench -p chaikin3d-topology --bench chaikin

use chaikin3d_topology::Polyhedron;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const CUBE_VERTICES: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

fn subdivided_cube(generations: usize) -> Polyhedron {
    let mut poly = Polyhedron::from_vertex_lists(&CUBE_VERTICES, &CUBE_FACES).expect("valid cube");
    for _ in 0..generations {
        poly = poly.chaikin3d(4).expect("closed mesh");
    }
    poly
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("from_vertex_lists/cube", |b| {
        b.iter(|| Polyhedron::from_vertex_lists(black_box(&CUBE_VERTICES), black_box(&CUBE_FACES)))
    });
}

fn bench_chaikin(c: &mut Criterion) {
    let mut group = c.benchmark_group("chaikin3d");

    for generations in 0..4 {
        let input = subdivided_cube(generations);
        group.throughput(Throughput::Elements(input.node_count() as u64));
        group.bench_with_input(
            BenchmarkId::new("cube", generations),
            &input,
            |b, input| b.iter(|| input.clone().chaikin3d(black_box(4)).expect("closed mesh")),
        );
    }

    group.finish();
}

fn bench_triangles(c: &mut Criterion) {
    let poly = subdivided_cube(3);
    c.bench_function("render_data/cube3", |b| {
        b.iter(|| black_box(&poly).render_data().expect("valid mesh"))
    });
}

criterion_group!(benches, bench_construction, bench_chaikin, bench_triangles);
criterion_main!(benches);
