use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rallie_homography::{
    compute_homography, find_homography_ransac, project_point, project_points, DltParams,
    HomographyMatrix, RansacParams,
};

fn synthetic_correspondences(num_points: usize) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    let h = HomographyMatrix::new([[1.1, 0.05, 40.0], [-0.03, 0.95, 25.0], [2.0e-4, 1.0e-4, 1.0]]);
    let side = (num_points as f64).sqrt().ceil() as usize;
    let src: Vec<[f64; 2]> = (0..num_points)
        .map(|i| [(i % side) as f64 * 10.0, (i / side) as f64 * 10.0])
        .collect();
    let mut dst = project_points(&src, &h).unwrap();
    // corrupt every fifth correspondence
    for p in dst.iter_mut().step_by(5) {
        p[0] += 50.0;
    }
    (src, dst)
}

fn bench_compute_homography(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_homography");

    for num_points in [4, 16, 64, 256].iter() {
        let h = HomographyMatrix::new([[0.9, -0.1, 3.0], [0.1, 1.1, -2.0], [1.0e-3, 0.0, 1.0]]);
        let side = (*num_points as f64).sqrt().ceil() as usize;
        let src: Vec<[f64; 2]> = (0..*num_points)
            .map(|i| [(i % side) as f64, (i / side) as f64 + 0.1 * (i % side) as f64])
            .collect();
        let dst = project_points(&src, &h).unwrap();

        group.bench_with_input(
            BenchmarkId::new("dlt", num_points),
            &(&src, &dst),
            |b, i| {
                let (src, dst) = *i;
                b.iter(|| black_box(compute_homography(src, dst)));
            },
        );
    }
    group.finish();
}

fn bench_ransac(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_homography_ransac");

    for num_points in [50, 200].iter() {
        let (src, dst) = synthetic_correspondences(*num_points);
        let params = RansacParams {
            threshold: 1.0,
            ..Default::default()
        };
        let dlt = DltParams::default();

        group.bench_with_input(
            BenchmarkId::new("ransac", num_points),
            &(&src, &dst),
            |b, i| {
                let (src, dst) = *i;
                b.iter(|| black_box(find_homography_ransac(src, dst, &params, &dlt)));
            },
        );
    }
    group.finish();
}

fn bench_project_point(c: &mut Criterion) {
    let h = HomographyMatrix::new([[0.9, -0.1, 3.0], [0.1, 1.1, -2.0], [1.0e-3, 0.0, 1.0]]);
    c.bench_function("project_point", |b| {
        b.iter(|| black_box(project_point(black_box(&[120.0, 45.0]), &h)));
    });
}

criterion_group!(
    benches,
    bench_compute_homography,
    bench_ransac,
    bench_project_point
);
criterion_main!(benches);
