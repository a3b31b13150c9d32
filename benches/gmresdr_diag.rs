use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gmresdr::{BackendKind, DiagonalOperator, GmresDrOptions, GmresDrSolver, LocalSpace};
use num_complex::Complex64 as C64;

fn bench_diag(c: &mut Criterion) {
    let n = 2000;
    let op = DiagonalOperator::linear_spectrum(n);
    let b: Vec<C64> = (0..n).map(|i| C64::new((i as f64).sin(), (i as f64).cos())).collect();

    let mut group = c.benchmark_group("gmresdr diag(1..n)");
    for backend in [BackendKind::Host, BackendKind::Threaded] {
        let opts = GmresDrOptions::new(40, 10)
            .with_tol(1e-8)
            .with_max_cycles(100)
            .with_backend(backend);
        let Ok(mut solver) = GmresDrSolver::new(opts) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(format!("{backend:?}")), &b, |ben, b| {
            ben.iter(|| {
                let mut x = vec![C64::new(0.0, 0.0); n];
                let _stats = solver
                    .solve(black_box(&op), &LocalSpace::new(), black_box(b), &mut x)
                    .unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diag);
criterion_main!(benches);
