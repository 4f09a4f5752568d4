use criterion::{black_box, criterion_group, criterion_main, Criterion};
use verlet::Topology;

fn bench_rope(c: &mut Criterion) {
	c.bench_function("rope_5_points_20_iterations_60_steps", |b| {
		b.iter(|| {
			let mut rope = Topology::new_rope(5, 20, 4.0).unwrap();
			for _ in 0..60 {
				black_box(rope.step(1.0 / 60.0));
			}
			rope.residual(false)
		});
	});
}

fn bench_cloth(c: &mut Criterion) {
	let mut cloth = Topology::new_cloth(34, 34, 5, 0.3).unwrap();
	c.bench_function("cloth_34x34_5_iterations_step", |b| {
		b.iter(|| black_box(cloth.step(1.0 / 60.0)));
	});
	let mut cloth = Topology::new_cloth(34, 34, 5, 0.3)
		.unwrap()
		.with_shear(false);
	c.bench_function("cloth_34x34_5_iterations_step_no_shear", |b| {
		b.iter(|| black_box(cloth.step(1.0 / 60.0)));
	});
}

fn bench_build(c: &mut Criterion) {
	c.bench_function("cloth_34x34_build_and_settle", |b| {
		b.iter(|| {
			Topology::new_cloth(black_box(34), black_box(34), 5, 0.3).unwrap()
		});
	});
}

criterion_group!(benches, bench_rope, bench_cloth, bench_build);
criterion_main!(benches);
