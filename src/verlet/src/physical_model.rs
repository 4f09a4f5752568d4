use std::f32::consts::SQRT_2;

use crate::constraint::DistanceConstraint;
use crate::error::{Result, VerletError};
use crate::particle::Particle;
use crate::topology::ParticleRef;
use crate::V3;

pub const MIN_POINTS: usize = 2;

fn check_count(what: &'static str, got: usize) -> Result<()> {
	if got < MIN_POINTS {
		return Err(VerletError::InvalidTopology { what, got });
	}
	Ok(())
}

/// Model with storage reserved up front. Counts that overflow or cannot be
/// allocated are reported as an invalid topology instead of panicking.
fn reserved(
	what: &'static str,
	got: usize,
	particles: Option<usize>,
	constraints: Option<usize>,
) -> Result<PhysicalModel> {
	let invalid = VerletError::InvalidTopology { what, got };
	let (particles, constraints) = match (particles, constraints) {
		(Some(p), Some(c)) => (p, c),
		_ => return Err(invalid),
	};
	let mut model = PhysicalModel::default();
	model
		.particles
		.try_reserve_exact(particles)
		.map_err(|_| invalid.clone())?;
	model
		.constraints
		.try_reserve_exact(constraints)
		.map_err(|_| invalid)?;
	Ok(model)
}

pub(crate) fn check_length(l: f32) -> Result<()> {
	if !l.is_finite() || l <= 0.0 {
		return Err(VerletError::InvalidLength(l));
	}
	Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelaxStats {
	pub relaxed: usize,
	pub degenerate: usize,
}

/// Particle arena plus the constraints indexing into it.
#[derive(Clone, Debug, Default)]
pub struct PhysicalModel {
	pub(crate) particles: Vec<Particle>,
	pub(crate) constraints: Vec<DistanceConstraint>,
}

impl PhysicalModel {
	pub fn add_particle(
		&mut self,
		mass: f32,
		pos: V3,
		force: V3,
		locked: bool,
	) -> Result<usize> {
		if !mass.is_finite() || mass <= 0.0 {
			return Err(VerletError::InvalidMass(mass));
		}
		let id = self.particles.len();
		self.particles.push(Particle::new(id, mass, pos, force, locked));
		Ok(id)
	}

	pub fn add_constraint(&mut self, c: DistanceConstraint) -> Result<usize> {
		let len = self.particles.len();
		for idx in c.ids() {
			if idx >= len {
				return Err(VerletError::IndexOutOfRange {
					reference: ParticleRef::Index(idx),
					len,
				});
			}
		}
		if c.a == c.b {
			return Err(VerletError::DegenerateConstraint { a: c.a, b: c.b });
		}
		check_length(c.l0)?;
		self.constraints.push(c);
		Ok(self.constraints.len() - 1)
	}

	/// Chain of `points` particles on a descending diagonal, `bar_length`
	/// apart along each axis. Particle 0 is locked.
	pub fn new_rope(points: usize, bar_length: f32, force: V3) -> Result<Self> {
		check_count("rope points", points)?;
		check_length(bar_length)?;
		let origin = V3::new(-10., 0., 0.);
		let mut model =
			reserved("rope points", points, Some(points), Some(points - 1))?;
		for idx in 0..points {
			let pos = V3::new(
				idx as f32 * bar_length,
				idx as f32 * -bar_length,
				0.,
			) + origin;
			model.add_particle(1.0, pos, force, idx == 0)?;
		}
		for idx in 1..points {
			model.add_constraint(DistanceConstraint::new(
				idx - 1,
				idx,
				bar_length,
			))?;
		}
		Ok(model)
	}

	/// `rows` x `cols` grid; particle (r, c) has index `r * cols + c`.
	/// Every 4th particle of row 0 is locked.
	pub fn new_cloth(
		rows: usize,
		cols: usize,
		bar_length: f32,
		force: V3,
	) -> Result<Self> {
		check_count("cloth rows", rows)?;
		check_count("cloth cols", cols)?;
		check_length(bar_length)?;
		let diag = bar_length * SQRT_2;
		let idx = |r: usize, c: usize| r * cols + c;
		let particles = rows.checked_mul(cols);
		// r(c-1) + c(r-1) + 2(r-1)(c-1)
		let constraints = (|| {
			let horizontal = rows.checked_mul(cols - 1)?;
			let vertical = cols.checked_mul(rows - 1)?;
			let shear = (rows - 1).checked_mul(cols - 1)?.checked_mul(2)?;
			horizontal.checked_add(vertical)?.checked_add(shear)
		})();
		let mut model =
			reserved("cloth rows x cols", rows, particles, constraints)?;
		for r in 0..rows {
			for c in 0..cols {
				let pos =
					V3::new(r as f32 * bar_length, c as f32 * -bar_length, 0.);
				model.add_particle(1.0, pos, force, r == 0 && c % 4 == 0)?;
			}
		}
		// per cell: right, lower-left shear, down, lower-right shear
		for r in 0..rows {
			for c in 0..cols {
				let last_row = r == rows - 1;
				let last_col = c == cols - 1;
				if !last_col {
					model.add_constraint(DistanceConstraint::new(
						idx(r, c),
						idx(r, c + 1),
						bar_length,
					))?;
				}
				if c != 0 && !last_row {
					model.add_constraint(DistanceConstraint::new_shear(
						idx(r, c),
						idx(r + 1, c - 1),
						diag,
					))?;
				}
				if !last_row {
					model.add_constraint(DistanceConstraint::new(
						idx(r, c),
						idx(r + 1, c),
						bar_length,
					))?;
				}
				if !last_col && !last_row {
					model.add_constraint(DistanceConstraint::new_shear(
						idx(r, c),
						idx(r + 1, c + 1),
						diag,
					))?;
				}
			}
		}
		Ok(model)
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn constraints(&self) -> &[DistanceConstraint] {
		&self.constraints
	}

	pub fn integrate(&mut self, dt: f32) {
		for p in self.particles.iter_mut() {
			p.update(dt);
		}
	}

	/// Gauss-Seidel passes in declaration order: each constraint sees the
	/// corrections made by the ones before it in the same pass.
	pub fn relax(&mut self, iterations: usize, use_shear: bool) -> RelaxStats {
		let mut stats = RelaxStats::default();
		for _ in 0..iterations {
			for c in self.constraints.iter() {
				if c.shear && !use_shear {
					continue;
				}
				stats.relaxed += 1;
				if !c.relax(&mut self.particles) {
					stats.degenerate += 1;
				}
			}
		}
		stats
	}

	/// Constraint-only relaxation over every constraint, shear included.
	/// Ends with the particles at rest. Returns the remaining residual;
	/// convergence is best effort.
	pub fn settle(&mut self, iterations: usize) -> f32 {
		self.relax(iterations, true);
		for p in self.particles.iter_mut() {
			p.rest();
		}
		self.residual(true)
	}

	/// Largest `|length - l0|` over the constraints.
	pub fn residual(&self, include_shear: bool) -> f32 {
		self.constraints
			.iter()
			.filter(|c| include_shear || !c.shear)
			.map(|c| (c.length(&self.particles) - c.l0).abs())
			.fold(0f32, f32::max)
	}

	pub fn set_force(&mut self, force: V3) {
		for p in self.particles.iter_mut() {
			p.force = force;
		}
	}

	pub fn set_rest_length(&mut self, bar_length: f32) -> Result<()> {
		check_length(bar_length)?;
		for c in self.constraints.iter_mut() {
			c.l0 = if c.shear { bar_length * SQRT_2 } else { bar_length };
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn cloth_count(r: usize, c: usize) -> usize {
		r * (c - 1) + c * (r - 1) + 2 * (r - 1) * (c - 1)
	}

	#[test]
	fn test_rope_shape() {
		let m = PhysicalModel::new_rope(5, 4.0, V3::zeros()).unwrap();
		assert_eq!(m.particles().len(), 5);
		assert_eq!(m.constraints().len(), 4);
		assert!(m.particles()[0].is_locked());
		assert!(m.particles()[1..].iter().all(|p| !p.is_locked()));
		assert_eq!(m.particles()[2].get_pos(), V3::new(-2., -8., 0.));
		for (i, c) in m.constraints().iter().enumerate() {
			assert_eq!(c.ids(), [i, i + 1]);
			assert!(!c.is_shear());
		}
	}

	#[test]
	fn test_cloth_shape() {
		for (r, c) in [(2, 2), (3, 4), (4, 3), (5, 9)] {
			let m = PhysicalModel::new_cloth(r, c, 0.5, V3::zeros()).unwrap();
			assert_eq!(m.particles().len(), r * c);
			assert_eq!(m.constraints().len(), cloth_count(r, c));
			let shear = m.constraints().iter().filter(|x| x.is_shear()).count();
			assert_eq!(shear, 2 * (r - 1) * (c - 1));
		}
	}

	#[test]
	fn test_cloth_declaration_order() {
		let m = PhysicalModel::new_cloth(2, 2, 1.0, V3::zeros()).unwrap();
		let ids: Vec<_> = m.constraints().iter().map(|c| c.ids()).collect();
		// (0,0): right, down, lower-right
		// (0,1): lower-left, down
		// (1,0): right
		assert_eq!(ids, vec![[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]]);
		assert!(m.constraints()[2].is_shear());
		assert!(m.constraints()[3].is_shear());
		assert_eq!(m.constraints()[2].get_l0(), SQRT_2);
	}

	#[test]
	fn test_cloth_lock_pattern() {
		let m = PhysicalModel::new_cloth(3, 10, 1.0, V3::zeros()).unwrap();
		let locked: Vec<_> = m
			.particles()
			.iter()
			.filter(|p| p.is_locked())
			.map(|p| p.get_id())
			.collect();
		assert_eq!(locked, vec![0, 4, 8]);
	}

	#[test]
	fn test_invalid_counts() {
		assert_eq!(
			PhysicalModel::new_rope(1, 1.0, V3::zeros()).unwrap_err(),
			VerletError::InvalidTopology {
				what: "rope points",
				got: 1
			}
		);
		assert!(PhysicalModel::new_cloth(1, 5, 1.0, V3::zeros()).is_err());
		assert!(PhysicalModel::new_cloth(5, 0, 1.0, V3::zeros()).is_err());
		assert_eq!(
			PhysicalModel::new_rope(3, -1.0, V3::zeros()).unwrap_err(),
			VerletError::InvalidLength(-1.0)
		);
	}

	#[test]
	fn test_oversized_counts() {
		assert!(matches!(
			PhysicalModel::new_cloth(usize::MAX, 2, 1.0, V3::zeros()),
			Err(VerletError::InvalidTopology { .. })
		));
		assert!(matches!(
			PhysicalModel::new_cloth(1 << 40, 1 << 40, 1.0, V3::zeros()),
			Err(VerletError::InvalidTopology { .. })
		));
		assert!(matches!(
			PhysicalModel::new_rope(usize::MAX, 1.0, V3::zeros()),
			Err(VerletError::InvalidTopology { .. })
		));
	}

	#[test]
	fn test_add_constraint_checks() {
		let mut m = PhysicalModel::default();
		m.add_particle(1.0, V3::zeros(), V3::zeros(), false).unwrap();
		assert!(matches!(
			m.add_constraint(DistanceConstraint::new(0, 1, 1.0)),
			Err(VerletError::IndexOutOfRange { len: 1, .. })
		));
		assert_eq!(
			m.add_constraint(DistanceConstraint::new(0, 0, 1.0)),
			Err(VerletError::DegenerateConstraint { a: 0, b: 0 })
		);
		assert_eq!(
			m.add_particle(0.0, V3::zeros(), V3::zeros(), false),
			Err(VerletError::InvalidMass(0.0))
		);
		assert!(m.constraints().is_empty());
	}

	#[test]
	fn test_relax_skips_shear() {
		let mut m = PhysicalModel::new_cloth(3, 3, 1.0, V3::zeros()).unwrap();
		let all = m.constraints().len();
		let shear = m.constraints().iter().filter(|c| c.is_shear()).count();
		assert_eq!(m.relax(2, true).relaxed, 2 * all);
		assert_eq!(m.relax(2, false).relaxed, 2 * (all - shear));
	}

	#[test]
	fn test_settle_rests_particles() {
		let mut m = PhysicalModel::new_rope(3, 2.0, V3::zeros()).unwrap();
		let residual = m.settle(100);
		assert!(residual < 1e-4, "residual {}", residual);
		for p in m.particles() {
			assert_eq!(p.get_pos(), p.get_ppos());
		}
	}

	#[test]
	fn test_coincident_particles_stay_finite() {
		let mut m = PhysicalModel::default();
		let p = V3::new(1., 1., 1.);
		m.add_particle(1.0, p, V3::zeros(), false).unwrap();
		m.add_particle(1.0, p, V3::zeros(), false).unwrap();
		m.add_constraint(DistanceConstraint::new(0, 1, 2.0)).unwrap();
		let stats = m.relax(1, true);
		assert_eq!(stats.degenerate, 1);
		for p in m.particles() {
			assert!(p.get_pos().iter().all(|x| !x.is_nan()));
		}
		assert!((m.residual(true)).abs() < 1e-6);
	}

	#[test]
	fn test_set_rest_length() {
		let mut m = PhysicalModel::new_cloth(3, 3, 1.0, V3::zeros()).unwrap();
		m.set_rest_length(2.0).unwrap();
		for c in m.constraints() {
			let want = if c.is_shear() { 2.0 * SQRT_2 } else { 2.0 };
			assert_eq!(c.get_l0(), want);
		}
		assert!(m.set_rest_length(f32::NAN).is_err());
	}
}
