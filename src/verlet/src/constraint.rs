use crate::error::{Result, VerletError};
use crate::particle::Particle;
use crate::V3;
use protocol::pr_model::PrConstraint;

/// Below this separation the endpoint direction is considered undefined.
pub const DEGENERATE_EPS: f32 = 1e-6;

/// Direction used when two endpoints coincide.
pub fn fallback_axis() -> V3 {
	V3::x()
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistanceConstraint {
	pub(crate) a: usize,
	pub(crate) b: usize,
	pub(crate) l0: f32,
	pub(crate) shear: bool,
}

impl DistanceConstraint {
	pub fn new(a: usize, b: usize, l0: f32) -> Self {
		Self {
			a,
			b,
			l0,
			shear: false,
		}
	}

	pub fn new_shear(a: usize, b: usize, l0: f32) -> Self {
		Self {
			shear: true,
			..Self::new(a, b, l0)
		}
	}

	pub fn ids(&self) -> [usize; 2] {
		[self.a, self.b]
	}

	pub fn get_l0(&self) -> f32 {
		self.l0
	}

	pub fn is_shear(&self) -> bool {
		self.shear
	}

	pub fn length(&self, particles: &[Particle]) -> f32 {
		(particles[self.a].pos - particles[self.b].pos).magnitude()
	}

	/// Unit vector from `b` towards `a`.
	pub fn direction(&self, particles: &[Particle]) -> Result<V3> {
		let dp = particles[self.a].pos - particles[self.b].pos;
		dp.try_normalize(DEGENERATE_EPS)
			.ok_or(VerletError::DegenerateConstraint {
				a: self.a,
				b: self.b,
			})
	}

	/// Places both endpoints `l0` apart around their midpoint. Locked
	/// endpoints stay put. Returns false when the fallback axis was used.
	pub fn relax(&self, particles: &mut [Particle]) -> bool {
		let center = (particles[self.a].pos + particles[self.b].pos) / 2.0;
		let (dir, ok) = match self.direction(particles) {
			Ok(dir) => (dir, true),
			Err(e) => {
				tracing::trace!("{}, using fallback axis", e);
				(fallback_axis(), false)
			}
		};
		particles[self.a].set_pos(center + dir * self.l0 / 2.0);
		particles[self.b].set_pos(center - dir * self.l0 / 2.0);
		ok
	}

	pub fn render(&self, id: usize) -> PrConstraint {
		PrConstraint {
			id,
			particles: self.ids(),
			l0: self.l0,
			shear: self.shear,
		}
	}
}
