// pr_model: Physical model for rendering
//
// Owned snapshots copied out of a topology. A renderer or picking layer reads
// these every frame; writes go back through the simulation's mutators only.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrParticle {
	pub id: usize,
	pub name: String,
	pub pos: [f32; 3],
	pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrConstraint {
	pub id: usize,
	pub particles: [usize; 2],
	pub l0: f32,
	pub shear: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrModel {
	pub particles: Vec<PrParticle>,
	pub constraints: Vec<PrConstraint>,
}

impl PrModel {
	/// Line segments as endpoint position pairs, in constraint order.
	pub fn segments(&self) -> impl Iterator<Item = ([f32; 3], [f32; 3])> + '_ {
		self.constraints.iter().map(move |c| {
			(
				self.particles[c.particles[0]].pos,
				self.particles[c.particles[1]].pos,
			)
		})
	}

	pub fn locked(&self) -> impl Iterator<Item = &PrParticle> {
		self.particles.iter().filter(|p| p.locked)
	}
}
