use crate::V3;
use protocol::pr_model::PrParticle;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	pub(crate) id: usize,
	pub(crate) mass: f32,
	pub(crate) pos: V3,
	pub(crate) ppos: V3,
	// persistent field, re-applied every step and never cleared
	pub(crate) force: V3,
	pub(crate) locked: bool,
}

impl Particle {
	pub fn new(id: usize, mass: f32, pos: V3, force: V3, locked: bool) -> Self {
		Self {
			id,
			mass,
			pos,
			ppos: pos,
			force,
			locked,
		}
	}

	pub fn get_id(&self) -> usize {
		self.id
	}

	pub fn get_pos(&self) -> V3 {
		self.pos
	}

	pub fn get_ppos(&self) -> V3 {
		self.ppos
	}

	pub fn get_mass(&self) -> f32 {
		self.mass
	}

	pub fn get_force(&self) -> V3 {
		self.force
	}

	pub fn is_locked(&self) -> bool {
		self.locked
	}

	pub(crate) fn toggle_lock(&mut self) -> bool {
		self.locked = !self.locked;
		self.locked
	}

	/// Moves an unlocked particle, leaving the implicit velocity alone.
	pub(crate) fn set_pos(&mut self, p: V3) {
		if !self.locked {
			self.pos = p;
		}
	}

	/// Drops the implicit velocity.
	pub(crate) fn rest(&mut self) {
		self.ppos = self.pos;
	}

	/// Verlet step: `pos + (pos - ppos) + dt^2 / mass * force`.
	pub fn update(&mut self, dt: f32) {
		if self.locked {
			return;
		}
		let velocity = self.pos - self.ppos;
		let next = self.pos + velocity + (dt * dt / self.mass) * self.force;
		self.ppos = self.pos;
		self.pos = next;
	}

	pub fn render(&self, name: String) -> PrParticle {
		PrParticle {
			id: self.id,
			name,
			pos: [self.pos[0], self.pos[1], self.pos[2]],
			locked: self.locked,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_update_constant_force() {
		let force = V3::new(0., -4., 0.);
		let mut p = Particle::new(0, 2.0, V3::zeros(), force, false);
		p.update(0.5);
		// dt^2 / m * f = 0.25 / 2 * -4
		assert_eq!(p.get_pos(), V3::new(0., -0.5, 0.));
		assert_eq!(p.get_ppos(), V3::zeros());
		p.update(0.5);
		assert_eq!(p.get_pos(), V3::new(0., -1.5, 0.));
		// force is not consumed
		assert_eq!(p.get_force(), V3::new(0., -4., 0.));
	}

	#[test]
	fn test_update_keeps_velocity() {
		let pos = V3::new(1., 0., 0.);
		let mut p = Particle::new(0, 1.0, pos, V3::zeros(), false);
		p.ppos = V3::zeros();
		p.update(0.016);
		assert_eq!(p.get_pos(), V3::new(2., 0., 0.));
		assert_eq!(p.get_ppos(), V3::new(1., 0., 0.));
	}

	#[test]
	fn test_locked_is_frozen() {
		let pos = V3::new(1., 2., 3.);
		let force = V3::new(0., -15., 0.);
		let mut p = Particle::new(3, 1.0, pos, force, true);
		p.ppos = V3::new(0., 2., 3.);
		p.update(0.016);
		p.set_pos(V3::zeros());
		assert_eq!(p.get_pos(), V3::new(1., 2., 3.));
		assert_eq!(p.get_ppos(), V3::new(0., 2., 3.));
	}
}
