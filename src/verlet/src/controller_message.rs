use crate::topology::{ParticleRef, Shape};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
	Z,
}

impl Axis {
	pub fn index(self) -> usize {
		match self {
			Axis::X => 0,
			Axis::Y => 1,
			Axis::Z => 2,
		}
	}
}

/// Requests from an input/UI layer, applied with `Topology::apply` between
/// steps.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerMessage {
	SetForce([f32; 3]),
	SetForceAxis(Axis, f32),
	ToggleLock(ParticleRef),
	SetRestLength(f32),
	SetIterations(usize),
	SetUseShear(bool),
	Resize(Shape),
	Rebuild(Shape, f32),
}
