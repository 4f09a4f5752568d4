use std::fmt;

use fnv::FnvHashMap;
use tracing::{debug, info, warn};

use crate::constraint::DistanceConstraint;
use crate::controller_message::{Axis, ControllerMessage};
use crate::diagnostics::{StepDiagnostics, Stopwatch};
use crate::error::{Result, VerletError};
use crate::particle::Particle;
use crate::physical_model::{check_length, PhysicalModel};
use crate::V3;
use protocol::pr_model::PrModel;

/// Settle passes run by the constructors.
pub const SETTLE_ITERATIONS: usize = 100;

/// Settle residual above `bar_length * SETTLE_TOLERANCE` is logged.
pub const SETTLE_TOLERANCE: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
	Rope { points: usize },
	Cloth { rows: usize, cols: usize },
}

impl Shape {
	pub fn len(&self) -> usize {
		match *self {
			Shape::Rope { points } => points,
			Shape::Cloth { rows, cols } => rows.saturating_mul(cols),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Starting force: gravity for ropes, gravity plus wind for cloth.
	pub fn default_force(&self) -> V3 {
		match self {
			Shape::Rope { .. } => V3::new(0., -15., 0.),
			Shape::Cloth { .. } => V3::new(165., -15., 36.),
		}
	}

	pub fn name(&self, id: usize) -> String {
		match *self {
			Shape::Rope { .. } => format!("Point {}", id),
			Shape::Cloth { cols, .. } => {
				format!("Point {}|{}", id / cols, id % cols)
			}
		}
	}

	pub fn index(&self, r: ParticleRef) -> Result<usize> {
		let len = self.len();
		let idx = match (*self, r) {
			(_, ParticleRef::Index(idx)) if idx < len => Some(idx),
			(Shape::Cloth { rows, cols }, ParticleRef::Cell { row, col })
				if row < rows && col < cols =>
			{
				Some(row * cols + col)
			}
			_ => None,
		};
		idx.ok_or(VerletError::IndexOutOfRange { reference: r, len })
	}

	fn build(&self, bar_length: f32, force: V3) -> Result<PhysicalModel> {
		match *self {
			Shape::Rope { points } => {
				PhysicalModel::new_rope(points, bar_length, force)
			}
			Shape::Cloth { rows, cols } => {
				PhysicalModel::new_cloth(rows, cols, bar_length, force)
			}
		}
	}
}

/// Addresses one particle: flat index for any shape, row/column for cloth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleRef {
	Index(usize),
	Cell { row: usize, col: usize },
}

impl fmt::Display for ParticleRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParticleRef::Index(idx) => write!(f, "#{}", idx),
			ParticleRef::Cell { row, col } => write!(f, "({}, {})", row, col),
		}
	}
}

/// A rope or cloth: the particle arena and its constraints, together with
/// the solver parameters the UI layer tweaks at runtime.
///
/// All mutation goes through `&mut self`; a topology is rebuilt as a unit and
/// never partially reshaped.
#[derive(Clone, Debug)]
pub struct Topology {
	shape: Shape,
	bar_length: f32,
	iterations: usize,
	use_shear: bool,
	settle_iterations: usize,
	force: V3,
	model: PhysicalModel,
	names: FnvHashMap<String, usize>,
}

impl Topology {
	pub fn new(
		shape: Shape,
		iterations: usize,
		bar_length: f32,
	) -> Result<Self> {
		Self::build(shape, iterations, bar_length, SETTLE_ITERATIONS)
	}

	pub fn new_rope(
		points: usize,
		iterations: usize,
		bar_length: f32,
	) -> Result<Self> {
		Self::new(Shape::Rope { points }, iterations, bar_length)
	}

	pub fn new_cloth(
		rows: usize,
		cols: usize,
		iterations: usize,
		bar_length: f32,
	) -> Result<Self> {
		Self::new(Shape::Cloth { rows, cols }, iterations, bar_length)
	}

	/// Builds the shape and settles it with `settle_iterations` passes.
	pub fn build(
		shape: Shape,
		iterations: usize,
		bar_length: f32,
		settle_iterations: usize,
	) -> Result<Self> {
		let force = shape.default_force();
		let mut result = Self {
			shape,
			bar_length,
			iterations,
			use_shear: true,
			settle_iterations,
			force,
			model: PhysicalModel::default(),
			names: FnvHashMap::default(),
		};
		result.rebuild(shape, bar_length)?;
		Ok(result)
	}

	pub fn with_force(mut self, force: V3) -> Self {
		self.set_force(force[0], force[1], force[2]);
		self
	}

	pub fn with_shear(mut self, use_shear: bool) -> Self {
		self.use_shear = use_shear;
		self
	}

	pub fn shape(&self) -> Shape {
		self.shape
	}

	pub fn bar_length(&self) -> f32 {
		self.bar_length
	}

	pub fn iterations(&self) -> usize {
		self.iterations
	}

	pub fn use_shear(&self) -> bool {
		self.use_shear
	}

	pub fn settle_iterations(&self) -> usize {
		self.settle_iterations
	}

	pub fn force(&self) -> V3 {
		self.force
	}

	pub fn particles(&self) -> &[Particle] {
		self.model.particles()
	}

	pub fn constraints(&self) -> &[DistanceConstraint] {
		self.model.constraints()
	}

	pub fn particle(&self, r: ParticleRef) -> Result<&Particle> {
		let idx = self.shape.index(r)?;
		Ok(&self.model.particles[idx])
	}

	/// Resolves a particle name such as `"Point 3"` or `"Point 1|2"`.
	pub fn find(&self, name: &str) -> Option<usize> {
		self.names.get(name).copied()
	}

	pub fn name(&self, id: usize) -> Option<String> {
		(id < self.shape.len()).then(|| self.shape.name(id))
	}

	pub fn residual(&self, include_shear: bool) -> f32 {
		self.model.residual(include_shear)
	}

	/// Integrates every unlocked particle, then relaxes the constraints
	/// `iterations` times. Shear constraints are skipped unless enabled.
	pub fn step(&mut self, dt: f32) -> StepDiagnostics {
		let sw = Stopwatch::start();
		self.model.integrate(dt);
		let stats = self.model.relax(self.iterations, self.use_shear);
		StepDiagnostics {
			elapsed_millis: sw.millis(),
			iterations: self.iterations,
			relaxed: stats.relaxed,
			degenerate: stats.degenerate,
		}
	}

	/// Relaxation only, shear included, no integration. Leaves particles at
	/// rest and returns the residual.
	pub fn settle(&mut self, iterations: usize) -> f32 {
		let residual = self.model.settle(iterations);
		debug!(shape = ?self.shape, iterations, residual, "settled");
		if residual > self.bar_length * SETTLE_TOLERANCE {
			warn!(
				shape = ?self.shape,
				iterations,
				residual,
				"settle did not converge"
			);
		}
		residual
	}

	pub fn set_force(&mut self, x: f32, y: f32, z: f32) {
		self.force = V3::new(x, y, z);
		self.model.set_force(self.force);
	}

	pub fn set_force_axis(&mut self, axis: Axis, value: f32) {
		self.force[axis.index()] = value;
		self.model.set_force(self.force);
	}

	/// Flips the lock flag; returns the new state.
	pub fn toggle_lock(&mut self, r: ParticleRef) -> Result<bool> {
		let idx = self.shape.index(r)?;
		Ok(self.model.particles[idx].toggle_lock())
	}

	/// Structural constraints get `bar_length`, shear ones `bar_length * √2`.
	pub fn set_rest_length(&mut self, bar_length: f32) -> Result<()> {
		self.model.set_rest_length(bar_length)?;
		self.bar_length = bar_length;
		Ok(())
	}

	pub fn set_iterations(&mut self, iterations: usize) {
		self.iterations = iterations;
	}

	pub fn set_use_shear(&mut self, use_shear: bool) {
		self.use_shear = use_shear;
	}

	/// Rebuilds with the current bar length, see [`Topology::rebuild`].
	pub fn resize(&mut self, shape: Shape) -> Result<()> {
		self.rebuild(shape, self.bar_length)
	}

	/// Discards all particle state and builds `shape` from scratch. On error
	/// the current topology is left untouched.
	///
	/// `shape` may be of the other kind. Force, iteration count, shear flag
	/// and settle count carry over unchanged, so a rope rebuilt as a cloth
	/// keeps the rope's force; call [`Topology::set_force`] with
	/// [`Shape::default_force`] to get the new kind's default.
	pub fn rebuild(&mut self, shape: Shape, bar_length: f32) -> Result<()> {
		check_length(bar_length)?;
		let model = shape.build(bar_length, self.force)?;
		let names: FnvHashMap<String, usize> = (0..shape.len())
			.map(|id| (shape.name(id), id))
			.collect();
		info!(
			?shape,
			bar_length,
			particles = model.particles.len(),
			constraints = model.constraints.len(),
			"build topology"
		);
		self.shape = shape;
		self.bar_length = bar_length;
		self.model = model;
		self.names = names;
		self.settle(self.settle_iterations);
		Ok(())
	}

	pub fn apply(&mut self, msg: ControllerMessage) -> Result<()> {
		use ControllerMessage::*;
		match msg {
			SetForce(f) => self.set_force(f[0], f[1], f[2]),
			SetForceAxis(axis, value) => self.set_force_axis(axis, value),
			ToggleLock(r) => {
				self.toggle_lock(r)?;
			}
			SetRestLength(l) => self.set_rest_length(l)?,
			SetIterations(n) => self.set_iterations(n),
			SetUseShear(on) => self.set_use_shear(on),
			Resize(shape) => self.resize(shape)?,
			Rebuild(shape, l) => self.rebuild(shape, l)?,
		}
		Ok(())
	}

	pub fn pr_model(&self) -> PrModel {
		PrModel {
			particles: self
				.particles()
				.iter()
				.map(|p| p.render(self.shape.name(p.get_id())))
				.collect(),
			constraints: self
				.constraints()
				.iter()
				.enumerate()
				.map(|(id, c)| c.render(id))
				.collect(),
		}
	}
}
