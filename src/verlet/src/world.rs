use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use crate::config::SimConfig;
use crate::diagnostics::StepDiagnostics;
use crate::error::{ConfigError, Result};
use crate::topology::Topology;
use protocol::pr_model::PrModel;

/// Independent topologies advanced together. They share no particles, so
/// each one can be stepped on its own thread.
pub struct World {
	pub dt: f32,
	topologies: Vec<Topology>,
}

impl Default for World {
	fn default() -> Self {
		Self {
			dt: 0.016,
			topologies: Vec::new(),
		}
	}
}

impl World {
	pub fn with_dt(mut self, dt: f32) -> Self {
		self.dt = dt;
		self
	}

	/// Rope and cloth scene as described by `config`.
	pub fn from_config(config: &SimConfig) -> Result<Self> {
		let mut world = Self::default().with_dt(config.dt);
		world.add_topology(config.rope.build(config.settle_iterations)?);
		world.add_topology(config.cloth.build(config.settle_iterations)?);
		Ok(world)
	}

	pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
		let config = SimConfig::load(path)?;
		info!("loaded config from {}", path.display());
		Ok(Self::from_config(&config)?)
	}

	pub fn add_topology(&mut self, topology: Topology) -> usize {
		self.topologies.push(topology);
		self.topologies.len() - 1
	}

	pub fn topologies(&self) -> &[Topology] {
		&self.topologies
	}

	pub fn get(&self, id: usize) -> Option<&Topology> {
		self.topologies.get(id)
	}

	pub fn get_mut(&mut self, id: usize) -> Option<&mut Topology> {
		self.topologies.get_mut(id)
	}

	pub fn step_parallel(&mut self, dt: f32) -> Vec<StepDiagnostics> {
		self.topologies
			.par_iter_mut()
			.map(|topology| topology.step(dt))
			.collect()
	}

	pub fn step_serial(&mut self, dt: f32) -> Vec<StepDiagnostics> {
		self.topologies
			.iter_mut()
			.map(|topology| topology.step(dt))
			.collect()
	}

	#[cfg(not(debug_assertions))]
	pub fn step(&mut self) -> Vec<StepDiagnostics> {
		self.step_parallel(self.dt)
	}

	#[cfg(debug_assertions)]
	pub fn step(&mut self) -> Vec<StepDiagnostics> {
		self.step_serial(self.dt)
	}

	/// Steps `frames` times; returns the per-topology totals.
	pub fn run(&mut self, frames: usize) -> Vec<StepDiagnostics> {
		let mut total = vec![StepDiagnostics::default(); self.topologies.len()];
		for _ in 0..frames {
			for (sum, d) in total.iter_mut().zip(self.step()) {
				*sum += d;
			}
		}
		total
	}

	pub fn pr_models(&self) -> Vec<PrModel> {
		self.topologies.iter().map(|t| t.pr_model()).collect()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::topology::Shape;

	fn small_config() -> SimConfig {
		let mut config = SimConfig::default();
		config.cloth.rows = 6;
		config.cloth.cols = 7;
		config
	}

	#[test]
	fn test_from_config() {
		let world = World::from_config(&small_config()).unwrap();
		assert_eq!(world.topologies().len(), 2);
		assert_eq!(world.get(0).unwrap().shape(), Shape::Rope { points: 5 });
		assert_eq!(
			world.get(1).unwrap().shape(),
			Shape::Cloth { rows: 6, cols: 7 }
		);
		assert!(world.get(2).is_none());
	}

	#[test]
	fn test_parallel_matches_serial() {
		let mut a = World::from_config(&small_config()).unwrap();
		let mut b = World::from_config(&small_config()).unwrap();
		for _ in 0..30 {
			a.step_parallel(0.016);
			b.step_serial(0.016);
		}
		assert_eq!(a.pr_models(), b.pr_models());
	}

	#[test]
	fn test_run_totals() {
		let mut world = World::from_config(&small_config()).unwrap();
		let total = world.run(10);
		assert_eq!(total.len(), 2);
		assert_eq!(total[0].iterations, 10 * 20);
		assert_eq!(total[1].iterations, 10 * 5);
		let cloth = world.get(1).unwrap();
		assert_eq!(total[1].relaxed, 10 * 5 * cloth.constraints().len());
	}
}
