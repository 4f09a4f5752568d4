use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::topology::{Shape, Topology, SETTLE_ITERATIONS};
use crate::V3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeConfig {
	pub points: usize,
	pub iterations: usize,
	pub bar_length: f32,
	pub force: [f32; 3],
}

impl Default for RopeConfig {
	fn default() -> Self {
		Self {
			points: 5,
			iterations: 20,
			bar_length: 4.0,
			force: [0., -15., 0.],
		}
	}
}

impl RopeConfig {
	pub fn build(&self, settle_iterations: usize) -> Result<Topology> {
		let shape = Shape::Rope {
			points: self.points,
		};
		let topology = Topology::build(
			shape,
			self.iterations,
			self.bar_length,
			settle_iterations,
		)?;
		Ok(topology.with_force(V3::from(self.force)))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
	pub rows: usize,
	pub cols: usize,
	pub iterations: usize,
	pub bar_length: f32,
	pub force: [f32; 3],
	pub use_shear: bool,
}

impl Default for ClothConfig {
	fn default() -> Self {
		Self {
			rows: 34,
			cols: 34,
			iterations: 5,
			bar_length: 0.3,
			force: [165., -15., 36.],
			use_shear: true,
		}
	}
}

impl ClothConfig {
	pub fn build(&self, settle_iterations: usize) -> Result<Topology> {
		let shape = Shape::Cloth {
			rows: self.rows,
			cols: self.cols,
		};
		let topology = Topology::build(
			shape,
			self.iterations,
			self.bar_length,
			settle_iterations,
		)?;
		Ok(topology
			.with_force(V3::from(self.force))
			.with_shear(self.use_shear))
	}
}

/// Scene parameters, loadable from TOML. Missing keys take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
	pub dt: f32,
	pub settle_iterations: usize,
	pub rope: RopeConfig,
	pub cloth: ClothConfig,
}

impl Default for SimConfig {
	fn default() -> Self {
		Self {
			dt: 0.016,
			settle_iterations: SETTLE_ITERATIONS,
			rope: RopeConfig::default(),
			cloth: ClothConfig::default(),
		}
	}
}

impl SimConfig {
	pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
		Ok(toml::from_str(s)?)
	}

	pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
		let s = std::fs::read_to_string(path)?;
		Self::from_toml_str(&s)
	}

	/// Every key spelled out, readable back by [`SimConfig::from_toml_str`].
	pub fn to_toml_string(&self) -> std::result::Result<String, ConfigError> {
		Ok(toml::to_string(self)?)
	}
}
