use thiserror::Error;

use crate::topology::ParticleRef;

pub type Result<T> = std::result::Result<T, VerletError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerletError {
	/// Point, row or column count below the minimum of 2, or so large the
	/// particle and constraint storage cannot be sized.
	#[error("invalid topology: {what} out of range (min 2), got {got}")]
	InvalidTopology { what: &'static str, got: usize },

	#[error("invalid length: {0} (must be finite and positive)")]
	InvalidLength(f32),

	#[error("invalid mass: {0} (must be finite and positive)")]
	InvalidMass(f32),

	/// Both endpoints of a constraint sit on the same position (or are the
	/// same particle), so no direction can be derived from them.
	#[error("degenerate constraint between particles {a} and {b}")]
	DegenerateConstraint { a: usize, b: usize },

	#[error("particle {reference} out of range ({len} particles)")]
	IndexOutOfRange { reference: ParticleRef, len: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("parse error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("serialize error: {0}")]
	Serialize(#[from] toml::ser::Error),

	#[error("invalid config: {0}")]
	Invalid(#[from] VerletError),
}
