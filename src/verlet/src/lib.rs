pub mod config;
pub mod constraint;
pub mod controller_message;
pub mod diagnostics;
pub mod error;
pub mod particle;
pub mod physical_model;
pub mod topology;
pub mod world;

pub type V3 = nalgebra::Vector3<f32>;

pub use error::VerletError;
pub use topology::{ParticleRef, Shape, Topology};
