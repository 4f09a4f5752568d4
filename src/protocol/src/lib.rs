pub mod pr_model;

pub use pr_model::{PrConstraint, PrModel, PrParticle};
