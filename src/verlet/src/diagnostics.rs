use std::time::Instant;

/// Advisory cost report for one step. Nothing in the solver reads it back.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepDiagnostics {
	/// Wall-clock time spent integrating and relaxing.
	pub elapsed_millis: f32,
	pub iterations: usize,
	/// Constraint corrections applied (skipped shear constraints excluded).
	pub relaxed: usize,
	/// Corrections that fell back to the fixed axis.
	pub degenerate: usize,
}

pub(crate) struct Stopwatch(Instant);

impl Stopwatch {
	pub fn start() -> Self {
		Self(Instant::now())
	}

	pub fn millis(&self) -> f32 {
		self.0.elapsed().as_secs_f32() * 1e3
	}
}

impl std::ops::AddAssign for StepDiagnostics {
	fn add_assign(&mut self, rhs: Self) {
		self.elapsed_millis += rhs.elapsed_millis;
		self.iterations += rhs.iterations;
		self.relaxed += rhs.relaxed;
		self.degenerate += rhs.degenerate;
	}
}
