use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use verlet::config::SimConfig;
use verlet::world::World;

/// Runs the rope and cloth scene headless and reports solver load.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	/// Scene config (TOML); defaults are used when omitted
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Number of frames to simulate
	#[arg(short, long, default_value = "100")]
	frames: usize,

	/// Override the time step in seconds
	#[arg(long)]
	dt: Option<f32>,
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();
	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => SimConfig::load(path)?,
		None => SimConfig::default(),
	};
	if let Some(dt) = args.dt {
		config.dt = dt;
	}
	let mut world = World::from_config(&config)?;

	let start = Instant::now();
	let total = world.run(args.frames);
	let wall = start.elapsed().as_secs_f32();

	for (topology, d) in world.topologies().iter().zip(total.iter()) {
		info!(
			shape = ?topology.shape(),
			avg_millis = d.elapsed_millis / args.frames.max(1) as f32,
			degenerate = d.degenerate,
			residual = topology.residual(false),
			"done"
		);
	}
	let time = args.frames.max(1) as f32 * world.dt;
	info!("load {:.3}%", wall / time * 100.0);
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_args_defaults() {
		let args = Args::try_parse_from(["bench"]).unwrap();
		assert_eq!(args.frames, 100);
		assert!(args.config.is_none());
		assert!(args.dt.is_none());
	}

	#[test]
	fn test_args_override() {
		let args = Args::try_parse_from([
			"bench", "-f", "10", "--dt", "0.01", "-c", "a.toml",
		])
		.unwrap();
		assert_eq!(args.frames, 10);
		assert_eq!(args.dt, Some(0.01));
		assert_eq!(args.config, Some(PathBuf::from("a.toml")));
	}
}
