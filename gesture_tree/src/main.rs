//! gesture_tree: interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use gesture_tree::app::{run, AppConfig, DetectorKind};
use gesture_tree::visualizer::ViewerError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tree_morph::TreeConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_tree", about = "Gesture-controlled particle Christmas tree")]
struct Cli {
    /// TOML scene configuration; built-in defaults when omitted
    #[arg(long, value_name = "FILE", conflicts_with = "quick")]
    config: Option<PathBuf>,

    /// Hand landmark source
    #[arg(long, value_enum, default_value_t = DetectorKind::Stdin)]
    detector: DetectorKind,

    /// Start straight away with the built-in scene
    #[arg(long)]
    quick: bool,

    /// Seed for the particle layout
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,gesture_tree=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Tree · Particle Christmas Tree              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = start(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn start(cli: Cli) -> Result<(), ViewerError> {
    let tree = match &cli.config {
        Some(path) => TreeConfig::load(path)?,
        None => {
            if cli.quick {
                println!("  Quick-start: built-in scene, {} detector\n", detector_name(cli.detector));
            }
            TreeConfig::default()
        }
    };

    info!(detector = detector_name(cli.detector), seed = ?cli.seed, "starting");
    println!("  Opening visualizer window…");
    println!();

    run(AppConfig {
        tree,
        detector: cli.detector,
        seed: cli.seed,
        ..AppConfig::default()
    })
}

fn detector_name(kind: DetectorKind) -> &'static str {
    match kind {
        DetectorKind::None  => "no",
        DetectorKind::Stdin => "stdin",
        DetectorKind::Demo  => "demo",
    }
}
