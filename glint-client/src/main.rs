use std::path::PathBuf;

use clap::Parser;
use glint_core::GlintConfig;

mod abs;
mod logging;
mod other;
mod render;
mod runner;
mod scenes;

/// Real-time rendering of glinty materials.
#[derive(Parser, Debug)]
#[command(name = "realtime-glint", version)]
struct Cli {
    /// Scene to run.
    scene: Option<String>,

    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log the active uniforms, uniform blocks and attributes after linking.
    #[arg(long)]
    introspect: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Unable to initialise logging: {e}");
    }

    let scene_name = cli.scene.as_deref().unwrap_or(scenes::DEFAULT_SCENE);
    if !scenes::registry().contains_key(scene_name) {
        eprintln!("Unknown scene: {scene_name}");
        eprint!("{}", scenes::usage("realtime-glint"));
        std::process::exit(1);
    }

    if let Err(e) = run(scene_name, &cli) {
        match e.program_error_kind() {
            Some(kind) => log::error!("Shader {kind} error: {e}"),
            None => log::error!("{e}"),
        }
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            log::error!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(scene_name: &str, cli: &Cli) -> Result<(), scenes::SceneError> {
    let config = GlintConfig::resolve(cli.config.as_deref())?;
    log::debug!("Config: {config:?}");

    let mut runner = runner::SceneRunner::new(&config)?;
    let mut scene = scenes::create(scene_name, runner.gl(), &config, cli.introspect)?;
    runner.run(scene.as_mut())
}
