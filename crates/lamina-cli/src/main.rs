//! `lamina`: run layer-editing commands from a script or stdin.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lamina_cli::{AppConfig, Session, run_interactive, run_script};
use lamina_codec::ImageFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lamina", version, about = "Layered raster image editor")]
struct Cli {
    /// Run commands from a file and stop at the first failure
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Format for `export` without a path and for `save-layers`
    #[arg(long, value_name = "FORMAT")]
    export_format: Option<ImageFormat>,
    /// Fixed RNG seed for `mosaic`
    #[arg(long, value_name = "SEED")]
    rng_seed: Option<u64>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    if let Some(format) = cli.export_format {
        config.export_format = format;
    }
    if let Some(seed) = cli.rng_seed {
        config.rng_seed = Some(seed);
    }
    if cli.verbose {
        config.log_level = "debug".to_owned();
    }

    init_logging(&config.log_level);
    tracing::debug!("{config:?}");

    let mut session = Session::new(config);
    let mut stdout = io::stdout().lock();

    match cli.script {
        Some(path) => {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("error: cannot open script {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            };
            match run_script(&mut session, BufReader::new(file), &mut stdout) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {}: {e}", path.display());
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            match run_interactive(
                &mut session,
                stdin.lock(),
                &mut stdout,
                &mut io::stderr(),
                prompt,
            ) {
                Ok(failures) => {
                    tracing::debug!("session ended with {failures} failed command(s)");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
