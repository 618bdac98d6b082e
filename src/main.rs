use clap::Parser;
use log::{error, info};
use softraster::app::{run_cli, run_gui};
use softraster::io::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene configuration file (TOML). Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render without a window and write the result to an image.
    #[arg(long)]
    headless: bool,

    /// Output image for headless mode, overrides the config.
    #[arg(short, long)]
    output: Option<String>,

    /// Frames to render in headless mode before writing the image.
    #[arg(long, default_value_t = 1)]
    frames: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .filter_module("minifb", log::LevelFilter::Warn)
        .filter_module("wayland_client", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(output) = cli.output {
        config.render.output = output;
    }

    let result = if cli.headless {
        run_cli(config, cli.frames).map(|_| ())
    } else {
        run_gui(config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
