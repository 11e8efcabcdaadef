use seqview::cli::Args;
use seqview::config::{ViewerConfig, ViewerMode};
use seqview::paths::{self, PathConfig};
use seqview::server::{FrameServer, FrameService};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = match log_path_opt {
            Some(path) => path.clone(),
            None => {
                paths::ensure_data_dir(path_config)?;
                paths::data_file("seqview.log", path_config)
            }
        };

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("tiny_http", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("tiny_http", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    init_logging(&args, &path_config)?;

    info!("seqview {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let config = ViewerConfig::resolve(&args, &path_config)?;
    info!("Served root: {}", config.root.display());
    info!(
        "Frames: {}/*/{} (preferred: {})",
        config.frames_path().display(),
        config.pattern,
        config.preferred.as_deref().unwrap_or("none")
    );

    if !config.frames_path().is_dir() {
        warn!(
            "Frames directory {} does not exist yet; the viewer will show no frames",
            config.frames_path().display()
        );
    }

    let service = FrameService::new(&config).context("Invalid frame configuration")?;
    let found = service.index().scan().len();
    info!("{} frame(s) currently available", found);

    let server = FrameServer::bind(&config.addr(), service)?;

    println!("Frame viewer started ({:?} mode, {} frames)", config.mode, found);
    println!("Open in browser: http://localhost:{}", server.addr().port());
    if config.mode == ViewerMode::Player {
        println!("Keyboard controls: Space=Play/Pause, Left/Right arrows=Frame navigation");
    }
    println!("Press Ctrl+C to stop server");

    server.run();
    Ok(())
}
