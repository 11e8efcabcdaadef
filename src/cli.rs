use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerMode;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "HTTP:   rouille 3.6 (sync)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Browse simulation snapshot frames in a web browser
#[derive(Parser, Debug, Default)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Directory to serve; frames are looked up under ROOT/<frames-dir>
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Port to listen on (default: 8092)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(long = "bind", value_name = "ADDR")]
    pub bind: Option<String>,

    /// Name of the frames directory under ROOT (default: outputs)
    #[arg(long = "frames-dir", value_name = "NAME")]
    pub frames_dir: Option<String>,

    /// File name pattern of frame files (default: snapshot*.svg)
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Subdirectory to prefer when it contains frames
    #[arg(short = 'P', long = "preferred", value_name = "SUBDIR")]
    pub preferred: Option<String>,

    /// Page layout: dropdown browser or animated player
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: Option<ViewerMode>,

    /// Page title
    #[arg(long = "title", value_name = "TEXT")]
    pub title: Option<String>,

    /// Default playback interval in milliseconds
    #[arg(long = "interval", value_name = "MS")]
    pub interval_ms: Option<u32>,

    /// Load settings from this JSON file instead of <config-dir>/seqview.json
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Enable logging to file (default: seqview.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
