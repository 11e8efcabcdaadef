//! Viewer configuration
//!
//! Layering, lowest priority first:
//! 1. Built-in defaults ([`ViewerConfig::default`])
//! 2. JSON file (`--config FILE`, or `seqview.json` in the config directory)
//! 3. Environment (`SEQVIEW_ROOT`, `SEQVIEW_PORT`)
//! 4. Command-line flags
//!
//! The resolved config is immutable for the lifetime of the server.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::cli::Args;
use crate::paths::{self, PathConfig};
use crate::playback::DEFAULT_INTERVAL_MS;

/// Name of the config file looked up in the config directory
pub const CONFIG_FILE_NAME: &str = "seqview.json";

/// Page layout served at `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewerMode {
    /// Dropdown listing every frame
    Browse,
    /// Play/pause, step buttons, slider and speed select
    #[default]
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub bind: String,
    pub port: u16,
    /// Served root; static fallback and frame lookup resolve against it
    pub root: PathBuf,
    /// Frames directory name, relative to `root`
    pub frames_dir: String,
    /// File name glob of frame files
    pub pattern: String,
    /// Subdirectory of `frames_dir` that wins when it holds any frame
    pub preferred: Option<String>,
    pub mode: ViewerMode,
    pub title: String,
    pub interval_ms: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8092,
            root: PathBuf::from("."),
            frames_dir: "outputs".to_string(),
            pattern: "snapshot*.svg".to_string(),
            preferred: None,
            mode: ViewerMode::Player,
            title: "Simulation Snapshot Viewer".to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl ViewerConfig {
    /// Resolve the full configuration stack and validate it.
    pub fn resolve(args: &Args, path_config: &PathConfig) -> Result<Self> {
        let mut config = match &args.config_file {
            Some(file) => Self::from_file(file)?,
            None => {
                let default_file = paths::config_file(CONFIG_FILE_NAME, path_config);
                if default_file.is_file() {
                    Self::from_file(&default_file)?
                } else {
                    debug!("No config file at {}, using defaults", default_file.display());
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `SEQVIEW_ROOT` / `SEQVIEW_PORT` through the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("SEQVIEW_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(port) = lookup("SEQVIEW_PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("SEQVIEW_PORT is not a valid port: {:?}", port))?;
        }
        Ok(())
    }

    /// Command-line flags override everything else.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(root) = &args.root {
            self.root = root.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(bind) = &args.bind {
            self.bind = bind.clone();
        }
        if let Some(frames_dir) = &args.frames_dir {
            self.frames_dir = frames_dir.clone();
        }
        if let Some(pattern) = &args.pattern {
            self.pattern = pattern.clone();
        }
        if let Some(preferred) = &args.preferred {
            self.preferred = Some(preferred.clone());
        }
        if let Some(mode) = args.mode {
            self.mode = mode;
        }
        if let Some(title) = &args.title {
            self.title = title.clone();
        }
        if let Some(interval) = args.interval_ms {
            self.interval_ms = interval;
        }
    }

    /// Check startup invariants and canonicalize `root`.
    pub fn validate(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Served root is not a directory: {}", self.root.display());
        }
        self.root = self
            .root
            .canonicalize()
            .with_context(|| format!("Failed to resolve served root: {}", self.root.display()))?;

        if !is_single_component(&self.frames_dir) {
            bail!("frames_dir must be a single directory name, got {:?}", self.frames_dir);
        }
        if let Some(preferred) = &self.preferred {
            if !is_single_component(preferred) {
                bail!("preferred must be a single directory name, got {:?}", preferred);
            }
        }
        if self.pattern.is_empty() || self.pattern.contains(['/', '\\']) {
            bail!("pattern must be a file name glob, got {:?}", self.pattern);
        }
        if self.interval_ms == 0 {
            bail!("interval must be greater than 0 ms");
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Absolute directory holding the frame subdirectories
    pub fn frames_path(&self) -> PathBuf {
        self.root.join(&self.frames_dir)
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
