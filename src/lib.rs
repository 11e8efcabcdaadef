//! SEQVIEW - frame sequence viewer library
//!
//! Re-exports all modules for use by the binary target.

pub mod cli;
pub mod config;
pub mod index;
pub mod paths;
pub mod playback;
pub mod server;

pub use config::{ViewerConfig, ViewerMode};
pub use index::{Frame, FrameIndex};
pub use playback::Playback;
pub use server::{FrameServer, FrameService};
