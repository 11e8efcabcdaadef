//! HTTP server for browsing frame sequences.
//!
//! # Purpose
//!
//! Lists the frames found by [`crate::index::FrameIndex`] and serves them to
//! a browser, either as a dropdown browser or an animated player page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   GET /            ┌──────────────┐  scan()  ┌──────────────┐
//! │   Browser    │ ─────────────────▶ │ FrameService │ ───────▶ │  FrameIndex  │
//! │ (playback    │   GET /api/files   │  (rouille)   │          │ (glob, sort) │
//! │  state)      │ ◀───────────────── │              │          └──────────────┘
//! │              │   GET /outputs/..  │              │  read    ┌──────────────┐
//! │              │ ─────────────────▶ │              │ ───────▶ │  filesystem  │
//! └──────────────┘                    └──────────────┘          └──────────────┘
//! ```
//!
//! - **rouille** - sync HTTP server, thread pool per request
//! - no shared mutable state: every request rescans the frames directory
//!
//! # Endpoints
//!
//! | Method | Path                          | Description                      |
//! |--------|-------------------------------|----------------------------------|
//! | GET    | `/`                           | HTML viewer page                 |
//! | GET    | `/api/files`                  | JSON array of frame paths        |
//! | GET    | `/api/health`                 | Health check                     |
//! | GET    | `/<frames_dir>/<run>/<file>`  | Frame bytes (validated)          |
//! | GET    | `/<anything else>`            | Static file under the served root|
//!
//! HEAD is accepted wherever GET is; other methods get 405.

mod api;
mod files;
pub mod page;

pub use api::{FrameServer, FrameService};
pub use files::ServeError;
