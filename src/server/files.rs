//! Frame and static file serving.
//!
//! URL paths are split into segments first; any `..` segment is rejected
//! before the filesystem is touched. Paths whose first segment is the frames
//! directory go through [`serve_frame`] only, never the static fallback.

use log::{Level, log};
use rouille::{Request, Response};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::index::FrameIndex;

#[derive(Debug)]
pub enum ServeError {
    /// Nothing servable at this path
    NotFound(String),
    /// Path escapes the served root
    InvalidPath(String),
    /// File exists but could not be opened
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ServeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeError::NotFound(url) => write!(f, "Not found: {}", url),
            ServeError::InvalidPath(url) => write!(f, "Invalid path: {}", url),
            ServeError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ServeError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServeError::NotFound(_) => 404,
            ServeError::InvalidPath(_) => 403,
            ServeError::Io { .. } => 500,
        }
    }

    /// Rejected traversal and I/O failures are worth an operator's attention,
    /// a missing file is routine.
    pub fn log_level(&self) -> Level {
        match self {
            ServeError::NotFound(_) => Level::Debug,
            ServeError::InvalidPath(_) | ServeError::Io { .. } => Level::Warn,
        }
    }

    /// Convert into a plain-text response; internal details stay in the log.
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServeError::NotFound(_) => "Not found",
            ServeError::InvalidPath(_) => "Forbidden",
            ServeError::Io { .. } => "Internal server error",
        };
        log!(self.log_level(), "{}", self);
        Response::text(body).with_status_code(status)
    }
}

/// Split a decoded URL path into segments, dropping empty and `.` segments.
pub fn url_segments(url: &str) -> Result<Vec<&str>, ServeError> {
    let mut segments = Vec::new();
    for segment in url.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ServeError::InvalidPath(url.to_string())),
            s if s.contains(['\\', '\0']) => {
                return Err(ServeError::InvalidPath(url.to_string()));
            }
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// Serve `<frames_dir>/<subdir>/<file>` after validating shape, name and
/// resolved location.
pub fn serve_frame(index: &FrameIndex, url: &str, segments: &[&str]) -> Result<Response, ServeError> {
    let not_found = || ServeError::NotFound(url.to_string());

    let [_, subdir, file_name] = segments else {
        return Err(not_found());
    };
    if subdir.starts_with('.') || !index.matches(file_name) {
        return Err(not_found());
    }

    let frames_root = index.frames_path().canonicalize().map_err(|_| not_found())?;
    let resolved = frames_root
        .join(subdir)
        .join(file_name)
        .canonicalize()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => ServeError::Io {
                path: frames_root.join(subdir).join(file_name),
                source: e,
            },
        })?;

    // Symlinks may point outside the frames directory
    if !resolved.starts_with(&frames_root) {
        return Err(ServeError::InvalidPath(url.to_string()));
    }
    if !resolved.is_file() {
        return Err(not_found());
    }

    let file = File::open(&resolved).map_err(|e| ServeError::Io {
        path: resolved.clone(),
        source: e,
    })?;
    Ok(Response::from_file(content_type(&resolved), file))
}

/// Generic static file serving under `root`.
pub fn serve_static(request: &Request, root: &Path) -> Result<Response, ServeError> {
    let response = rouille::match_assets(request, root);
    if response.is_success() {
        Ok(response)
    } else {
        Err(ServeError::NotFound(request.url()))
    }
}

/// Content type from the file extension, `application/octet-stream` if unknown.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    rouille::extension_to_mime(&ext)
}
