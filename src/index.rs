//! Frame sequence discovery
//!
//! Globs `<frames_dir>/<subdir>/<pattern>` and returns matching files sorted
//! by their path below the frames directory. A preferred subdirectory, when it holds at least one
//! frame, replaces the `*` subdirectory wildcard.
//!
//! Nothing is cached: every [`FrameIndex::scan`] reflects the filesystem at
//! call time.

use glob::{MatchOptions, Pattern};
use log::{debug, trace, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};

use crate::config::ViewerConfig;

/// Hidden entries are skipped, names are case-sensitive
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Everything but RFC 3986 unreserved characters is escaped in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[derive(Debug)]
pub enum IndexError {
    InvalidPattern { pattern: String, msg: String },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::InvalidPattern { pattern, msg } => {
                write!(f, "Invalid frame pattern {:?}: {}", pattern, msg)
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// One discovered frame file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Filesystem path as returned by the scan
    pub path: PathBuf,
    /// Percent-encoded URL path, e.g. `/outputs/run_a/snapshot00000001.svg`.
    /// Fetching it verbatim serves this frame.
    pub request_path: String,
    /// Base file name
    pub name: String,
}

impl Frame {
    /// Human-readable label, e.g. `Step 1: snapshot00000000.svg`
    pub fn label(&self, ordinal: usize) -> String {
        format!("Step {}: {}", ordinal + 1, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct FrameIndex {
    frames_path: PathBuf,
    frames_dir: String,
    pattern: Pattern,
    preferred: Option<String>,
}

impl FrameIndex {
    pub fn new(
        root: &Path,
        frames_dir: &str,
        pattern: &str,
        preferred: Option<String>,
    ) -> Result<Self, IndexError> {
        let pattern = Pattern::new(pattern).map_err(|e| IndexError::InvalidPattern {
            pattern: pattern.to_string(),
            msg: e.msg.to_string(),
        })?;

        Ok(Self {
            frames_path: root.join(frames_dir),
            frames_dir: frames_dir.to_string(),
            pattern,
            preferred,
        })
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self, IndexError> {
        Self::new(
            &config.root,
            &config.frames_dir,
            &config.pattern,
            config.preferred.clone(),
        )
    }

    /// Directory holding the frame subdirectories
    pub fn frames_path(&self) -> &Path {
        &self.frames_path
    }

    /// First URL segment that routes to frame serving
    pub fn frames_dir(&self) -> &str {
        &self.frames_dir
    }

    /// Whether a bare file name follows the frame naming pattern
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, MATCH_OPTIONS)
    }

    /// Build the current frame sequence, sorted by path.
    ///
    /// An empty result is a valid state, not an error.
    pub fn scan(&self) -> Vec<Frame> {
        if let Some(preferred) = &self.preferred {
            let frames = self.scan_subdirs(&Pattern::escape(preferred));
            if !frames.is_empty() {
                debug!("Using preferred subdirectory {:?} ({} frames)", preferred, frames.len());
                return frames;
            }
            debug!("Preferred subdirectory {:?} has no frames, scanning all", preferred);
        }
        self.scan_subdirs("*")
    }

    fn scan_subdirs(&self, subdir_glob: &str) -> Vec<Frame> {
        let base = Pattern::escape(&self.frames_path.to_string_lossy());
        let full = format!("{}/{}/{}", base, subdir_glob, self.pattern.as_str());
        trace!("Scanning {}", full);

        let entries = match glob::glob_with(&full, MATCH_OPTIONS) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Glob error for pattern {}: {}", full, e);
                return Vec::new();
            }
        };

        // Frames must resolve inside the frames directory, same rule as serving
        let Ok(frames_root) = self.frames_path.canonicalize() else {
            return Vec::new();
        };

        let mut frames: Vec<Frame> = entries
            .filter_map(|entry| match entry {
                Ok(path) => self.frame_from_path(path, &frames_root),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .collect();

        // Every path shares the frames directory prefix, so this orders by subdir then name
        frames.sort_by(|a, b| a.path.cmp(&b.path));
        frames
    }

    fn frame_from_path(&self, path: PathBuf, frames_root: &Path) -> Option<Frame> {
        if !path.is_file() {
            return None;
        }
        match path.canonicalize() {
            Ok(resolved) if resolved.starts_with(frames_root) => {}
            _ => {
                debug!("Skipping frame outside {}: {}", frames_root.display(), path.display());
                return None;
            }
        }
        let name = path.file_name()?.to_str()?.to_string();
        let subdir = match path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => {
                warn!("Skipping frame with non UTF-8 directory: {}", path.display());
                return None;
            }
        };
        let request_path = format!(
            "/{}/{}/{}",
            utf8_percent_encode(&self.frames_dir, SEGMENT),
            utf8_percent_encode(&subdir, SEGMENT),
            utf8_percent_encode(&name, SEGMENT)
        );
        Some(Frame {
            path,
            request_path,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<svg/>").unwrap();
    }

    fn index(root: &Path, preferred: Option<&str>) -> FrameIndex {
        FrameIndex::new(root, "outputs", "snapshot*.svg", preferred.map(String::from)).unwrap()
    }

    fn request_paths(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.request_path.as_str()).collect()
    }

    #[test]
    fn test_padded_names_sort_in_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/run/snapshot00000001.svg");
        touch(dir.path(), "outputs/run/snapshot00000010.svg");
        touch(dir.path(), "outputs/run/snapshot00000002.svg");

        let frames = index(dir.path(), None).scan();
        assert_eq!(
            request_paths(&frames),
            vec![
                "/outputs/run/snapshot00000001.svg",
                "/outputs/run/snapshot00000002.svg",
                "/outputs/run/snapshot00000010.svg",
            ]
        );
    }

    #[test]
    fn test_ordering_is_lexicographic_not_numeric() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/run/snapshot9.svg");
        touch(dir.path(), "outputs/run/snapshot10.svg");

        let frames = index(dir.path(), None).scan();
        // "1" < "9", so frame 10 comes first
        assert_eq!(
            request_paths(&frames),
            vec!["/outputs/run/snapshot10.svg", "/outputs/run/snapshot9.svg"]
        );
    }

    #[test]
    fn test_preferred_subdir_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/a_run/snapshot00000000.svg");
        touch(dir.path(), "outputs/tumor_immune_base/snapshot00000000.svg");
        touch(dir.path(), "outputs/tumor_immune_base/snapshot00000001.svg");
        touch(dir.path(), "outputs/z_run/snapshot00000000.svg");

        let frames = index(dir.path(), Some("tumor_immune_base")).scan();
        assert_eq!(
            request_paths(&frames),
            vec![
                "/outputs/tumor_immune_base/snapshot00000000.svg",
                "/outputs/tumor_immune_base/snapshot00000001.svg",
            ]
        );
    }

    #[test]
    fn test_empty_preferred_falls_back_to_all() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("outputs/tumor_immune_base")).unwrap();
        touch(dir.path(), "outputs/tumor_immune_base/notes.txt");
        touch(dir.path(), "outputs/b_run/snapshot00000000.svg");
        touch(dir.path(), "outputs/a_run/snapshot00000001.svg");

        let frames = index(dir.path(), Some("tumor_immune_base")).scan();
        assert_eq!(
            request_paths(&frames),
            vec![
                "/outputs/a_run/snapshot00000001.svg",
                "/outputs/b_run/snapshot00000000.svg",
            ]
        );
    }

    #[test]
    fn test_absent_preferred_falls_back_to_all() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/run/snapshot00000000.svg");

        let frames = index(dir.path(), Some("missing")).scan();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_empty_root_yields_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        assert!(index(dir.path(), None).scan().is_empty());

        fs::create_dir_all(dir.path().join("outputs/run")).unwrap();
        assert!(index(dir.path(), None).scan().is_empty());
    }

    #[test]
    fn test_only_immediate_subdirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/snapshot00000000.svg");
        touch(dir.path(), "outputs/run/deeper/snapshot00000000.svg");
        touch(dir.path(), "outputs/.hidden/snapshot00000000.svg");
        fs::create_dir_all(dir.path().join("outputs/run/snapshot_dir.svg")).unwrap();
        touch(dir.path(), "outputs/run/snapshot00000005.svg");
        touch(dir.path(), "outputs/run/final.svg");

        let frames = index(dir.path(), None).scan();
        assert_eq!(request_paths(&frames), vec!["/outputs/run/snapshot00000005.svg"]);
        assert_eq!(frames[0].name, "snapshot00000005.svg");
        assert_eq!(frames[0].label(0), "Step 1: snapshot00000005.svg");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_subdir_outside_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "elsewhere/snapshot00000000.svg");
        touch(dir.path(), "outputs/run/snapshot00000001.svg");
        std::os::unix::fs::symlink(dir.path().join("elsewhere"), dir.path().join("outputs/linked"))
            .unwrap();

        let frames = index(dir.path(), None).scan();
        assert_eq!(request_paths(&frames), vec!["/outputs/run/snapshot00000001.svg"]);
    }

    #[test]
    fn test_root_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("results[1]");
        touch(&root, "outputs/run/snapshot00000000.svg");

        let frames = index(&root, None).scan();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_request_paths_are_percent_encoded() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "outputs/run%41/snapshot 1#.svg");
        touch(dir.path(), "outputs/run%41/snapshot2.svg");

        let frames = index(dir.path(), None).scan();
        assert_eq!(
            request_paths(&frames),
            vec!["/outputs/run%2541/snapshot%201%23.svg", "/outputs/run%2541/snapshot2.svg"]
        );
        assert_eq!(frames[0].name, "snapshot 1#.svg");
    }

    #[test]
    fn test_rescan_sees_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let idx = index(dir.path(), None);
        touch(dir.path(), "outputs/run/snapshot00000000.svg");
        assert_eq!(idx.scan().len(), 1);

        touch(dir.path(), "outputs/run/snapshot00000001.svg");
        assert_eq!(idx.scan().len(), 2);
        assert_eq!(idx.scan(), idx.scan());
    }

    #[test]
    fn test_matches_and_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let idx = index(dir.path(), None);
        assert!(idx.matches("snapshot00000001.svg"));
        assert!(!idx.matches("initial.svg"));
        assert!(!idx.matches("snapshot00000001.png"));

        let err = FrameIndex::new(dir.path(), "outputs", "snapshot[.svg", None).unwrap_err();
        assert!(err.to_string().contains("snapshot[.svg"));
    }
}
