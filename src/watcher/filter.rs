//! Watch-set scoping and ignore patterns

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{WatchRebuildError, WatchRebuildResult};

/// Decides whether an event path may trigger a build.
///
/// A path qualifies when it lives under one of the watch roots and no
/// ignore pattern matches it (relative to that root).
#[derive(Debug)]
pub struct PathFilter {
    roots: Vec<PathBuf>,
    ignore: Gitignore,
}

impl PathFilter {
    /// Resolve roots (canonicalized) and compile ignore patterns.
    ///
    /// Every root must exist and be a directory.
    pub fn new(roots: &[PathBuf], patterns: &[String]) -> WatchRebuildResult<Self> {
        if roots.is_empty() {
            return Err(WatchRebuildError::NoWatchPaths);
        }

        let mut canonical = Vec::with_capacity(roots.len());
        for root in roots {
            if !root.is_dir() {
                return Err(WatchRebuildError::WatchPathNotFound { path: root.clone() });
            }
            let resolved = root.canonicalize()?;
            if !canonical.contains(&resolved) {
                canonical.push(resolved);
            }
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            let trimmed = pattern.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            builder
                .add_line(None, trimmed)
                .map_err(|e| WatchRebuildError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let ignore = builder
            .build()
            .map_err(|e| WatchRebuildError::InvalidIgnorePattern {
                pattern: patterns.join(", "),
                message: e.to_string(),
            })?;

        Ok(Self {
            roots: canonical,
            ignore,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Check whether a change at `path` should be considered
    pub fn accepts(&self, path: &Path) -> bool {
        let Some((root, rel)) = self.locate(path) else {
            return false;
        };
        if rel.as_os_str().is_empty() {
            // the root itself, e.g. its mtime changing
            return false;
        }
        let is_dir = root.join(&rel).is_dir();
        !self
            .ignore
            .matched_path_or_any_parents(&rel, is_dir)
            .is_ignore()
    }

    /// Find the owning root and the path relative to it
    fn locate(&self, path: &Path) -> Option<(&Path, PathBuf)> {
        let candidates = [Some(path.to_path_buf()), canonicalize_lossy(path)];
        for candidate in candidates.iter().flatten() {
            for root in &self.roots {
                if let Ok(rel) = candidate.strip_prefix(root) {
                    return Some((root.as_path(), rel.to_path_buf()));
                }
            }
        }
        None
    }
}

/// Canonicalize a path that may no longer exist by resolving its parent.
fn canonicalize_lossy(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = path.canonicalize() {
        return Some(p);
    }
    let parent = path.parent()?.canonicalize().ok()?;
    Some(parent.join(path.file_name()?))
}
