//! Plain directory tree provider, e.g. an extracted image layer.

use super::{handle_scan_error, FileVisitor, Filesystem, WalkSummary};
use crate::error::{CbomError, Result, ScanErrorKind};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Traversal settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    /// Root-relative directory paths that are not descended into
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are skipped; 0 disables the limit
    pub max_file_size: u64,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            exclude_dirs: Vec::new(),
            max_file_size: 0,
        }
    }
}

/// Filesystem rooted at a local directory
#[derive(Debug, Clone)]
pub struct PlainFilesystem {
    root: PathBuf,
    options: WalkOptions,
}

impl PlainFilesystem {
    /// Open a directory for scanning
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(CbomError::scan(
                "opening scan root",
                ScanErrorKind::RootNotFound(root),
            ));
        }
        if !root.is_dir() {
            return Err(CbomError::scan(
                "opening scan root",
                ScanErrorKind::NotADirectory(root),
            ));
        }
        Ok(Self { root, options })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.options
            .exclude_dirs
            .iter()
            .any(|dir| Path::new(dir.trim_matches('/')) == relative)
    }

    fn walk(
        &self,
        relative_dir: &Path,
        visitor: &mut FileVisitor<'_>,
        summary: &mut WalkSummary,
        seen_dirs: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let absolute_dir = self.root.join(relative_dir);
        if self.options.follow_symlinks {
            let canonical = fs::canonicalize(&absolute_dir).map_err(|e| CbomError::io(&absolute_dir, e))?;
            if !seen_dirs.insert(canonical) {
                tracing::debug!(dir = %absolute_dir.display(), "Directory already visited, skipping");
                return Ok(());
            }
        }

        let mut entries = fs::read_dir(&absolute_dir)
            .map_err(|e| CbomError::io(&absolute_dir, e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CbomError::io(&absolute_dir, e))?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let relative = relative_dir.join(entry.file_name());
            let absolute = entry.path();
            let file_type = entry.file_type().map_err(|e| CbomError::io(&absolute, e))?;

            let metadata = if file_type.is_symlink() {
                if !self.options.follow_symlinks {
                    tracing::debug!(path = %relative.display(), "Not following symlink");
                    continue;
                }
                match fs::metadata(&absolute) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        tracing::debug!(path = %relative.display(), error = %e, "Dangling symlink");
                        continue;
                    }
                }
            } else {
                entry.metadata().map_err(|e| CbomError::io(&absolute, e))?
            };

            if metadata.is_dir() {
                if self.is_excluded(&relative) {
                    tracing::debug!(dir = %relative.display(), "Excluded directory");
                    continue;
                }
                self.walk(&relative, visitor, summary, seen_dirs)?;
                continue;
            }
            if !metadata.is_file() {
                continue;
            }

            let max = self.options.max_file_size;
            if max > 0 && metadata.len() > max {
                tracing::debug!(
                    path = %relative.display(),
                    size = metadata.len(),
                    max,
                    "File exceeds size limit, skipping"
                );
                summary.files_oversized += 1;
                continue;
            }

            summary.files_visited += 1;
            if let Err(err) = visitor(&relative) {
                summary.skipped.push(handle_scan_error(err)?);
            }
        }
        Ok(())
    }
}

impl Filesystem for PlainFilesystem {
    fn walk_dir(&self, visitor: &mut FileVisitor<'_>) -> Result<WalkSummary> {
        let mut summary = WalkSummary::default();
        let mut seen_dirs = HashSet::new();
        self.walk(Path::new(""), visitor, &mut summary, &mut seen_dirs)?;
        Ok(summary)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.root.join(path);
        fs::read(&absolute).map_err(|e| CbomError::io(absolute, e))
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(self.root.join(path)).is_ok()
    }

    fn identifier(&self) -> String {
        format!("Plain Filesystem ({})", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScanError;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("proc/self")).unwrap();
        fs::write(root.join("z.txt"), "z").unwrap();
        fs::write(root.join("b/inner/c.pem"), "c").unwrap();
        fs::write(root.join("b/b.pem"), "b").unwrap();
        fs::write(root.join("a/a.pem"), "a").unwrap();
        fs::write(root.join("proc/self/status"), "s").unwrap();
        dir
    }

    fn visit_all(fs: &PlainFilesystem) -> (Vec<String>, WalkSummary) {
        let mut seen = Vec::new();
        let summary = fs
            .walk_dir(&mut |path| {
                seen.push(path.to_string_lossy().into_owned());
                Ok(())
            })
            .unwrap();
        (seen, summary)
    }

    #[test]
    fn test_lexicographic_relative_order() {
        let dir = tree();
        let fs = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();
        let (seen, summary) = visit_all(&fs);
        assert_eq!(
            seen,
            vec!["a/a.pem", "b/b.pem", "b/inner/c.pem", "proc/self/status", "z.txt"]
        );
        assert_eq!(summary.files_visited, 5);
    }

    #[test]
    fn test_excluded_dirs_and_size_limit() {
        let dir = tree();
        fs::write(dir.path().join("big.pem"), vec![b'x'; 64]).unwrap();
        let options = WalkOptions {
            exclude_dirs: vec!["proc".into(), "/b/inner/".into()],
            max_file_size: 16,
            ..WalkOptions::default()
        };
        let fs = PlainFilesystem::new(dir.path(), options).unwrap();
        let (seen, summary) = visit_all(&fs);
        assert_eq!(seen, vec!["a/a.pem", "b/b.pem", "z.txt"]);
        assert_eq!(summary.files_oversized, 1);
    }

    #[test]
    fn test_recoverable_errors_continue_fatal_errors_stop() {
        let dir = tree();
        let fs = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();

        let summary = fs
            .walk_dir(&mut |path| {
                if path.ends_with("b.pem") {
                    Err(ScanError::recoverable("test", path.to_string_lossy(), "broken"))
                } else {
                    Ok(())
                }
            })
            .unwrap();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].path, "b/b.pem");
        assert_eq!(summary.files_visited, 5);

        let mut visited = 0;
        let result = fs.walk_dir(&mut |_| {
            visited += 1;
            Err(ScanError::Fatal(CbomError::validation("stop")))
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_not_followed_by_default() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();
        // A loop back to the root must not recurse forever when following
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a/loop")).unwrap();

        let plain = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();
        let (seen, _) = visit_all(&plain);
        assert!(!seen.iter().any(|p| p.starts_with("link")));

        let following = PlainFilesystem::new(
            dir.path(),
            WalkOptions {
                follow_symlinks: true,
                ..WalkOptions::default()
            },
        )
        .unwrap();
        let (seen, _) = visit_all(&following);
        assert!(seen.contains(&"a/a.pem".to_string()));
        assert_eq!(seen.iter().filter(|p| p.ends_with("c.pem")).count(), 1);
    }

    #[test]
    fn test_root_errors_and_file_access() {
        let dir = tree();
        assert!(matches!(
            PlainFilesystem::new(dir.path().join("missing"), WalkOptions::default()),
            Err(CbomError::Scan {
                source: ScanErrorKind::RootNotFound(_),
                ..
            })
        ));
        assert!(PlainFilesystem::new(dir.path().join("z.txt"), WalkOptions::default()).is_err());

        let fs = PlainFilesystem::new(dir.path(), WalkOptions::default()).unwrap();
        assert_eq!(fs.read_file(Path::new("a/a.pem")).unwrap(), b"a");
        assert!(fs.exists(Path::new("b/inner")));
        assert!(!fs.exists(Path::new("nope")));
        assert!(matches!(
            fs.read_file(Path::new("nope")),
            Err(CbomError::Io { .. })
        ));
        assert!(fs.identifier().starts_with("Plain Filesystem ("));
    }
}
