//! File and directory acquisition: `-r`/`-R`/`-H` (`spec.md` §6).
//!
//! Grounded on `vsi::scan::walk`'s use of `walkdir::WalkDir`, stripped of its
//! `rayon`/`tokio` parallelism per the single-threaded execution model
//! (`spec.md` §5).

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// How directory arguments are expanded into file paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurseMode {
    /// No recursion; a directory argument is skipped with a warning.
    None,
    /// Recurse into directories, not following symlinks.
    Recurse,
    /// Recurse into directories, following symlinks.
    RecurseFollow,
}

/// Expand `args` (file and directory paths) into a flat list of file paths
/// to read, applying `recurse` and `follow_top_level_symlinks` (`-H`).
pub fn expand(args: &[PathBuf], recurse: RecurseMode, follow_top_level_symlinks: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for arg in args {
        expand_one(arg, recurse, follow_top_level_symlinks, &mut files);
    }
    files
}

fn expand_one(path: &Path, recurse: RecurseMode, follow_top_level_symlinks: bool, out: &mut Vec<PathBuf>) {
    let metadata = if follow_top_level_symlinks {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    };

    let is_dir = match metadata {
        Ok(meta) => meta.is_dir(),
        Err(error) => {
            warn!(path = %path.display(), %error, "cannot stat path");
            out.push(path.to_path_buf());
            return;
        }
    };

    if !is_dir {
        out.push(path.to_path_buf());
        return;
    }

    match recurse {
        RecurseMode::None => {
            warn!(path = %path.display(), "skipping directory (pass -r or -R to recurse)");
        }
        RecurseMode::Recurse | RecurseMode::RecurseFollow => {
            let follow = recurse == RecurseMode::RecurseFollow;
            for entry in WalkDir::new(path).follow_links(follow).into_iter() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => out.push(entry.into_path()),
                    Ok(_) => {}
                    Err(error) => warn!(%error, "error walking directory"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn directory_without_recurse_is_skipped() {
        let dir = std::env::temp_dir().join(format!("htgrep-walk-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let out = expand(&[dir.clone()], RecurseMode::None, false);
        assert!(out.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn recurse_collects_files() {
        let dir = std::env::temp_dir().join(format!("htgrep-walk-test-recurse-{}", std::process::id()));
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.html"), b"<p></p>").unwrap();
        fs::write(dir.join("sub/b.html"), b"<p></p>").unwrap();

        let out = expand(&[dir.clone()], RecurseMode::Recurse, false);
        assert_eq!(out.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn plain_file_argument_passes_through() {
        let file = std::env::temp_dir().join(format!("htgrep-walk-test-file-{}.html", std::process::id()));
        fs::write(&file, b"<p></p>").unwrap();
        let out = expand(&[file.clone()], RecurseMode::None, false);
        assert_eq!(out, vec![file.clone()]);
        fs::remove_file(&file).unwrap();
    }
}
