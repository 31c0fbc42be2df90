//! Replace a clone's working tree with the contents of a source directory.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Version-control metadata, never deleted from the clone and never copied
/// from the source at any depth
pub const VCS_DIR: &str = ".git";

/// What [`replace_content`] touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentStats {
    /// Top-level entries removed from the clone
    pub removed: usize,
    /// Files and symlinks copied from the source
    pub copied: usize,
}

/// Make `clone`'s working tree mirror `source`, leaving all `.git` entries alone.
///
/// Nested repositories in the source are published as plain files: their
/// `.git` is dropped so git stages the files instead of a gitlink.
pub fn replace_content(source: &Path, clone: &Path) -> io::Result<ContentStats> {
    let removed = clear_worktree(clone)?;

    // The clone may live inside the source (scratch root under the source dir)
    let exclude = clone.canonicalize()?;
    let copied = copy_tree(source, clone, &exclude)?;

    Ok(ContentStats { removed, copied })
}

/// Delete every top-level entry of `dir` except `.git`
pub fn clear_worktree(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == VCS_DIR {
            continue;
        }

        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Copy `source` into `dest`, skipping every `.git` entry and `exclude`
pub fn copy_tree(source: &Path, dest: &Path, exclude: &Path) -> io::Result<usize> {
    let source = source.canonicalize()?;
    let mut copied = 0;

    let walker = WalkDir::new(&source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != VCS_DIR && e.path() != exclude);

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(&source)
            .map_err(io::Error::other)?;
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            copied += 1;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let pointee = fs::read_link(link)?;
    std::os::unix::fs::symlink(pointee, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    fs::copy(link, target).map(|_| ())
}
