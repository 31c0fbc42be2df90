use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::id::{generate_scratch_id, scratch_dir_name};

/// Uniquely named directory that holds one run's ephemeral clone.
///
/// The directory is created exclusively, so two runs sharing a scratch root
/// never end up with the same clone.
#[derive(Debug)]
pub struct ScratchArea {
    path: PathBuf,
}

impl ScratchArea {
    /// Create `<root>/spiegel-<id>`, creating `root` if needed
    pub fn create(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;

        loop {
            let path = root.join(scratch_dir_name(&generate_scratch_id()?));
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the clone and everything in it
    pub fn remove(self) -> io::Result<()> {
        fs::remove_dir_all(&self.path)
    }

    /// Leave the clone on disk and hand its location to the caller
    pub fn keep(self) -> PathBuf {
        self.path
    }
}
