// ============================================================
// Layer 6 - Filesystem Helpers
// ============================================================
// Idempotent directory creation for one path or many.
//
//   mkdir("out/samples")                 - one directory
//   mkdirs("out/samples")                - same thing
//   mkdirs(["out/a", "out/b"])           - every entry
//   mkdirs(vec![path_a, path_b])         - any AsRef<Path> items

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::Result;

/// Create `path` and any missing parents. Existing directories are fine.
pub fn mkdir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)?;
        tracing::debug!("Created directory '{}'", path.display());
    }
    Ok(())
}

/// Create every path in `paths`, which may be a single path or a sequence.
pub fn mkdirs(paths: impl IntoPaths) -> Result<()> {
    for path in paths.into_paths() {
        mkdir(path)?;
    }
    Ok(())
}

/// One path or a collection of paths.
pub trait IntoPaths {
    fn into_paths(self) -> Vec<PathBuf>;
}

impl IntoPaths for &str {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoPaths for String {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoPaths for &Path {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![self.to_path_buf()]
    }
}

impl IntoPaths for PathBuf {
    fn into_paths(self) -> Vec<PathBuf> {
        vec![self]
    }
}

impl<P: AsRef<Path>> IntoPaths for Vec<P> {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>> IntoPaths for &[P] {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>, const N: usize> IntoPaths for [P; N] {
    fn into_paths(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkdir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("c");
        mkdir(&target).unwrap();
        mkdir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_mkdirs_mixed_existing_and_new() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("existing");
        fs::create_dir(&existing).unwrap();
        let paths = vec![
            existing.clone(),
            dir.path().join("fresh"),
            dir.path().join("deep").join("er"),
        ];

        mkdirs(paths.clone()).unwrap();
        assert!(paths.iter().all(|p| p.is_dir()));
    }

    #[test]
    fn test_mkdirs_single_path() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("only");
        mkdirs(single.as_path()).unwrap();
        assert!(single.is_dir());

        let as_string = dir.path().join("text").to_string_lossy().into_owned();
        mkdirs(as_string.clone()).unwrap();
        assert!(Path::new(&as_string).is_dir());
    }
}
