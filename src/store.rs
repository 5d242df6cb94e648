//! # Class-File Storage
//!
//! Whole-file access to compiled classes under a root directory.
//!
//! A binary class name maps directly onto the directory layout: each `/`
//! separated segment is a directory, the last segment plus `.class` is the
//! file name. Reads and writes are whole-file only — there is no streaming,
//! appending, or patching, which keeps the commit contract simple: a class
//! on disk is always either the original or a complete transformed binary.
//!
//! Callers parallelizing across classes must keep the single-writer-per-file
//! invariant themselves; the store performs no locking.

use crate::config::CLASS_FILE_SUFFIX;
use crate::error::{Result, WeaverError};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and saves class files addressed by binary class name.
#[derive(Debug, Clone)]
pub struct ClassFileStore {
    root: PathBuf,
}

impl ClassFileStore {
    /// Create a store rooted at the given classes directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ClassFileStore { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the class file for an internal binary name.
    ///
    /// `com/example/P` becomes `<root>/com/example/P.class`.
    pub fn class_path(&self, binary_name: &str) -> PathBuf {
        let mut path = self.root.clone();
        let mut segments = binary_name.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}{CLASS_FILE_SUFFIX}"));
            }
        }
        path
    }

    /// Read the whole binary of a class.
    pub fn load(&self, binary_name: &str) -> Result<Vec<u8>> {
        let path = self.class_path(binary_name);
        fs::read(&path).map_err(|e| WeaverError::io(path, e))
    }

    /// Replace the whole binary of a class.
    ///
    /// The new binary is written to a sibling temporary file and renamed
    /// over the target, so a failed write never leaves a half-written class
    /// behind: the original bytes stay on disk until the rename commits.
    pub fn save(&self, binary_name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.class_path(binary_name);
        let tmp = path.with_extension("class.tmp");
        if let Err(e) = fs::write(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(WeaverError::io(tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(WeaverError::io(path, e));
        }
        Ok(())
    }
}
