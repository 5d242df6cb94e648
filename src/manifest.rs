//! # Packet Manifest
//!
//! The manifest is an external build artifact, produced by the annotation
//! processing step, listing which compiled classes must be transformed. It
//! also carries the default serializer bindings consumed by the runtime;
//! the engine treats those as opaque.
//!
//! A missing manifest is not an error — it means the unit being built
//! declares no packets and the run is a no-op.

use crate::error::{Result, WeaverError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the manifest emitted next to the compiled classes.
pub const MANIFEST_FILE_NAME: &str = "packet-manifest.json";

/// Deserialized packet manifest.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Manifest {
    /// Default serializer bindings, opaque to the engine.
    #[serde(rename = "defaultSerializers", default)]
    pub default_serializers: Vec<serde_json::Value>,

    /// Internal binary names of the classes to transform.
    #[serde(default)]
    pub packets: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| WeaverError::Manifest(format!("failed to parse manifest: {e}")))
    }

    /// Load a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| WeaverError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Find the manifest by walking a directory tree.
    ///
    /// Returns the path of the first `packet-manifest.json` found, or `None`
    /// when the tree carries no manifest at all.
    pub fn discover(root: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        fn walk(dir: &Path) -> Result<Option<PathBuf>> {
            let entries = fs::read_dir(dir).map_err(|e| WeaverError::io(dir, e))?;
            let mut subdirs = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| WeaverError::io(dir, e))?;
                let path = entry.path();
                if path.is_dir() {
                    subdirs.push(path);
                } else if path.file_name().map(|n| n == MANIFEST_FILE_NAME) == Some(true) {
                    return Ok(Some(path));
                }
            }
            // Files in a directory win over files below it.
            for subdir in subdirs {
                if let Some(found) = walk(&subdir)? {
                    return Ok(Some(found));
                }
            }
            Ok(None)
        }

        let root = root.as_ref();
        if !root.exists() {
            return Ok(None);
        }
        walk(root)
    }
}
