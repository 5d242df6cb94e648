//! # Configuration Management
//!
//! Centralized configuration for the weaving engine.
//!
//! This module provides structured configuration for a weaving run — where
//! compiled classes live, where the packet manifest is — together with the
//! fixed external contracts of the engine: marker descriptors matched in
//! class-file binaries and the reserved naming convention for generated
//! accessor methods.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides
//!
//! ## Contract Constants
//! Marker types are matched by binary descriptor, never by name-based
//! reflection. The accessor prefixes are a public contract: the runtime
//! serializer invokes generated members by exactly these names.

use crate::error::{Result, WeaverError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved name prefix for generated getter methods.
pub const GETTER_PREFIX: &str = "$GET_";

/// Reserved name prefix for generated setter methods.
pub const SETTER_PREFIX: &str = "$SET_";

/// Class attribute recording the names of generated accessor methods.
///
/// Unknown attributes are ignored by class loaders, so the transformed class
/// stays loadable everywhere while the stripper gets an exact member list
/// back on the next run instead of guessing from the name convention.
pub const ACCESSORS_ATTRIBUTE: &str = "PacketWeaver.Accessors";

/// Descriptor of the packet marker annotation carrying the numeric packet id.
pub const PACKET_ANNOTATION: &str = "Lorg/machinemc/paklet/Packet;";

/// Internal name of the custom packet capability interface.
///
/// Classes implementing it may extend an arbitrary supertype.
pub const CUSTOM_PACKET_INTERFACE: &str = "org/machinemc/paklet/CustomPacket";

/// Descriptor of the field marker excluding a field from serialization.
pub const IGNORE_ANNOTATION: &str = "Lorg/machinemc/paklet/modifiers/Ignore;";

/// Sentinel packet id meaning "no id declared".
pub const NO_PACKET_ID: i32 = -1;

/// File suffix of compiled class files.
pub const CLASS_FILE_SUFFIX: &str = ".class";

/// Main configuration structure for a weaving run
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WeaverConfig {
    /// Root directory of the compiled classes.
    ///
    /// When unset, the directory containing the discovered manifest is used.
    #[serde(default)]
    pub classes_dir: Option<PathBuf>,

    /// Explicit path to the packet manifest.
    ///
    /// When unset, the manifest is discovered by walking `classes_dir`.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,
}

impl WeaverConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WeaverError::Config(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| WeaverError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(dir) = std::env::var("PACKET_WEAVER_CLASSES_DIR") {
            config.classes_dir = Some(PathBuf::from(dir));
        }

        if let Ok(path) = std::env::var("PACKET_WEAVER_MANIFEST_PATH") {
            config.manifest_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_config() {
        let config = WeaverConfig::from_toml(
            r#"
            classes_dir = "build/classes"
            manifest_path = "build/classes/packet-manifest.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.classes_dir.unwrap(), PathBuf::from("build/classes"));
        assert!(config.manifest_path.is_some());
    }

    #[test]
    fn defaults_leave_paths_unset() {
        let config = WeaverConfig::default();
        assert!(config.classes_dir.is_none());
        assert!(config.manifest_path.is_none());
    }

    #[test]
    fn overrides_mutate_defaults() {
        let config = WeaverConfig::default_with_overrides(|c| {
            c.classes_dir = Some(PathBuf::from("out"));
        });
        assert_eq!(config.classes_dir.unwrap(), PathBuf::from("out"));
    }
}
