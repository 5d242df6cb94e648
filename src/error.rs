//! # Error Types
//!
//! Comprehensive error handling for the weaving engine.
//!
//! This module defines all error variants that can occur while transforming
//! a compiled packet class, from low-level I/O failures to structural
//! contract violations.
//!
//! ## Error Categories
//! - **Structural Violations**: The class does not satisfy the packet contract
//!   (bad supertype, missing default constructor, immutable instance field)
//! - **Class Format Errors**: Malformed or truncated class-file bytes
//! - **I/O Errors**: Class file unreadable or unwritable, always carrying the path
//! - **Manifest Errors**: Manifest present but unparsable (absence is *not* an error)
//!
//! Structural violations are fatal to the one class they name; other classes
//! in the same run are unaffected. All failures are deterministic for a given
//! input, so nothing here is ever retried.
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use packet_weaver::error::{Result, WeaverError};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(WeaverError::ClassFormat("empty class name".into()));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// WeaverError is the primary error type for all engine operations
#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("invalid-supertype: packet {class} must either not extend any class or implement the custom packet capability")]
    InvalidSupertype { class: String },

    #[error("missing-default-constructor: packet {class} has no public constructor without arguments")]
    MissingDefaultConstructor { class: String },

    #[error("immutable-instance-field({field}): non-static packet fields of {class} can not be marked as final")]
    ImmutableInstanceField { class: String, field: String },

    #[error("malformed class file: {0}")]
    ClassFormat(String),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WeaverError {
    /// Wrap an `io::Error` together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WeaverError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a structural violation of the packet contract.
    ///
    /// Structural violations abort processing for the class that raised them
    /// before any transform pass runs, leaving the stored bytes untouched.
    pub fn is_structural_violation(&self) -> bool {
        matches!(
            self,
            WeaverError::InvalidSupertype { .. }
                | WeaverError::MissingDefaultConstructor { .. }
                | WeaverError::ImmutableInstanceField { .. }
        )
    }
}

/// Type alias for Results using WeaverError
pub type Result<T> = std::result::Result<T, WeaverError>;
