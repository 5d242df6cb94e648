//! # Packet Weaver
//!
//! Bytecode weaving engine that augments already-compiled packet message
//! classes with synthetic field accessor methods, so a reflection-free
//! serialization runtime can read and write fields by direct invocation.
//!
//! Given a compiled class and a manifest declaring it a packet, the engine
//! statically rewrites its binary form: it validates the structural
//! contract, enumerates eligible fields, strips any previously generated
//! accessors, and injects fresh accessor pairs with type-correct
//! instructions.
//!
//! ## Architecture
//! - [`classfile`]: class-file binary model, decoded once and re-encoded once
//! - [`weave`]: the validate → collect → strip → synthesize pipeline
//! - [`store`]: whole-file class storage under a root directory
//! - [`manifest`]: the external packet manifest
//! - [`config`]: run configuration and the engine's contract constants
//! - [`error`]: error taxonomy
//!
//! ## Guarantees
//! - **Idempotence**: re-running the pipeline never accumulates duplicate
//!   or stale accessor pairs.
//! - **Order preservation**: accessor pairs follow field declaration order.
//! - **All-or-nothing commit**: a class on disk is either fully transformed
//!   or exactly as it was before the run touched it.
//!
//! ## Example
//! ```no_run
//! use packet_weaver::{Manifest, Weaver, ClassFileStore};
//!
//! fn main() -> packet_weaver::Result<()> {
//!     let manifest = Manifest::load("build/classes/packet-manifest.json")?;
//!     let weaver = Weaver::new(ClassFileStore::new("build/classes"));
//!     let report = weaver.run(&manifest);
//!     for failure in &report.failures {
//!         eprintln!("{}: {}", failure.class, failure.error);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classfile;
pub mod config;
pub mod error;
pub mod manifest;
pub mod store;
pub mod weave;

pub use config::WeaverConfig;
pub use error::{Result, WeaverError};
pub use manifest::Manifest;
pub use store::ClassFileStore;
pub use weave::{ClassIdentity, FieldDescriptor, PacketDescriptor, RunReport, Weaver};
