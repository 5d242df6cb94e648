//! # Weaving Pipeline
//!
//! Orchestration of the four passes that turn a compiled packet class into
//! its transformed form.
//!
//! ## Pipeline
//! ```text
//! load → decode → validate → collect → strip → synthesize → encode → save
//! ```
//!
//! The class is decoded once into the [`crate::classfile`] model; all passes
//! operate on that model and the result is encoded and committed in a single
//! whole-file write. A validation failure aborts before any transform pass,
//! so the stored bytes are never touched by a rejected class.
//!
//! ## Per-class state machine
//! ```text
//! Unvalidated → Validated → FieldsCollected → Stripped → Synthesized
//!      │             │
//!      └─ Failed ────┘   (deterministic structural failures, no retries)
//! ```
//!
//! Classes are independent units of work: one failure never aborts the
//! batch, and the [`RunReport`] aggregates per-class outcomes for the
//! caller.

pub mod collect;
pub mod strip;
pub mod synthesize;
pub mod validate;

use crate::classfile::{descriptor::class_descriptor, ClassFile, TypeTag};
use crate::config::{WeaverConfig, NO_PACKET_ID};
use crate::error::{Result, WeaverError};
use crate::manifest::Manifest;
use crate::store::ClassFileStore;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name and derived descriptor of one class, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIdentity {
    /// Internal binary name, e.g. `com/example/P`.
    pub binary_name: String,
    /// Type descriptor, e.g. `Lcom/example/P;`.
    pub descriptor: String,
}

impl ClassIdentity {
    /// Identity of a decoded class.
    pub fn of(class: &ClassFile) -> Result<Self> {
        let binary_name = class.this_class_name()?.to_owned();
        let descriptor = class_descriptor(&binary_name);
        Ok(ClassIdentity {
            binary_name,
            descriptor,
        })
    }
}

impl fmt::Display for ClassIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.binary_name)
    }
}

/// One field that receives generated accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, unique within its class.
    pub name: String,
    /// Declared field descriptor, e.g. `Ljava/lang/String;`.
    pub descriptor: String,
    /// Instruction family of the field's type.
    pub type_tag: TypeTag,
}

/// Everything the pipeline learned about one packet class.
///
/// Built fresh per invocation, discarded after the rewrite is committed.
#[derive(Debug, Clone)]
pub struct PacketDescriptor {
    pub identity: ClassIdentity,
    /// Numeric packet id, [`NO_PACKET_ID`] when not declared.
    ///
    /// Reserved metadata for the runtime consumer; the engine itself never
    /// acts on it.
    pub id: i32,
    /// Eligible fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl PacketDescriptor {
    /// Whether the class declared an explicit packet id.
    pub fn has_declared_id(&self) -> bool {
        self.id != NO_PACKET_ID
    }
}

/// Pipeline progress of one class, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unvalidated,
    Validated,
    FieldsCollected,
    Stripped,
    Synthesized,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unvalidated => "unvalidated",
            Phase::Validated => "validated",
            Phase::FieldsCollected => "fields-collected",
            Phase::Stripped => "stripped",
            Phase::Synthesized => "synthesized",
        };
        f.write_str(name)
    }
}

/// Outcome of one failed class in a batch.
#[derive(Debug)]
pub struct ClassFailure {
    pub class: String,
    pub error: WeaverError,
}

/// Aggregated outcome of a batch run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Descriptors of successfully transformed classes, in manifest order.
    pub transformed: Vec<PacketDescriptor>,
    /// Classes that failed, with the error that stopped them.
    pub failures: Vec<ClassFailure>,
}

impl RunReport {
    /// Whether every class in the batch transformed successfully.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sequences the pipeline per class and commits results through the store.
#[derive(Debug)]
pub struct Weaver {
    store: ClassFileStore,
}

impl Weaver {
    pub fn new(store: ClassFileStore) -> Self {
        Weaver { store }
    }

    /// Run the full pipeline on in-memory class bytes.
    ///
    /// Pure with respect to storage; [`Weaver::transform_class`] adds the
    /// load and the single-write commit around this.
    pub fn transform_bytes(bytes: &[u8]) -> Result<(PacketDescriptor, Vec<u8>)> {
        let mut class = ClassFile::decode(bytes)?;
        debug!(phase = %Phase::Unvalidated, "decoded class");

        let (identity, id) = validate::validate(&class)?;
        debug!(class = %identity, phase = %Phase::Validated, id);

        let fields = collect::eligible_fields(&class, &identity)?;
        debug!(class = %identity, phase = %Phase::FieldsCollected, eligible = fields.len());

        let packet = PacketDescriptor {
            identity,
            id,
            fields,
        };

        let removed = strip::strip_stale_accessors(&mut class)?;
        debug!(class = %packet.identity, phase = %Phase::Stripped, removed);

        synthesize::synthesize_accessors(&mut class, &packet)?;
        debug!(class = %packet.identity, phase = %Phase::Synthesized);

        Ok((packet, class.encode()))
    }

    /// Transform one stored class and commit the rewritten binary.
    pub fn transform_class(&self, binary_name: &str) -> Result<PacketDescriptor> {
        let bytes = self.store.load(binary_name)?;
        let (packet, rewritten) = Self::transform_bytes(&bytes)?;
        self.store.save(binary_name, &rewritten)?;
        Ok(packet)
    }

    /// Transform every class the manifest names.
    pub fn run(&self, manifest: &Manifest) -> RunReport {
        let mut report = RunReport::default();
        for class in &manifest.packets {
            match self.transform_class(class) {
                Ok(packet) => {
                    info!(
                        class = %class,
                        id = packet.id,
                        accessors = packet.fields.len() * 2,
                        "transformed packet class"
                    );
                    report.transformed.push(packet);
                }
                Err(error) => {
                    warn!(class = %class, %error, "failed to transform packet class");
                    report.failures.push(ClassFailure {
                        class: class.clone(),
                        error,
                    });
                }
            }
        }
        report
    }

    /// Resolve the manifest from configuration and run the batch.
    ///
    /// A missing manifest means the unit declares no packets: the run is a
    /// no-op, not an error.
    pub fn run_with_config(config: &WeaverConfig) -> Result<RunReport> {
        let manifest_path = match &config.manifest_path {
            Some(path) if path.exists() => Some(path.clone()),
            Some(_) => None,
            None => {
                let root = config.classes_dir.as_ref().ok_or_else(|| {
                    WeaverError::Config(
                        "either classes_dir or manifest_path must be set".into(),
                    )
                })?;
                Manifest::discover(root)?
            }
        };

        let Some(manifest_path) = manifest_path else {
            info!("no packet manifest found, nothing to transform");
            return Ok(RunReport::default());
        };

        let manifest = Manifest::load(&manifest_path)?;
        let root = config
            .classes_dir
            .clone()
            .or_else(|| manifest_path.parent().map(Path::to_path_buf))
            .ok_or_else(|| WeaverError::Config("cannot determine classes directory".into()))?;

        let weaver = Weaver::new(ClassFileStore::new(root));
        Ok(weaver.run(&manifest))
    }
}
