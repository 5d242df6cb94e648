//! Eligible-field enumeration.
//!
//! Read-only pass over the declared fields, in declaration order. Transient
//! and ignore-marked fields are dropped silently; a `final` instance field
//! is a contract violation. Static fields never receive accessors.

use crate::classfile::{annotations, ClassFile, TypeTag, ACC_FINAL, ACC_STATIC, ACC_TRANSIENT};
use crate::config::IGNORE_ANNOTATION;
use crate::error::{Result, WeaverError};
use crate::weave::{ClassIdentity, FieldDescriptor};

/// Enumerate the fields that receive generated accessors.
pub fn eligible_fields(
    class: &ClassFile,
    identity: &ClassIdentity,
) -> Result<Vec<FieldDescriptor>> {
    let mut eligible = Vec::new();
    for field in &class.fields {
        if field.has_flags(ACC_TRANSIENT) {
            continue;
        }
        if annotations::has_annotation(&class.pool, &field.attributes, IGNORE_ANNOTATION)? {
            continue;
        }
        let name = class.pool.utf8(field.name_index)?;
        if field.has_flags(ACC_FINAL) && !field.has_flags(ACC_STATIC) {
            return Err(WeaverError::ImmutableInstanceField {
                class: identity.binary_name.clone(),
                field: name.to_owned(),
            });
        }
        if field.has_flags(ACC_STATIC) {
            continue;
        }
        let descriptor = class.pool.utf8(field.descriptor_index)?;
        eligible.push(FieldDescriptor {
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            type_tag: TypeTag::from_descriptor(descriptor)?,
        });
    }
    Ok(eligible)
}
