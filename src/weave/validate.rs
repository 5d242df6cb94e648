//! Structural validation of the packet contract.
//!
//! Read-only pass: confirms the inheritance and constructor contracts and
//! extracts the optional numeric packet id from the marker annotation.

use crate::classfile::{annotations, ClassFile, ACC_PUBLIC};
use crate::config::{CUSTOM_PACKET_INTERFACE, NO_PACKET_ID, PACKET_ANNOTATION};
use crate::error::{Result, WeaverError};
use crate::weave::ClassIdentity;

/// Check the packet contract and report identity plus packet id.
///
/// The id is [`NO_PACKET_ID`] when the class carries no packet marker.
pub fn validate(class: &ClassFile) -> Result<(ClassIdentity, i32)> {
    let identity = ClassIdentity::of(class)?;

    let extends_object = class.super_class_name()? == Some("java/lang/Object");
    if !extends_object && !class.implements(CUSTOM_PACKET_INTERFACE)? {
        return Err(WeaverError::InvalidSupertype {
            class: identity.binary_name,
        });
    }

    if !has_default_constructor(class)? {
        return Err(WeaverError::MissingDefaultConstructor {
            class: identity.binary_name,
        });
    }

    let id = annotations::annotation_int_element(
        &class.pool,
        &class.attributes,
        PACKET_ANNOTATION,
        "value",
    )?
    .unwrap_or(NO_PACKET_ID);

    Ok((identity, id))
}

fn has_default_constructor(class: &ClassFile) -> Result<bool> {
    for method in &class.methods {
        if class.pool.utf8(method.name_index)? == "<init>"
            && class.pool.utf8(method.descriptor_index)? == "()V"
            && method.has_flags(ACC_PUBLIC)
        {
            return Ok(true);
        }
    }
    Ok(false)
}
