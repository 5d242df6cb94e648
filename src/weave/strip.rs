//! Removal of previously generated accessor methods.
//!
//! Unconditional transform pass, a no-op on a freshly compiled class. Two
//! sources identify stale members: the exact name list recorded in the
//! generated-members attribute of a previous run, and the reserved name
//! prefixes as a fallback for classes transformed before that attribute
//! existed. Everything else stays untouched, and the constant pool keeps
//! any entries a removed method referenced (append-only pool, see
//! [`crate::classfile::constant_pool`]).

use crate::classfile::{take_u16, ClassFile};
use crate::config::{ACCESSORS_ATTRIBUTE, GETTER_PREFIX, SETTER_PREFIX};
use crate::error::Result;
use bytes::Bytes;
use std::collections::HashSet;

/// Remove stale generated accessors, returning how many were dropped.
pub fn strip_stale_accessors(class: &mut ClassFile) -> Result<usize> {
    let recorded = take_recorded_names(class)?;

    let mut doomed = Vec::new();
    for (index, method) in class.methods.iter().enumerate() {
        let name = class.pool.utf8(method.name_index)?;
        if recorded.contains(name)
            || name.starts_with(GETTER_PREFIX)
            || name.starts_with(SETTER_PREFIX)
        {
            doomed.push(index);
        }
    }
    for index in doomed.iter().rev() {
        class.methods.remove(*index);
    }
    Ok(doomed.len())
}

/// Detach the generated-members attribute and decode the names it records.
fn take_recorded_names(class: &mut ClassFile) -> Result<HashSet<String>> {
    let mut names = HashSet::new();

    let mut position = None;
    for (index, attr) in class.attributes.iter().enumerate() {
        if class.pool.utf8(attr.name_index)? == ACCESSORS_ATTRIBUTE {
            position = Some(index);
            break;
        }
    }
    let Some(position) = position else {
        return Ok(names);
    };

    let attr = class.attributes.remove(position);
    let mut buf = Bytes::copy_from_slice(&attr.info);
    let count = take_u16(&mut buf, "generated-members attribute count")?;
    for _ in 0..count {
        let name_index = take_u16(&mut buf, "generated-members attribute entry")?;
        names.insert(class.pool.utf8(name_index)?.to_owned());
    }
    Ok(names)
}
