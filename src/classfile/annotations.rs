//! On-demand scanning of marker annotations.
//!
//! Markers are matched by binary descriptor against the
//! `RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations` attributes of
//! a class or field. Payloads are parsed on demand and never stored: the
//! attribute bytes stay raw in the model and round-trip untouched.

use crate::classfile::{take_u16, take_u8, AttributeInfo, ConstantPool};
use crate::error::{Result, WeaverError};
use bytes::Bytes;

const RUNTIME_VISIBLE: &str = "RuntimeVisibleAnnotations";
const RUNTIME_INVISIBLE: &str = "RuntimeInvisibleAnnotations";

/// Whether a marker annotation with the given descriptor is present.
pub fn has_annotation(
    pool: &ConstantPool,
    attributes: &[AttributeInfo],
    descriptor: &str,
) -> Result<bool> {
    let mut present = false;
    scan(pool, attributes, &mut |_, ann_descriptor, pairs| {
        if ann_descriptor == descriptor {
            present = true;
        }
        skip_pairs(pairs)
    })?;
    Ok(present)
}

/// Extract an integer element from a marker annotation.
///
/// Returns `Ok(None)` when the annotation is absent or carries no integer
/// element of that name.
pub fn annotation_int_element(
    pool: &ConstantPool,
    attributes: &[AttributeInfo],
    descriptor: &str,
    element: &str,
) -> Result<Option<i32>> {
    let mut found = None;
    scan(pool, attributes, &mut |pool, ann_descriptor, pairs| {
        if ann_descriptor != descriptor {
            return skip_pairs(pairs);
        }
        let count = take_u16(pairs, "annotation pair count")?;
        for _ in 0..count {
            let name_index = take_u16(pairs, "annotation element name")?;
            let name = pool.utf8(name_index)?;
            if name == element {
                if let Some(value) = read_int_value(pool, pairs)? {
                    found = Some(value);
                    continue;
                }
            } else {
                skip_element_value(pairs)?;
            }
        }
        Ok(())
    })?;
    Ok(found)
}

/// Walk every annotation in both runtime annotation attributes.
///
/// The callback receives the annotation descriptor and the buffer positioned
/// at the `num_element_value_pairs` count, and must consume the pairs.
fn scan(
    pool: &ConstantPool,
    attributes: &[AttributeInfo],
    visit: &mut dyn FnMut(&ConstantPool, &str, &mut Bytes) -> Result<()>,
) -> Result<()> {
    for attr in attributes {
        let name = pool.utf8(attr.name_index)?;
        if name != RUNTIME_VISIBLE && name != RUNTIME_INVISIBLE {
            continue;
        }
        let mut buf = Bytes::copy_from_slice(&attr.info);
        let count = take_u16(&mut buf, "annotation count")?;
        for _ in 0..count {
            let type_index = take_u16(&mut buf, "annotation type index")?;
            let descriptor = pool.utf8(type_index)?.to_owned();
            visit(pool, &descriptor, &mut buf)?;
        }
    }
    Ok(())
}

fn skip_pairs(buf: &mut Bytes) -> Result<()> {
    let count = take_u16(buf, "annotation pair count")?;
    for _ in 0..count {
        let _name_index = take_u16(buf, "annotation element name")?;
        skip_element_value(buf)?;
    }
    Ok(())
}

/// Consume one element value, yielding it only when it is an `Integer`.
fn read_int_value(pool: &ConstantPool, buf: &mut Bytes) -> Result<Option<i32>> {
    let tag = take_u8(buf, "element value tag")?;
    if tag == b'I' {
        let index = take_u16(buf, "element value index")?;
        return pool.integer(index).map(Some);
    }
    skip_element_body(tag, buf)?;
    Ok(None)
}

fn skip_element_value(buf: &mut Bytes) -> Result<()> {
    let tag = take_u8(buf, "element value tag")?;
    skip_element_body(tag, buf)
}

fn skip_element_body(tag: u8, buf: &mut Bytes) -> Result<()> {
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            take_u16(buf, "element value index")?;
        }
        b'e' => {
            take_u16(buf, "enum type index")?;
            take_u16(buf, "enum const index")?;
        }
        b'@' => {
            take_u16(buf, "nested annotation type index")?;
            let count = take_u16(buf, "nested annotation pair count")?;
            for _ in 0..count {
                take_u16(buf, "nested annotation element name")?;
                skip_element_value(buf)?;
            }
        }
        b'[' => {
            let count = take_u16(buf, "array element count")?;
            for _ in 0..count {
                skip_element_value(buf)?;
            }
        }
        other => {
            return Err(WeaverError::ClassFormat(format!(
                "unknown element value tag {other}"
            )))
        }
    }
    Ok(())
}
