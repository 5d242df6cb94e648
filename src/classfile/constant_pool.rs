//! Constant pool decoding, encoding, and append-only interning.
//!
//! The engine only needs a handful of entry kinds in typed form: `Utf8` for
//! names and descriptors, `Integer` for annotation elements, and the
//! `Class` / `NameAndType` / `FieldRef` chain referenced by synthesized
//! `getfield`/`putfield` instructions. Every other entry is carried as an
//! opaque tag + payload and re-emitted verbatim.
//!
//! Interning is append-only by design: removing or renumbering entries
//! would invalidate pool indices embedded in raw attribute payloads the
//! engine does not interpret. Orphaned entries left behind by a stripped
//! method are legal in the format and harmless.

use crate::classfile::{take_bytes, take_u16, take_u32, take_u8};
use crate::error::{Result, WeaverError};
use bytes::{BufMut, Bytes, BytesMut};

pub const TAG_UTF8: u8 = 1;
pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 4;
pub const TAG_LONG: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_CLASS: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_FIELD_REF: u8 = 9;
pub const TAG_METHOD_REF: u8 = 10;
pub const TAG_INTERFACE_METHOD_REF: u8 = 11;
pub const TAG_NAME_AND_TYPE: u8 = 12;
pub const TAG_METHOD_HANDLE: u8 = 15;
pub const TAG_METHOD_TYPE: u8 = 16;
pub const TAG_DYNAMIC: u8 = 17;
pub const TAG_INVOKE_DYNAMIC: u8 = 18;
pub const TAG_MODULE: u8 = 19;
pub const TAG_PACKAGE: u8 = 20;

/// One constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    /// Raw modified-UTF-8 payload. String constants may contain byte
    /// sequences standard UTF-8 rejects (`0xC0 0x80` for NUL, surrogate
    /// pairs for supplementary characters), so validation happens only
    /// where a `&str` is resolved — names, descriptors, attribute names.
    Utf8(Vec<u8>),
    Integer(i32),
    Class { name_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    /// Entry kind the engine never inspects, re-emitted verbatim.
    Opaque { tag: u8, data: Vec<u8> },
    /// Unusable second slot claimed by a `Long` or `Double` entry.
    Phantom,
}

/// Payload size in bytes for entry kinds kept opaque.
fn opaque_len(tag: u8) -> Result<usize> {
    Ok(match tag {
        TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => 2,
        TAG_METHOD_HANDLE => 3,
        TAG_FLOAT | TAG_METHOD_REF | TAG_INTERFACE_METHOD_REF | TAG_DYNAMIC
        | TAG_INVOKE_DYNAMIC => 4,
        TAG_LONG | TAG_DOUBLE => 8,
        _ => {
            return Err(WeaverError::ClassFormat(format!(
                "unknown constant pool tag {tag}"
            )))
        }
    })
}

/// The constant pool of one class, indexed 1-based as in the binary format.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Const>,
}

impl ConstantPool {
    pub fn decode(buf: &mut Bytes) -> Result<Self> {
        let count = take_u16(buf, "constant pool count")?;
        let mut entries = Vec::with_capacity(count.saturating_sub(1) as usize);
        let mut index = 1u16;
        while index < count {
            let tag = take_u8(buf, "constant pool tag")?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = take_u16(buf, "Utf8 length")? as usize;
                    let data = take_bytes(buf, len, "Utf8 payload")?;
                    Const::Utf8(data.to_vec())
                }
                TAG_INTEGER => Const::Integer(take_u32(buf, "Integer payload")? as i32),
                TAG_CLASS => Const::Class {
                    name_index: take_u16(buf, "Class name index")?,
                },
                TAG_NAME_AND_TYPE => Const::NameAndType {
                    name_index: take_u16(buf, "NameAndType name index")?,
                    descriptor_index: take_u16(buf, "NameAndType descriptor index")?,
                },
                TAG_FIELD_REF => Const::FieldRef {
                    class_index: take_u16(buf, "Fieldref class index")?,
                    name_and_type_index: take_u16(buf, "Fieldref name and type index")?,
                },
                other => {
                    let len = opaque_len(other)?;
                    Const::Opaque {
                        tag: other,
                        data: take_bytes(buf, len, "constant pool entry")?.to_vec(),
                    }
                }
            };
            let wide = matches!(tag, TAG_LONG | TAG_DOUBLE);
            entries.push(entry);
            if wide {
                entries.push(Const::Phantom);
                index += 2;
            } else {
                index += 1;
            }
        }
        Ok(ConstantPool { entries })
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.entries.len() as u16 + 1);
        for entry in &self.entries {
            match entry {
                Const::Utf8(data) => {
                    buf.put_u8(TAG_UTF8);
                    buf.put_u16(data.len() as u16);
                    buf.put_slice(data);
                }
                Const::Integer(value) => {
                    buf.put_u8(TAG_INTEGER);
                    buf.put_u32(*value as u32);
                }
                Const::Class { name_index } => {
                    buf.put_u8(TAG_CLASS);
                    buf.put_u16(*name_index);
                }
                Const::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    buf.put_u8(TAG_NAME_AND_TYPE);
                    buf.put_u16(*name_index);
                    buf.put_u16(*descriptor_index);
                }
                Const::FieldRef {
                    class_index,
                    name_and_type_index,
                } => {
                    buf.put_u8(TAG_FIELD_REF);
                    buf.put_u16(*class_index);
                    buf.put_u16(*name_and_type_index);
                }
                Const::Opaque { tag, data } => {
                    buf.put_u8(*tag);
                    buf.put_slice(data);
                }
                // The slot exists only in the index space.
                Const::Phantom => {}
            }
        }
    }

    /// Look up an entry by its 1-based pool index.
    pub fn entry(&self, index: u16) -> Result<&Const> {
        let entry = index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
            .ok_or_else(|| {
                WeaverError::ClassFormat(format!("constant pool index {index} out of range"))
            })?;
        if matches!(entry, Const::Phantom) {
            return Err(WeaverError::ClassFormat(format!(
                "constant pool index {index} points into a wide entry"
            )));
        }
        Ok(entry)
    }

    /// Resolve a `Utf8` entry as text.
    ///
    /// Names, descriptors, and attribute names stay on the subset where
    /// modified UTF-8 and standard UTF-8 agree; string constants the engine
    /// never resolves may not, and round-trip as raw bytes instead.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Const::Utf8(data) => std::str::from_utf8(data).map_err(|_| {
                WeaverError::ClassFormat(format!(
                    "constant pool index {index} is not valid UTF-8 text"
                ))
            }),
            other => Err(WeaverError::ClassFormat(format!(
                "constant pool index {index} is not Utf8 ({other:?})"
            ))),
        }
    }

    /// Resolve an `Integer` entry.
    pub fn integer(&self, index: u16) -> Result<i32> {
        match self.entry(index)? {
            Const::Integer(value) => Ok(*value),
            other => Err(WeaverError::ClassFormat(format!(
                "constant pool index {index} is not Integer ({other:?})"
            ))),
        }
    }

    /// Resolve a `Class` entry to its internal binary name.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Const::Class { name_index } => self.utf8(*name_index),
            other => Err(WeaverError::ClassFormat(format!(
                "constant pool index {index} is not Class ({other:?})"
            ))),
        }
    }

    fn push(&mut self, entry: Const) -> Result<u16> {
        // One extra slot for the header count; wide entries never come
        // through here, so one entry is one slot.
        if self.entries.len() >= u16::MAX as usize - 1 {
            return Err(WeaverError::ClassFormat("constant pool overflow".into()));
        }
        self.entries.push(entry);
        Ok(self.entries.len() as u16)
    }

    fn find(&self, wanted: &Const) -> Option<u16> {
        self.entries
            .iter()
            .position(|entry| entry == wanted)
            .map(|i| i as u16 + 1)
    }

    fn intern(&mut self, entry: Const) -> Result<u16> {
        match self.find(&entry) {
            Some(index) => Ok(index),
            None => self.push(entry),
        }
    }

    /// Intern a `Utf8` entry, reusing an existing one when present.
    pub fn intern_utf8(&mut self, text: &str) -> Result<u16> {
        if text.len() > u16::MAX as usize {
            return Err(WeaverError::ClassFormat(format!(
                "Utf8 constant of {} bytes exceeds the pool entry limit",
                text.len()
            )));
        }
        self.intern(Const::Utf8(text.as_bytes().to_vec()))
    }

    /// Intern an `Integer` entry.
    pub fn intern_integer(&mut self, value: i32) -> Result<u16> {
        self.intern(Const::Integer(value))
    }

    /// Intern a `Class` entry for an internal binary name.
    pub fn intern_class(&mut self, internal_name: &str) -> Result<u16> {
        let name_index = self.intern_utf8(internal_name)?;
        self.intern(Const::Class { name_index })
    }

    /// Intern a `NameAndType` entry.
    pub fn intern_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name_index = self.intern_utf8(name)?;
        let descriptor_index = self.intern_utf8(descriptor)?;
        self.intern(Const::NameAndType {
            name_index,
            descriptor_index,
        })
    }

    /// Intern a `Fieldref` entry for a field of the given class entry.
    pub fn intern_field_ref(
        &mut self,
        class_index: u16,
        name: &str,
        descriptor: &str,
    ) -> Result<u16> {
        let name_and_type_index = self.intern_name_and_type(name, descriptor)?;
        self.intern(Const::FieldRef {
            class_index,
            name_and_type_index,
        })
    }

    /// Number of occupied slots, phantom slots included.
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn round_trip(pool: &ConstantPool) -> ConstantPool {
        let mut buf = BytesMut::new();
        pool.encode(&mut buf);
        let mut bytes = Bytes::from(buf.to_vec());
        ConstantPool::decode(&mut bytes).unwrap()
    }

    #[test]
    fn interning_deduplicates() {
        let mut pool = ConstantPool::default();
        let a = pool.intern_utf8("x").unwrap();
        let b = pool.intern_utf8("x").unwrap();
        assert_eq!(a, b);
        let c = pool.intern_class("com/example/P").unwrap();
        let d = pool.intern_class("com/example/P").unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn field_ref_chain_resolves() {
        let mut pool = ConstantPool::default();
        let class = pool.intern_class("com/example/P").unwrap();
        let field_ref = pool.intern_field_ref(class, "x", "I").unwrap();
        let pool = round_trip(&pool);
        match pool.entry(field_ref).unwrap() {
            Const::FieldRef {
                class_index,
                name_and_type_index,
            } => {
                assert_eq!(pool.class_name(*class_index).unwrap(), "com/example/P");
                match pool.entry(*name_and_type_index).unwrap() {
                    Const::NameAndType {
                        name_index,
                        descriptor_index,
                    } => {
                        assert_eq!(pool.utf8(*name_index).unwrap(), "x");
                        assert_eq!(pool.utf8(*descriptor_index).unwrap(), "I");
                    }
                    other => panic!("unexpected entry {other:?}"),
                }
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn wide_entries_claim_two_slots() {
        // CONSTANT_Long 42, then a Utf8 that must land two slots later.
        let mut buf = BytesMut::new();
        buf.put_u16(4); // count: long (2 slots) + utf8
        buf.put_u8(TAG_LONG);
        buf.put_u64(42);
        buf.put_u8(TAG_UTF8);
        buf.put_u16(3);
        buf.put_slice(b"abc");
        let mut bytes = Bytes::from(buf.to_vec());
        let pool2 = ConstantPool::decode(&mut bytes).unwrap();
        assert_eq!(pool2.utf8(3).unwrap(), "abc");
        assert!(pool2.entry(2).is_err()); // phantom slot
        let pool3 = round_trip(&pool2);
        assert_eq!(pool3.utf8(3).unwrap(), "abc");
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let pool = ConstantPool::default();
        assert!(pool.entry(0).is_err());
        assert!(pool.entry(1).is_err());
    }

    #[test]
    fn modified_utf8_constants_round_trip() {
        // Legal class-file payloads standard UTF-8 rejects: the two-byte
        // NUL encoding and a surrogate pair for a supplementary character.
        for payload in [
            &[0xC0, 0x80][..],
            &[0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80][..],
        ] {
            let mut buf = BytesMut::new();
            buf.put_u16(2);
            buf.put_u8(TAG_UTF8);
            buf.put_u16(payload.len() as u16);
            buf.put_slice(payload);
            let mut bytes = Bytes::from(buf.to_vec());
            let pool = ConstantPool::decode(&mut bytes).unwrap();

            match pool.entry(1).unwrap() {
                Const::Utf8(data) => assert_eq!(data, payload),
                other => panic!("unexpected entry {other:?}"),
            }
            // Resolving such an entry as text is refused, but the bytes
            // re-encode untouched.
            assert!(pool.utf8(1).is_err());
            let mut out = BytesMut::new();
            pool.encode(&mut out);
            assert_eq!(out[3..5], (payload.len() as u16).to_be_bytes()[..]);
            assert_eq!(out[5..], *payload);
        }
    }

    #[test]
    fn oversized_utf8_intern_is_rejected() {
        let mut pool = ConstantPool::default();
        let huge = "x".repeat(u16::MAX as usize + 1);
        assert!(pool.intern_utf8(&huge).is_err());
        assert_eq!(pool.slot_count(), 0);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let mut buf = BytesMut::new();
        buf.put_u16(2);
        buf.put_u8(99);
        let mut bytes = Bytes::from(buf.to_vec());
        assert!(ConstantPool::decode(&mut bytes).is_err());
    }
}
