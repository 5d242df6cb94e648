//! # Class-File Model
//!
//! Binary model of a compiled JVM class, decoded once into typed structures
//! and re-encoded exactly once after all passes have run.
//!
//! This module is the foundation of the engine: every validation and
//! transform pass operates on the [`ClassFile`] model instead of re-parsing
//! the raw bytes per concern, and the whole file is committed in a single
//! write.
//!
//! ## Components
//! - **ClassFile**: top-level structure with pool, members, and attributes
//! - **ConstantPool**: typed pool entries with append-only interning
//! - **TypeTag**: field descriptor → instruction family mapping
//! - **Annotations**: on-demand marker annotation scanning
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Minor(2)] [Major(2)] [ConstantPool] [Access(2)]
//! [This(2)] [Super(2)] [Interfaces] [Fields] [Methods] [Attributes]
//! ```
//!
//! ## Round-trip guarantees
//! - Attributes the engine does not interpret pass through byte-for-byte.
//! - The constant pool is append-only: entries are never removed or
//!   renumbered, so indices embedded in raw attribute bytes stay valid.

pub mod annotations;
pub mod constant_pool;
pub mod descriptor;

pub use constant_pool::{Const, ConstantPool};
pub use descriptor::TypeTag;

use crate::error::{Result, WeaverError};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Magic number identifying a class file.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Member/class access and property flags used by the engine.
pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_SYNTHETIC: u16 = 0x1000;

pub(crate) fn take_u8(buf: &mut Bytes, what: &str) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(WeaverError::ClassFormat(format!("truncated {what}")));
    }
    Ok(buf.get_u8())
}

pub(crate) fn take_u16(buf: &mut Bytes, what: &str) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(WeaverError::ClassFormat(format!("truncated {what}")));
    }
    Ok(buf.get_u16())
}

pub(crate) fn take_u32(buf: &mut Bytes, what: &str) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(WeaverError::ClassFormat(format!("truncated {what}")));
    }
    Ok(buf.get_u32())
}

pub(crate) fn take_bytes(buf: &mut Bytes, len: usize, what: &str) -> Result<Bytes> {
    if buf.remaining() < len {
        return Err(WeaverError::ClassFormat(format!("truncated {what}")));
    }
    Ok(buf.copy_to_bytes(len))
}

/// A named attribute whose payload is kept as raw bytes.
///
/// The engine only interprets the attributes it owns; everything else
/// (Code of existing methods, signatures, inner classes, ...) round-trips
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let name_index = take_u16(buf, "attribute name index")?;
        let len = take_u32(buf, "attribute length")? as usize;
        let info = take_bytes(buf, len, "attribute payload")?.to_vec();
        Ok(AttributeInfo { name_index, info })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.name_index);
        buf.put_u32(self.info.len() as u32);
        buf.put_slice(&self.info);
    }
}

/// A field or method entry. Both share the same binary shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    fn decode(buf: &mut Bytes, what: &str) -> Result<Self> {
        let access_flags = take_u16(buf, what)?;
        let name_index = take_u16(buf, what)?;
        let descriptor_index = take_u16(buf, what)?;
        let count = take_u16(buf, what)? as usize;
        let mut attributes = Vec::with_capacity(count);
        for _ in 0..count {
            attributes.push(AttributeInfo::decode(buf)?);
        }
        Ok(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.access_flags);
        buf.put_u16(self.name_index);
        buf.put_u16(self.descriptor_index);
        buf.put_u16(self.attributes.len() as u16);
        for attr in &self.attributes {
            attr.encode(buf);
        }
    }

    /// Whether the member carries all bits of `flags`.
    pub fn has_flags(&self, flags: u16) -> bool {
        self.access_flags & flags == flags
    }
}

/// In-memory model of one class file.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    /// Decode a whole class file from its binary form.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut buf = Bytes::copy_from_slice(bytes);

        let magic = take_u32(&mut buf, "magic")?;
        if magic != MAGIC {
            return Err(WeaverError::ClassFormat(format!(
                "bad magic number {magic:#010x}"
            )));
        }

        let minor_version = take_u16(&mut buf, "minor version")?;
        let major_version = take_u16(&mut buf, "major version")?;
        let pool = ConstantPool::decode(&mut buf)?;

        let access_flags = take_u16(&mut buf, "access flags")?;
        let this_class = take_u16(&mut buf, "this class")?;
        let super_class = take_u16(&mut buf, "super class")?;

        let interface_count = take_u16(&mut buf, "interface count")? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(take_u16(&mut buf, "interface entry")?);
        }

        let field_count = take_u16(&mut buf, "field count")? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(MemberInfo::decode(&mut buf, "field entry")?);
        }

        let method_count = take_u16(&mut buf, "method count")? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(MemberInfo::decode(&mut buf, "method entry")?);
        }

        let attribute_count = take_u16(&mut buf, "attribute count")? as usize;
        let mut attributes = Vec::with_capacity(attribute_count);
        for _ in 0..attribute_count {
            attributes.push(AttributeInfo::decode(&mut buf)?);
        }

        if buf.has_remaining() {
            return Err(WeaverError::ClassFormat(format!(
                "{} trailing bytes after class structure",
                buf.remaining()
            )));
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Encode the model back into its binary form.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(1024);
        buf.put_u32(MAGIC);
        buf.put_u16(self.minor_version);
        buf.put_u16(self.major_version);
        self.pool.encode(&mut buf);
        buf.put_u16(self.access_flags);
        buf.put_u16(self.this_class);
        buf.put_u16(self.super_class);
        buf.put_u16(self.interfaces.len() as u16);
        for index in &self.interfaces {
            buf.put_u16(*index);
        }
        buf.put_u16(self.fields.len() as u16);
        for field in &self.fields {
            field.encode(&mut buf);
        }
        buf.put_u16(self.methods.len() as u16);
        for method in &self.methods {
            method.encode(&mut buf);
        }
        buf.put_u16(self.attributes.len() as u16);
        for attr in &self.attributes {
            attr.encode(&mut buf);
        }
        buf.to_vec()
    }

    /// Internal binary name of this class.
    pub fn this_class_name(&self) -> Result<&str> {
        self.pool.class_name(self.this_class)
    }

    /// Internal binary name of the superclass, `None` for `java/lang/Object`
    /// itself.
    pub fn super_class_name(&self) -> Result<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.pool.class_name(self.super_class).map(Some)
    }

    /// Whether the class directly implements the named interface.
    pub fn implements(&self, internal_name: &str) -> Result<bool> {
        for index in &self.interfaces {
            if self.pool.class_name(*index)? == internal_name {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
