//! Accessor method synthesis.
//!
//! Appends one getter and one setter per eligible field, marked
//! `ACC_PUBLIC | ACC_SYNTHETIC`: publicly invocable by the runtime
//! serializer, invisible to ordinary source-level lookup. Bodies are
//! straight-line, so no StackMapTable is required and stack/local sizes
//! follow directly from the field's type width.
//!
//! ```text
//! $GET_x: aload_0; getfield #ref; <t>return
//! $SET_x: aload_0; <t>load_1; putfield #ref; return
//! ```

use crate::classfile::{AttributeInfo, ClassFile, MemberInfo, ACC_PUBLIC, ACC_SYNTHETIC};
use crate::config::{ACCESSORS_ATTRIBUTE, GETTER_PREFIX, SETTER_PREFIX};
use crate::error::Result;
use crate::weave::PacketDescriptor;
use bytes::{BufMut, BytesMut};

const ALOAD_0: u8 = 0x2A;
const GETFIELD: u8 = 0xB4;
const PUTFIELD: u8 = 0xB5;
const RETURN: u8 = 0xB1;

/// Append fresh accessor pairs and record their names in the
/// generated-members attribute.
pub fn synthesize_accessors(class: &mut ClassFile, packet: &PacketDescriptor) -> Result<()> {
    let mut generated = Vec::with_capacity(packet.fields.len() * 2);

    for field in &packet.fields {
        let this_class = class.this_class;
        let field_ref =
            class
                .pool
                .intern_field_ref(this_class, &field.name, &field.descriptor)?;
        let [ref_hi, ref_lo] = field_ref.to_be_bytes();
        let width = field.type_tag.width();

        let getter_body = vec![
            ALOAD_0,
            GETFIELD,
            ref_hi,
            ref_lo,
            field.type_tag.return_opcode(),
        ];
        push_method(
            class,
            &format!("{GETTER_PREFIX}{}", field.name),
            &format!("(){}", field.descriptor),
            width,
            1,
            getter_body,
            &mut generated,
        )?;

        let setter_body = vec![
            ALOAD_0,
            field.type_tag.load_arg_opcode(),
            PUTFIELD,
            ref_hi,
            ref_lo,
            RETURN,
        ];
        push_method(
            class,
            &format!("{SETTER_PREFIX}{}", field.name),
            &format!("({})V", field.descriptor),
            1 + width,
            1 + width,
            setter_body,
            &mut generated,
        )?;
    }

    record_generated_members(class, &generated)
}

fn push_method(
    class: &mut ClassFile,
    name: &str,
    descriptor: &str,
    max_stack: u16,
    max_locals: u16,
    body: Vec<u8>,
    generated: &mut Vec<u16>,
) -> Result<()> {
    let name_index = class.pool.intern_utf8(name)?;
    let descriptor_index = class.pool.intern_utf8(descriptor)?;
    let code_name_index = class.pool.intern_utf8("Code")?;

    let mut info = BytesMut::with_capacity(12 + body.len());
    info.put_u16(max_stack);
    info.put_u16(max_locals);
    info.put_u32(body.len() as u32);
    info.put_slice(&body);
    info.put_u16(0); // exception table
    info.put_u16(0); // nested attributes

    class.methods.push(MemberInfo {
        access_flags: ACC_PUBLIC | ACC_SYNTHETIC,
        name_index,
        descriptor_index,
        attributes: vec![AttributeInfo {
            name_index: code_name_index,
            info: info.to_vec(),
        }],
    });
    generated.push(name_index);
    Ok(())
}

/// Append the class attribute listing generated method names, read back by
/// the stripper on the next run.
fn record_generated_members(class: &mut ClassFile, generated: &[u16]) -> Result<()> {
    let name_index = class.pool.intern_utf8(ACCESSORS_ATTRIBUTE)?;
    let mut info = BytesMut::with_capacity(2 + generated.len() * 2);
    info.put_u16(generated.len() as u16);
    for index in generated {
        info.put_u16(*index);
    }
    class.attributes.push(AttributeInfo {
        name_index,
        info: info.to_vec(),
    });
    Ok(())
}
