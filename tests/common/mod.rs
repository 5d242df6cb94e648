#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]
//! Shared fixture builder: compiled packet classes assembled through the
//! crate's class-file model, so tests need no Java toolchain.

use bytes::{BufMut, BytesMut};
use packet_weaver::classfile::{
    AttributeInfo, ClassFile, ConstantPool, MemberInfo, ACC_PUBLIC, ACC_SUPER,
};

pub const RUNTIME_VISIBLE: &str = "RuntimeVisibleAnnotations";

/// Builder for a minimal but structurally complete packet class.
pub struct TestClass {
    class: ClassFile,
}

impl TestClass {
    pub fn new(binary_name: &str) -> Self {
        let mut pool = ConstantPool::default();
        let this_class = pool.intern_class(binary_name).unwrap();
        let super_class = pool.intern_class("java/lang/Object").unwrap();
        let mut test_class = TestClass {
            class: ClassFile {
                minor_version: 0,
                major_version: 52,
                pool,
                access_flags: ACC_PUBLIC | ACC_SUPER,
                this_class,
                super_class,
                interfaces: vec![],
                fields: vec![],
                methods: vec![],
                attributes: vec![],
            },
        };
        test_class.add_method("<init>", "()V", ACC_PUBLIC);
        test_class
    }

    /// Replace the superclass.
    pub fn extends(mut self, binary_name: &str) -> Self {
        self.class.super_class = self.class.pool.intern_class(binary_name).unwrap();
        self
    }

    /// Add a directly implemented interface.
    pub fn implements(mut self, binary_name: &str) -> Self {
        let index = self.class.pool.intern_class(binary_name).unwrap();
        self.class.interfaces.push(index);
        self
    }

    /// Drop the public no-argument constructor added by `new`.
    pub fn without_default_constructor(mut self) -> Self {
        let pool = &self.class.pool;
        self.class
            .methods
            .retain(|m| pool.utf8(m.name_index).unwrap() != "<init>");
        self
    }

    /// Add a field with the given access flags.
    pub fn field(mut self, name: &str, descriptor: &str, access_flags: u16) -> Self {
        let name_index = self.class.pool.intern_utf8(name).unwrap();
        let descriptor_index = self.class.pool.intern_utf8(descriptor).unwrap();
        self.class.fields.push(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![],
        });
        self
    }

    /// Add a field carrying a marker annotation.
    pub fn annotated_field(
        mut self,
        name: &str,
        descriptor: &str,
        access_flags: u16,
        annotation: &str,
    ) -> Self {
        let attr = annotation_attribute(&mut self.class.pool, annotation, None);
        let name_index = self.class.pool.intern_utf8(name).unwrap();
        let descriptor_index = self.class.pool.intern_utf8(descriptor).unwrap();
        self.class.fields.push(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![attr],
        });
        self
    }

    /// Attach the packet marker annotation with the given id.
    pub fn packet_id(mut self, annotation: &str, id: i32) -> Self {
        let attr = annotation_attribute(&mut self.class.pool, annotation, Some(("value", id)));
        self.class.attributes.push(attr);
        self
    }

    /// Add a method with an empty body placeholder.
    pub fn add_method(&mut self, name: &str, descriptor: &str, access_flags: u16) {
        let name_index = self.class.pool.intern_utf8(name).unwrap();
        let descriptor_index = self.class.pool.intern_utf8(descriptor).unwrap();
        self.class.methods.push(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes: vec![],
        });
    }

    pub fn method(mut self, name: &str, descriptor: &str, access_flags: u16) -> Self {
        self.add_method(name, descriptor, access_flags);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.class.encode()
    }
}

/// Encode a RuntimeVisibleAnnotations attribute holding one annotation,
/// optionally with a single integer element.
fn annotation_attribute(
    pool: &mut ConstantPool,
    descriptor: &str,
    int_element: Option<(&str, i32)>,
) -> AttributeInfo {
    let name_index = pool.intern_utf8(RUNTIME_VISIBLE).unwrap();
    let type_index = pool.intern_utf8(descriptor).unwrap();
    let mut info = BytesMut::new();
    info.put_u16(1); // one annotation
    info.put_u16(type_index);
    match int_element {
        Some((element, value)) => {
            let element_index = pool.intern_utf8(element).unwrap();
            let value_index = pool.intern_integer(value).unwrap();
            info.put_u16(1);
            info.put_u16(element_index);
            info.put_u8(b'I');
            info.put_u16(value_index);
        }
        None => info.put_u16(0),
    }
    AttributeInfo {
        name_index,
        info: info.to_vec(),
    }
}

/// Method names of a decoded class, in declaration order.
pub fn method_names(class: &ClassFile) -> Vec<String> {
    class
        .methods
        .iter()
        .map(|m| class.pool.utf8(m.name_index).unwrap().to_owned())
        .collect()
}

/// Decoded body of one method's Code attribute:
/// `(max_stack, max_locals, code)`.
pub fn method_code(class: &ClassFile, method_name: &str) -> (u16, u16, Vec<u8>) {
    let method = class
        .methods
        .iter()
        .find(|m| class.pool.utf8(m.name_index).unwrap() == method_name)
        .unwrap_or_else(|| panic!("method {method_name} not found"));
    let code = method
        .attributes
        .iter()
        .find(|a| class.pool.utf8(a.name_index).unwrap() == "Code")
        .expect("method has a Code attribute");
    let info = &code.info;
    let max_stack = u16::from_be_bytes([info[0], info[1]]);
    let max_locals = u16::from_be_bytes([info[2], info[3]]);
    let len = u32::from_be_bytes([info[4], info[5], info[6], info[7]]) as usize;
    (max_stack, max_locals, info[8..8 + len].to_vec())
}
