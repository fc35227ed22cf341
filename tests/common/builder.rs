// Emits real class file bytes, so tests exercise the parser and the decoder as well as
// the accessor analysis. Only the structures the analysis reads are supported.

use std::collections::HashMap;

use support::encoding::{EncodingFormat, ModifiedUtf8};

pub mod op {
    pub const ICONST_0: u8 = 0x03;
    pub const ILOAD_1: u8 = 0x1b;
    pub const ALOAD_0: u8 = 0x2a;
    pub const ALOAD_1: u8 = 0x2b;
    pub const DUP: u8 = 0x59;
    pub const DUP_X1: u8 = 0x5a;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const IRETURN: u8 = 0xac;
    pub const ARETURN: u8 = 0xb0;
    pub const RETURN: u8 = 0xb1;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
}

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

/// An instruction with a constant pool operand.
pub fn indexed(opcode: u8, index: u16) -> Vec<u8> {
    let [hi, lo] = index.to_be_bytes();
    vec![opcode, hi, lo]
}

pub fn code(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

pub struct ClassBuilder {
    this_class: u16,
    super_class: u16,
    pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    fields: Vec<u8>,
    field_count: u16,
    methods: Vec<u8>,
    method_count: u16,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        let mut builder = Self {
            this_class: 0,
            super_class: 0,
            pool: Vec::new(),
            next_index: 1,
            utf8s: HashMap::new(),
            fields: Vec::new(),
            field_count: 0,
            methods: Vec::new(),
            method_count: 0,
        };

        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.extend_from_slice(bytes);
        self.next_index += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }

        let index = self.raw_utf8(&ModifiedUtf8::into_java(value));
        self.utf8s.insert(value.to_string(), index);
        index
    }

    /// A Utf8 constant holding `encoded` as is, valid or not.
    pub fn raw_utf8(&mut self, encoded: &[u8]) -> u16 {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        bytes.extend_from_slice(encoded);
        self.entry(&bytes, 1)
    }

    fn pair(&mut self, tag: u8, first: u16, second: u16) -> u16 {
        let mut bytes = vec![tag];
        bytes.extend_from_slice(&first.to_be_bytes());
        bytes.extend_from_slice(&second.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        let mut bytes = vec![7];
        bytes.extend_from_slice(&name.to_be_bytes());
        self.entry(&bytes, 1)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.pair(12, name, descriptor)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.pair(9, class, name_and_type)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.pair(10, class, name_and_type)
    }

    /// A long constant, which takes up two pool slots.
    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.extend_from_slice(&value.to_be_bytes());
        self.entry(&bytes, 2)
    }

    /// Fill the pool with filler strings until the next entry lands at `index` or later.
    pub fn pad_pool_to(&mut self, index: u16) -> &mut Self {
        let mut n = 0;
        while self.next_index < index {
            self.utf8(&format!("pad{}", n));
            n += 1;
        }
        self
    }

    pub fn field(&mut self, flags: u16, name: &str, descriptor: &str) -> &mut Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);

        self.fields.extend_from_slice(&flags.to_be_bytes());
        self.fields.extend_from_slice(&name.to_be_bytes());
        self.fields.extend_from_slice(&descriptor.to_be_bytes());
        self.fields.extend_from_slice(&0_u16.to_be_bytes());
        self.field_count += 1;
        self
    }

    pub fn method(&mut self, flags: u16, name: &str, descriptor: &str, body: Option<&[u8]>) -> &mut Self {
        let name = self.utf8(name);
        self.method_named(flags, name, descriptor, body)
    }

    /// Like [`ClassBuilder::method`], with the name taken from an existing Utf8 constant.
    pub fn method_named(&mut self, flags: u16, name: u16, descriptor: &str, body: Option<&[u8]>) -> &mut Self {
        let descriptor = self.utf8(descriptor);

        self.methods.extend_from_slice(&flags.to_be_bytes());
        self.methods.extend_from_slice(&name.to_be_bytes());
        self.methods.extend_from_slice(&descriptor.to_be_bytes());

        match body {
            None => self.methods.extend_from_slice(&0_u16.to_be_bytes()),
            Some(body) => {
                let code_name = self.utf8("Code");

                let mut attribute = Vec::new();
                attribute.extend_from_slice(&4_u16.to_be_bytes()); // max_stack
                attribute.extend_from_slice(&4_u16.to_be_bytes()); // max_locals
                attribute.extend_from_slice(&(body.len() as u32).to_be_bytes());
                attribute.extend_from_slice(body);
                attribute.extend_from_slice(&0_u16.to_be_bytes()); // exception table
                attribute.extend_from_slice(&0_u16.to_be_bytes()); // attributes

                self.methods.extend_from_slice(&1_u16.to_be_bytes());
                self.methods.extend_from_slice(&code_name.to_be_bytes());
                self.methods.extend_from_slice(&(attribute.len() as u32).to_be_bytes());
                self.methods.extend_from_slice(&attribute);
            }
        }

        self.method_count += 1;
        self
    }

    /// A static method with a body, the shape javac gives accessors.
    pub fn accessor(&mut self, name: &str, descriptor: &str, body: &[u8]) -> &mut Self {
        self.method(ACC_STATIC | ACC_SYNTHETIC, name, descriptor, Some(body))
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABE_u32.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes());
        out.extend_from_slice(&52_u16.to_be_bytes());

        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.pool);

        out.extend_from_slice(&(ACC_PUBLIC | 0x0020).to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes()); // interfaces

        out.extend_from_slice(&self.field_count.to_be_bytes());
        out.extend_from_slice(&self.fields);

        out.extend_from_slice(&self.method_count.to_be_bytes());
        out.extend_from_slice(&self.methods);

        out.extend_from_slice(&0_u16.to_be_bytes()); // attributes
        out
    }
}
