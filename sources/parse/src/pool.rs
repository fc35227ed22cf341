use std::sync::Arc;

use anyhow::{anyhow, Result};
use enum_as_inner::EnumAsInner;
use parking_lot::RwLock;
use support::encoding::{EncodingFormat, ModifiedUtf8};

use crate::classfile::Addressed;
use crate::classfile::Resolvable;

#[derive(Debug, Clone)]
pub struct ConstantPool {
    pub entries: Arc<RwLock<Vec<ConstantEntry>>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(vec![])),
        }
    }

    pub fn insert(&mut self, entry: ConstantEntry) {
        let mut pool = self.entries.write();
        pool.push(entry)
    }

    /// Number of slots in the pool, not counting the unused slot 0.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an entry by its 1-based constant pool index.
    pub fn get(&self, index: u16) -> Result<ConstantEntry> {
        self.address::<ConstantEntry>(index).try_resolve()
    }

    pub fn address<T>(&self, for_index: u16) -> Addressed<T> {
        Addressed::from(for_index, Arc::clone(&self.entries))
    }

    pub(crate) fn perform_format_checking(&self) -> Result<()> {
        let entries = self.entries.read();
        for item in entries.iter() {
            match item {
                ConstantEntry::Class(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Field(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::Method(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::InterfaceMethod(data) => {
                    data.class.try_resolve()?;
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::String(data) => {
                    data.string.try_resolve()?;
                }
                ConstantEntry::Integer(_) => {}
                ConstantEntry::Float(_) => {}
                ConstantEntry::Long(_) => {}
                ConstantEntry::Double(_) => {}
                ConstantEntry::NameAndType(data) => {
                    data.name.try_resolve()?;
                    data.descriptor.try_resolve()?;
                }
                ConstantEntry::Utf8(_) => {}
                ConstantEntry::MethodHandle(_) => {}
                ConstantEntry::MethodType(data) => {
                    data.descriptor.try_resolve()?;
                }
                ConstantEntry::Dynamic(data) => {
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::InvokeDynamic(data) => {
                    data.name_and_type.try_resolve()?;
                }
                ConstantEntry::Module(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Package(data) => {
                    data.name.try_resolve()?;
                }
                ConstantEntry::Reserved => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Class,
    Field,
    Method,
    InterfaceMethod,
    String,
    Integer,
    Float,
    Long,
    Double,
    NameAndType,
    Utf8,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantTag {
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::Field,
            10 => ConstantTag::Method,
            11 => ConstantTag::InterfaceMethod,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return Err(anyhow!("{} is an unknown tag", tag)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConstantClass {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantField {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantMethod {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantInterfaceMethod {
    pub tag: ConstantTag,
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}
#[derive(Debug, Clone)]
pub struct ConstantString {
    pub tag: ConstantTag,
    pub string: Addressed<ConstantUtf8>,
}
#[derive(Debug, Clone)]
pub struct ConstantInteger {
    pub tag: ConstantTag,
    pub bytes: u32,
}

#[derive(Debug, Clone)]
pub struct ConstantFloat {
    pub tag: ConstantTag,
    pub bytes: f32,
}

#[derive(Debug, Clone)]
pub struct ConstantLong {
    pub tag: ConstantTag,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ConstantDouble {
    pub tag: ConstantTag,
    pub bytes: f64,
}
#[derive(Debug, Clone)]
pub struct ConstantNameAndType {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantUtf8 {
    pub tag: ConstantTag,
    pub length: u16,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodHandle {
    pub tag: ConstantTag,
    pub kind: u8,
    pub index: u16,
}
#[derive(Debug, Clone)]
pub struct ConstantMethodType {
    pub tag: ConstantTag,
    pub descriptor: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantDynamic {
    pub tag: ConstantTag,
    pub method_index: u16,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantInvokeDynamic {
    pub tag: ConstantTag,
    pub method_index: u16,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantModule {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantPackage {
    pub tag: ConstantTag,
    pub name: Addressed<ConstantUtf8>,
}

impl ConstantUtf8 {
    /// Decode the modified UTF-8 the class file stores.
    pub fn try_string(self) -> Result<String> {
        ModifiedUtf8::from_java(&self.bytes)
    }
}

impl ConstantClass {
    /// The class name in internal form, e.g. `java/lang/Object`.
    pub fn try_name(&self) -> Result<String> {
        self.name.try_resolve()?.try_string()
    }
}

impl ConstantNameAndType {
    pub fn try_name(&self) -> Result<String> {
        self.name.try_resolve()?.try_string()
    }

    pub fn try_descriptor(&self) -> Result<String> {
        self.descriptor.try_resolve()?.try_string()
    }
}

impl ConstantField {
    /// Resolve the owning class, field name and field descriptor of this reference.
    pub fn try_parts(&self) -> Result<(String, String, String)> {
        let class_name = self.class.try_resolve()?.try_name()?;
        let name_and_type = self.name_and_type.try_resolve()?;

        Ok((
            class_name,
            name_and_type.try_name()?,
            name_and_type.try_descriptor()?,
        ))
    }
}

#[derive(EnumAsInner, Clone, Debug)]
pub enum ConstantEntry {
    Class(ConstantClass),
    Field(ConstantField),
    Method(ConstantMethod),
    InterfaceMethod(ConstantInterfaceMethod),
    String(ConstantString),
    Integer(ConstantInteger),
    Float(ConstantFloat),
    Long(ConstantLong),
    Double(ConstantDouble),
    NameAndType(ConstantNameAndType),
    Utf8(ConstantUtf8),
    MethodHandle(ConstantMethodHandle),
    MethodType(ConstantMethodType),
    Dynamic(ConstantDynamic),
    InvokeDynamic(ConstantInvokeDynamic),
    Module(ConstantModule),
    Package(ConstantPackage),
    Reserved,
}

impl ConstantEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            ConstantEntry::Class(_) => "Class",
            ConstantEntry::Field(_) => "Fieldref",
            ConstantEntry::Method(_) => "Methodref",
            ConstantEntry::InterfaceMethod(_) => "InterfaceMethodref",
            ConstantEntry::String(_) => "String",
            ConstantEntry::Integer(_) => "Integer",
            ConstantEntry::Float(_) => "Float",
            ConstantEntry::Long(_) => "Long",
            ConstantEntry::Double(_) => "Double",
            ConstantEntry::NameAndType(_) => "NameAndType",
            ConstantEntry::Utf8(_) => "Utf8",
            ConstantEntry::MethodHandle(_) => "MethodHandle",
            ConstantEntry::MethodType(_) => "MethodType",
            ConstantEntry::Dynamic(_) => "Dynamic",
            ConstantEntry::InvokeDynamic(_) => "InvokeDynamic",
            ConstantEntry::Module(_) => "Module",
            ConstantEntry::Package(_) => "Package",
            ConstantEntry::Reserved => "<reserved>",
        }
    }
}
