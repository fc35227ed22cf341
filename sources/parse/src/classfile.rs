use crate::{
    attributes::Attributes,
    flags::{ClassFileAccessFlags, FieldAccessFlags, MethodAccessFlags},
    pool::{
        ConstantClass, ConstantEntry, ConstantField, ConstantNameAndType, ConstantPool,
        ConstantUtf8,
    },
};
use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::{fmt, marker::PhantomData, sync::Arc};

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub constant_pool: ConstantPool,
    pub meta_data: MetaData,

    pub access_flags: ClassFileAccessFlags,
    pub this_class: Addressed<ConstantClass>,
    pub super_class: Option<Addressed<ConstantClass>>,

    pub interfaces: Interfaces,
    pub fields: Fields,
    pub methods: Methods,
    pub attributes: Attributes,
}

impl ClassFile {
    /// The name of this class in internal form, e.g. `com/example/Outer$Inner`.
    pub fn try_name(&self) -> Result<String> {
        self.this_class.try_resolve()?.try_name()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub flags: FieldAccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}
#[derive(Debug, Clone)]
pub struct Fields {
    pub(crate) values: Vec<Field>,
}

impl Fields {
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub flags: MethodAccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}

impl Method {
    pub fn try_name(&self) -> Result<String> {
        self.name.try_resolve()?.try_string()
    }

    pub fn try_descriptor(&self) -> Result<String> {
        self.descriptor.try_resolve()?.try_string()
    }
}

#[derive(Debug, Clone)]
pub struct Methods {
    pub(crate) values: Vec<Method>,
}

impl Methods {
    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Interfaces {
    pub values: Vec<Addressed<ConstantClass>>,
}

#[derive(Debug, Clone)]
pub struct MetaData {
    pub minor_version: u16,
    pub major_version: u16,
}

/// A lazily resolved reference into the constant pool, typed by the entry kind it must point at.
#[derive(Clone)]
pub struct Addressed<T> {
    phantom: PhantomData<T>,

    index: u16,
    entries: Arc<RwLock<Vec<ConstantEntry>>>,
}

impl<T> Addressed<T> {
    pub fn from(index: u16, pool: Arc<RwLock<Vec<ConstantEntry>>>) -> Self {
        Self {
            phantom: PhantomData,
            index,
            entries: pool,
        }
    }

    fn entry(&self) -> Result<ConstantEntry> {
        // The pool is indexed from 1, slot 0 is never stored
        let slot = self
            .index
            .checked_sub(1)
            .ok_or(anyhow!("constant pool index 0 is not addressable"))?;

        let entries = self.entries.read();
        entries
            .get(slot as usize)
            .cloned()
            .ok_or(anyhow!("no value found @ {}", self.index))
    }
}

impl<T> fmt::Debug for Addressed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addressed {{ {} }}", self.index)
    }
}

pub trait Resolvable<T> {
    fn try_resolve(&self) -> Result<T>;
}

macro_rules! address {
    ($type: ty, $enum: ident) => {
        impl Resolvable<$type> for Addressed<$type> {
            fn try_resolve(&self) -> anyhow::Result<$type> {
                match self.entry()? {
                    ConstantEntry::$enum(data) => Ok(data),
                    value => Err(anyhow!(
                        "expected {} got {} @ {}",
                        stringify!($enum),
                        value.kind(),
                        self.index
                    )),
                }
            }
        }
    };
}

impl Resolvable<ConstantEntry> for Addressed<ConstantEntry> {
    fn try_resolve(&self) -> Result<ConstantEntry> {
        self.entry()
    }
}

address!(ConstantClass, Class);
address!(ConstantField, Field);
address!(ConstantNameAndType, NameAndType);
address!(ConstantUtf8, Utf8);
