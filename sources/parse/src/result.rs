use anyhow::Result;

use crate::classfile::ClassFile;

pub type ParseResult = Result<ClassFile>;
