use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use anyhow::Context;
use parse::{classfile::ClassFile, parser::Parser};
use tracing::debug;

use crate::error::AccessError;

/// Resolves class names to parsed class files.
pub trait ClassRepository {
    /// Look up `class_name`, given in internal (`a/b/C`) or binary (`a.b.C`) form.
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError>;
}

impl<R: ClassRepository + ?Sized> ClassRepository for &R {
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError> {
        (**self).lookup(class_name)
    }
}

impl<R: ClassRepository + ?Sized> ClassRepository for Arc<R> {
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError> {
        (**self).lookup(class_name)
    }
}

/// `com.example.Outer$Inner` -> `com/example/Outer$Inner`
pub fn internal_name(class_name: &str) -> String {
    class_name.replace('.', "/")
}

fn parse_class(bytes: &[u8], origin: &str) -> Result<ClassFile, AccessError> {
    let class = Parser::new(bytes)
        .parse()
        .with_context(|| format!("could not parse {}", origin))?;

    Ok(class)
}

/// Directories searched in order for `<internal name>.class`.
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    class_path: Vec<PathBuf>,
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.class_path.push(path.into());
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.class_path
    }

    fn resolve_name(&self, name: &str) -> Option<PathBuf> {
        self.class_path
            .iter()
            .map(|root| root.join(name))
            .find(|path| path.is_file())
    }
}

impl ClassRepository for ClassPath {
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError> {
        let formatted_name = format!("{}.class", internal_name(class_name));

        let Some(path) = self.resolve_name(&formatted_name) else {
            return Err(AccessError::ClassNotFound(class_name.to_string()));
        };

        debug!("Loading {} from {}", class_name, path.display());

        let bytes = fs::read(&path).map_err(|source| AccessError::Io {
            path: path.clone(),
            source,
        })?;

        parse_class(&bytes, &path.display().to_string())
    }
}

/// Raw class bytes held in memory, parsed on every lookup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClasses {
    classes: HashMap<String, Vec<u8>>,
}

impl InMemoryClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: &str, bytes: Vec<u8>) -> &mut Self {
        self.classes.insert(internal_name(class_name), bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassRepository for InMemoryClasses {
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError> {
        let name = internal_name(class_name);
        let bytes = self
            .classes
            .get(&name)
            .ok_or_else(|| AccessError::ClassNotFound(class_name.to_string()))?;

        parse_class(bytes, &name)
    }
}
