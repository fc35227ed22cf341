use std::sync::Arc;

use parse::{
    attributes::CodeAttribute,
    classfile::{ClassFile, Resolvable},
};
use support::encoding::{EncodingFormat, ModifiedUtf8};
use tracing::{debug, trace};

use crate::{
    error::AccessError,
    record::{AccessMap, AccessorRecord},
    scan::scan_method,
    signature::is_valid_accessor,
};

/// Name prefix javac gives to synthetic accessor methods.
pub const ACCESSOR_PREFIX: &str = "access$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMapOptions {
    /// Only methods whose name starts with this prefix are considered.
    pub accessor_prefix: String,
}

impl Default for AccessMapOptions {
    fn default() -> Self {
        Self {
            accessor_prefix: ACCESSOR_PREFIX.to_string(),
        }
    }
}

/// Build the accessor map of one parsed class.
///
/// Methods that are not accessor-named, have no code, touch zero or several fields,
/// or whose signature does not fit the field are left out. When two accessors share a
/// name the later one wins.
pub fn build_access_map(
    class: &ClassFile,
    options: &AccessMapOptions,
) -> Result<Arc<AccessMap>, AccessError> {
    let class_name = class.try_name()?;
    let prefix = ModifiedUtf8::into_java(&options.accessor_prefix);
    let mut map = AccessMap::default();

    for method in class.methods.iter() {
        // Compare encoded bytes, names of non-candidates are never decoded
        if !method.name.try_resolve()?.bytes.starts_with(&prefix) {
            continue;
        }

        let name = method.try_name()?;

        if !method.flags.has_body() {
            trace!("{}.{} has no body", class_name, name);
            continue;
        }

        let Some(code) = method.attributes.find::<CodeAttribute>(&class.constant_pool)? else {
            trace!("{}.{} has no code attribute", class_name, name);
            continue;
        };

        let signature = method.try_descriptor()?;

        let Some(access) = scan_method(&code.code, &class.constant_pool)? else {
            trace!("{}.{} does not touch exactly one field", class_name, name);
            continue;
        };

        if !is_valid_accessor(&class_name, &access, &signature)? {
            trace!(
                "{}.{} {} does not fit a {} of {}",
                class_name,
                name,
                signature,
                access.direction,
                access.field
            );
            continue;
        }

        let record = AccessorRecord {
            method_name: name,
            method_signature: signature,
            field: access.field,
            direction: access.direction,
        };

        if let Some(previous) = map.insert(record) {
            debug!(
                "{}.{} {} was replaced by a later accessor of the same name",
                class_name, previous.method_name, previous.method_signature
            );
        }
    }

    debug!("{} has {} accessor(s)", class_name, map.len());

    if map.is_empty() {
        return Ok(AccessMap::empty());
    }

    Ok(Arc::new(map))
}
