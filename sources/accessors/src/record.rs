use std::{collections::HashMap, fmt, sync::Arc};

use lazy_static::lazy_static;

use crate::field::{Direction, FieldDescriptor};

/// Calling `method_name` is equivalent to reading or writing `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorRecord {
    pub method_name: String,
    pub method_signature: String,
    pub field: FieldDescriptor,
    pub direction: Direction,
}

impl AccessorRecord {
    pub fn is_read(&self) -> bool {
        self.direction.is_read()
    }
}

impl fmt::Display for AccessorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            self.method_name, self.method_signature, self.direction, self.field
        )
    }
}

/// Accessor method name to record, for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessMap {
    records: HashMap<String, AccessorRecord>,
}

lazy_static! {
    static ref EMPTY: Arc<AccessMap> = Arc::new(AccessMap::default());
}

impl AccessMap {
    /// The map shared by every class without accessors.
    pub fn empty() -> Arc<AccessMap> {
        Arc::clone(&EMPTY)
    }

    pub(crate) fn insert(&mut self, record: AccessorRecord) -> Option<AccessorRecord> {
        self.records.insert(record.method_name.clone(), record)
    }

    pub fn get(&self, method_name: &str) -> Option<&AccessorRecord> {
        self.records.get(method_name)
    }

    pub fn contains(&self, method_name: &str) -> bool {
        self.records.contains_key(method_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by method name, for stable output.
    pub fn sorted(&self) -> Vec<&AccessorRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.method_name.cmp(&b.method_name));
        records
    }
}
