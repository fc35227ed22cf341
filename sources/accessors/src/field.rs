use std::fmt;

/// A field as named by a field reference constant.
///
/// Static and instance fields share this one type. Two descriptors are the same field
/// when all four parts are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Owning class in internal form, e.g. `com/example/Outer`.
    pub owner_class: String,
    pub name: String,
    /// Field type descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub type_signature: String,
    pub is_static: bool,
}

impl FieldDescriptor {
    pub fn new(
        owner_class: impl Into<String>,
        name: impl Into<String>,
        type_signature: impl Into<String>,
        is_static: bool,
    ) -> Self {
        Self {
            owner_class: owner_class.into(),
            name: name.into(),
            type_signature: type_signature.into(),
            is_static,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_static { "static" } else { "instance" };
        write!(
            f,
            "{} {}.{} {}",
            kind, self.owner_class, self.name, self.type_signature
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub fn is_read(&self) -> bool {
        matches!(self, Direction::Read)
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Direction::Write)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// The single field touch found in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccess {
    pub field: FieldDescriptor,
    pub direction: Direction,
}
