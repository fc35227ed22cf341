//! Finds the synthetic `access$N` methods javac emits so nested classes can reach each
//! other's private fields, and maps each one to the field it reads or writes.
//!
//! ```no_run
//! use accessors::{AccessMapCache, ClassPath};
//!
//! let mut class_path = ClassPath::new();
//! class_path.add_path("build/classes");
//!
//! let cache = AccessMapCache::new(class_path);
//! let map = cache.get("com.example.Outer")?;
//!
//! if let Some(record) = map.get("access$0") {
//!     println!("{}", record);
//! }
//! # Ok::<(), accessors::AccessError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod error;
pub mod field;
pub mod record;
pub mod repository;
pub mod scan;
pub mod signature;

pub use builder::{build_access_map, AccessMapOptions, ACCESSOR_PREFIX};
pub use cache::AccessMapCache;
pub use error::AccessError;
pub use field::{Direction, FieldAccess, FieldDescriptor};
pub use record::{AccessMap, AccessorRecord};
pub use repository::{ClassPath, ClassRepository, InMemoryClasses};
