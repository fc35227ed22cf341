#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use accessors::{AccessError, ClassRepository};
use parse::classfile::ClassFile;

pub mod builder;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Counts how often the wrapped repository is asked for a class.
pub struct Counting<R> {
    inner: R,
    lookups: AtomicUsize,
}

impl<R> Counting<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl<R: ClassRepository> ClassRepository for Counting<R> {
    fn lookup(&self, class_name: &str) -> Result<ClassFile, AccessError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(class_name)
    }
}
