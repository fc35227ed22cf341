use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    builder::{build_access_map, AccessMapOptions},
    error::AccessError,
    record::AccessMap,
    repository::{internal_name, ClassRepository},
};

/// Accessor maps for one analysis session, built on first request and kept forever.
///
/// Classes are assumed not to change while the cache is alive, so entries are never
/// rebuilt or evicted. Two threads asking for the same uncached class may both build
/// it; whichever result lands first is kept and handed to both.
pub struct AccessMapCache<R> {
    repository: R,
    options: AccessMapOptions,
    maps: RwLock<HashMap<String, Arc<AccessMap>>>,
}

impl<R: ClassRepository> AccessMapCache<R> {
    pub fn new(repository: R) -> Self {
        Self::with_options(repository, AccessMapOptions::default())
    }

    pub fn with_options(repository: R, options: AccessMapOptions) -> Self {
        Self {
            repository,
            options,
            maps: RwLock::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn options(&self) -> &AccessMapOptions {
        &self.options
    }

    /// The accessor map of `class_name`, which may be in internal or binary form.
    ///
    /// Fails with [`AccessError::ClassNotFound`] when the repository does not know the
    /// class. Failures are not cached.
    pub fn get(&self, class_name: &str) -> Result<Arc<AccessMap>, AccessError> {
        let name = internal_name(class_name);

        if let Some(map) = self.maps.read().get(&name) {
            debug!("Fast path: {}", name);
            return Ok(Arc::clone(map));
        }

        debug!("Slow path: {}", name);

        let class = self.repository.lookup(&name)?;
        let map = build_access_map(&class, &self.options)?;

        let mut maps = self.maps.write();
        Ok(Arc::clone(maps.entry(name).or_insert(map)))
    }

    /// Number of classes cached so far.
    pub fn len(&self) -> usize {
        self.maps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.read().is_empty()
    }
}
