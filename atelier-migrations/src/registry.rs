//! Ordered migration registry.
//!
//! Index is priority: migrations run in the order they were appended, and
//! that order must also be strictly ascending by version. The check runs once
//! in [`Registry::new`]; nothing sorts at runtime and nothing can be added
//! after construction.

use atelier_core::{Migration, Version};

use crate::error::RegistryError;
use crate::migrations::{
    AnnotationConfig, AnnotationDocs, DedupeProviderImport, DesignScript, IterationManifest,
    StableTokensImport, WrapAnnotationProvider,
};

pub struct Registry {
    migrations: Vec<Box<dyn Migration>>,
}

impl Registry {
    /// Build a registry, rejecting any adjacent pair that is not strictly
    /// ascending.
    pub fn new(migrations: Vec<Box<dyn Migration>>) -> Result<Self, RegistryError> {
        for (index, pair) in migrations.windows(2).enumerate() {
            let previous = pair[0].version();
            let next = pair[1].version();
            if previous >= next {
                return Err(RegistryError::OutOfOrder {
                    index: index + 1,
                    previous,
                    next,
                });
            }
        }
        Ok(Self { migrations })
    }

    /// Every migration shipped with this build, oldest first.
    ///
    /// Append new migrations at the end. Never edit or remove an existing
    /// one: consumers may depend on its exact historical predicate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(vec![
            Box::new(WrapAnnotationProvider),
            Box::new(DesignScript),
            Box::new(AnnotationDocs),
            Box::new(AnnotationConfig),
            Box::new(IterationManifest),
            Box::new(DedupeProviderImport),
            Box::new(StableTokensImport),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&dyn Migration> {
        self.migrations.get(index).map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Version of the newest migration, if any.
    pub fn latest(&self) -> Option<Version> {
        self.migrations.last().map(|m| m.version())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.migrations.iter().map(|m| m.version().to_string()))
            .finish()
    }
}
