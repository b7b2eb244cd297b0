//! Factory for instantiating filters by name.
//!
//! The registry is how pipeline documents come back to life: each entry
//! names a filter, the registry constructs it, and the document's parameter
//! group is applied on top.

use crate::error::{Result, VoxelPipeError};
use crate::filter::Filter;
use std::collections::BTreeMap;

type FilterFactory = fn() -> Box<dyn Filter>;

/// Name → constructor table for the available filters.
pub struct FilterRegistry {
    factories: BTreeMap<&'static str, FilterFactory>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with every built-in filter registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(crate::filters::CreateImageFilter::NAME, || {
            Box::new(crate::filters::CreateImageFilter::new())
        });
        registry.register(crate::filters::ManualThresholdFilter::NAME, || {
            Box::new(crate::filters::ManualThresholdFilter::new())
        });
        registry.register(crate::filters::GrayToRgbFilter::NAME, || {
            Box::new(crate::filters::GrayToRgbFilter::new())
        });
        registry.register(crate::filters::FindMaximaFilter::NAME, || {
            Box::new(crate::filters::FindMaximaFilter::new())
        });
        registry
    }

    /// Register a filter constructor under its name. Re-registering a name
    /// replaces the previous factory.
    pub fn register(&mut self, name: &'static str, factory: FilterFactory) {
        self.factories.insert(name, factory);
    }

    /// Instantiate a filter by name.
    pub fn create(&self, name: &str) -> Result<Box<dyn Filter>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| VoxelPipeError::UnknownFilter(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
