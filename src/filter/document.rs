//! Pipeline document persistence.
//!
//! A document is the grouped key-value form of a pipeline: an ordered list
//! of filter entries, each a filter name plus a parameter-name → value map.
//! `to_json`/`from_json` are inverse operations for every supported
//! parameter kind, and a document built from a pipeline rebuilds an
//! equivalent pipeline through the registry.

use crate::error::Result;
use crate::filter::params::ParameterValue;
use crate::filter::pipeline::Pipeline;
use crate::filter::registry::FilterRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One persisted pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Registry name of the filter.
    pub filter: String,
    /// Parameter group, keyed by parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}

/// A serialized pipeline: ordered filter entries with grouped parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineDocument {
    pub filters: Vec<FilterEntry>,
}

impl PipelineDocument {
    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the document to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Capture a configured pipeline as a document.
    ///
    /// Each filter's declared parameters are read back through
    /// [`Filter::parameter`](crate::filter::Filter::parameter); parameters a
    /// filter does not currently report are omitted.
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        let filters = pipeline
            .slots()
            .iter()
            .map(|slot| {
                let parameters = slot
                    .filter
                    .parameters()
                    .iter()
                    .filter_map(|descriptor| {
                        slot.filter
                            .parameter(descriptor.name)
                            .map(|value| (descriptor.name.to_string(), value))
                    })
                    .collect();
                FilterEntry {
                    filter: slot.filter.name().to_string(),
                    parameters,
                }
            })
            .collect();
        Self { filters }
    }

    /// Instantiate the document's filters through `registry` and apply each
    /// entry's parameter group.
    pub fn build(&self, registry: &FilterRegistry) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();
        for entry in &self.filters {
            let filter = registry.create(&entry.filter)?;
            let index = pipeline.push(filter);
            for (name, value) in &entry.parameters {
                pipeline.set_parameter(index, name, value)?;
            }
        }
        Ok(pipeline)
    }
}
