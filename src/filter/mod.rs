//! The filter abstraction and pipeline driver.
//!
//! A filter is a unit of work over the data store with a declared parameter
//! schema and a single [`Filter::plan`] body that runs in two phases:
//!
//! - **Preflight**: every lookup/type/shape check plus creation of all
//!   output arrays, with no numeric computation. A pipeline preflights every
//!   filter against a scratch copy of the store before any real work.
//! - **Execute**: the same plan with computation committed.
//!
//! One body serving both phases is what guarantees the two can never
//! silently diverge: whatever schema preflight establishes, execute
//! re-establishes identically.

pub mod context;
pub mod document;
pub mod params;
pub mod pipeline;
pub mod registry;

pub use context::{FilterContext, Phase, PipelineMessage};
pub use document::{FilterEntry, PipelineDocument};
pub use params::{ParameterDescriptor, ParameterKind, ParameterValue};
pub use pipeline::{FilterSlot, Pipeline};
pub use registry::FilterRegistry;

use crate::error::Result;
use crate::store::DataContainerArray;

/// State of one pipeline step, advanced by the driver.
///
/// `Failed` is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    /// Instantiated, no parameters applied yet
    #[default]
    Constructed,
    /// At least one parameter set
    Configured,
    /// Preflight succeeded
    Validated,
    /// Real execution completed
    Executed,
    /// A phase reported a negative error code
    Failed,
}

impl std::fmt::Display for FilterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterState::Constructed => write!(f, "constructed"),
            FilterState::Configured => write!(f, "configured"),
            FilterState::Validated => write!(f, "validated"),
            FilterState::Executed => write!(f, "executed"),
            FilterState::Failed => write!(f, "failed"),
        }
    }
}

/// A unit of pipeline work.
///
/// Implementations are plain structs holding their parameter fields; the
/// trait carries no base-class machinery. Expected invalid-input conditions
/// (missing array, wrong type, wrong geometry) are returned as errors, never
/// panics, and the driver maps them to the per-slot error code/message
/// channel.
pub trait Filter: Send + std::fmt::Debug {
    /// Registry key and display name.
    fn name(&self) -> &'static str;

    /// Declare the parameter schema. Idempotent; hosts re-query it to render
    /// forms.
    fn parameters(&self) -> &'static [ParameterDescriptor];

    /// Apply one parameter value. Unknown names and wrong kinds fail with a
    /// `Parameter` error.
    fn set_parameter(&mut self, name: &str, value: &ParameterValue) -> Result<()>;

    /// Read back a parameter's current value (`None` for unknown names).
    /// Together with [`Filter::set_parameter`] this makes document
    /// serialization a true inverse.
    fn parameter(&self, name: &str) -> Option<ParameterValue>;

    /// The shared preflight/execute body. `ctx.phase()` decides whether
    /// numeric computation is committed; everything schema-level happens in
    /// both phases.
    fn plan(&mut self, store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()>;
}
