//! # voxelpipe: preflight-validated voxel data pipelines
//!
//! A pipeline engine for image/volume processing where filters address
//! their data through a hierarchical, runtime-typed store and every run is
//! schema-validated before any numeric work begins.
//!
//! ## Architecture
//!
//! - **Store**: `DataContainerArray` → `DataContainer` (geometry) →
//!   `AttributeMatrix` (shared tuple count) → `DataArray<T>` behind the
//!   type-erased `ErasedArray` interface, addressed by `DataPath`.
//! - **Dispatch**: one closed-world match recovers the concrete numeric
//!   type of an erased array and invokes a type-parameterized kernel.
//! - **Filters**: plain structs with a declared parameter schema and a
//!   single `plan` body run in two phases: preflight (checks + output
//!   creation, no computation) and execute (the same plan, committed).
//! - **Pipeline**: strictly sequential driver; preflights every filter
//!   against a scratch store, then executes against the real one. Status
//!   flows out over a crossbeam channel, cancellation in via an atomic
//!   flag.
//! - **Documents**: pipelines persist as grouped key-value JSON and rebuild
//!   through a filter registry.
//!
//! ## Example
//!
//! ```
//! use voxelpipe::filter::{ParameterValue, Pipeline};
//! use voxelpipe::filters::{CreateImageFilter, FindMaximaFilter};
//! use voxelpipe::store::{DataContainerArray, DataPath};
//!
//! let mut pipeline = Pipeline::new();
//! let create = pipeline.push(Box::new(CreateImageFilter::new()));
//! pipeline
//!     .set_parameter(create, "dimensions", &ParameterValue::IntVec3([8, 8, 1]))
//!     .unwrap();
//! let maxima = pipeline.push(Box::new(FindMaximaFilter::new()));
//! pipeline
//!     .set_parameter(
//!         maxima,
//!         "input_array",
//!         &ParameterValue::Path(DataPath::new(
//!             "ImageDataContainer",
//!             "CellData",
//!             "ImageData",
//!         )),
//!     )
//!     .unwrap();
//!
//! let mut store = DataContainerArray::new();
//! pipeline.run(&mut store).unwrap();
//! ```

pub mod dispatch;
pub mod error;
pub mod filter;
pub mod filters;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use dispatch::{dispatch_numeric, dispatch_numeric_mut, NumericKernel, NumericKernelMut};
pub use error::{Result, VoxelPipeError};
pub use filter::{
    Filter, FilterContext, FilterRegistry, FilterState, ParameterValue, Phase, Pipeline,
    PipelineDocument, PipelineMessage,
};
pub use store::{
    AttributeMatrix, DataArray, DataContainer, DataContainerArray, DataPath, ErasedArray,
    ImageGeometry, MatrixKind,
};
pub use types::ScalarType;
