//! The hierarchical, path-addressed data store.
//!
//! Ownership runs strictly downward:
//!
//! ```text
//! DataContainerArray ──► DataContainer ──► AttributeMatrix ──► DataArray<T>
//!        (root)            (geometry)      (shared tuples)     (typed buffer)
//! ```
//!
//! Everything above the arrays addresses data by [`DataPath`], a lookup
//! key, never an owning handle. Filters resolve paths through the root
//! registry each time they need data, which is what makes it safe for
//! earlier pipeline steps to replace, rename, or resize arrays.

pub mod array;
pub mod container;
pub mod geometry;
pub mod matrix;
pub mod path;
pub mod registry;

pub use array::{allocate, DataArray, ErasedArray, NumericScalar, Scalar};
pub use container::DataContainer;
pub use geometry::{GeometryKind, ImageGeometry};
pub use matrix::{AttributeMatrix, MatrixKind};
pub use path::{DataPath, PathSegment};
pub use registry::{ArrayDescriptor, DataContainerArray};
