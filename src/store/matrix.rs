//! Attribute matrices: named groups of equally sized arrays.
//!
//! An [`AttributeMatrix`] maps array names to type-erased arrays that all
//! share one tuple count, derived from the matrix's tuple-dimension vector
//! (`[x, y, z]` for cell data on an image, `[n]` for per-feature data).
//! The shape invariant (every contained array has
//! `tuples() == product(tuple_dims)`) is enforced on every add, replace,
//! and resize.

use crate::error::{Result, VoxelPipeError};
use crate::store::array::{DataArray, ErasedArray, Scalar};
use crate::store::path::PathSegment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category tag describing what a matrix's tuples are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MatrixKind {
    Vertex,
    Edge,
    Face,
    /// Per-voxel data on a grid geometry
    #[default]
    Cell,
    /// Per-feature (segmented region) data
    Feature,
    /// Per-ensemble (phase/material) data
    Ensemble,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixKind::Vertex => write!(f, "Vertex"),
            MatrixKind::Edge => write!(f, "Edge"),
            MatrixKind::Face => write!(f, "Face"),
            MatrixKind::Cell => write!(f, "Cell"),
            MatrixKind::Feature => write!(f, "Feature"),
            MatrixKind::Ensemble => write!(f, "Ensemble"),
        }
    }
}

/// A named map of equally sized, type-erased arrays.
///
/// Arrays are owned exclusively by their matrix from creation until removed
/// or renamed; lookups hand out borrows, never owning handles.
#[derive(Clone)]
pub struct AttributeMatrix {
    name: String,
    kind: MatrixKind,
    tuple_dims: Vec<usize>,
    arrays: BTreeMap<String, Box<dyn ErasedArray>>,
}

impl AttributeMatrix {
    /// Create an empty matrix with the given tuple dimensions.
    pub fn new(name: impl Into<String>, kind: MatrixKind, tuple_dims: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            kind,
            tuple_dims,
            arrays: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    pub fn tuple_dims(&self) -> &[usize] {
        &self.tuple_dims
    }

    /// The tuple count every contained array must match
    /// (`product(tuple_dims)`).
    pub fn tuples(&self) -> usize {
        self.tuple_dims.iter().product()
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    // ── Array bookkeeping ──

    /// Add an array. Fails with `ShapeMismatch` if its tuple count differs
    /// from the matrix's, or with `NameCollision` if the name is taken;
    /// adding never silently overwrites.
    pub fn add_array(&mut self, array: Box<dyn ErasedArray>) -> Result<()> {
        self.check_tuples(array.as_ref())?;
        let name = array.name().to_string();
        if self.arrays.contains_key(&name) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Array,
                name,
            });
        }
        self.arrays.insert(name, array);
        Ok(())
    }

    /// Insert an array, destructively replacing any existing array of the
    /// same name. This is the documented overwrite path used by output-array
    /// creation; everything else goes through [`AttributeMatrix::add_array`].
    pub fn replace_array(
        &mut self,
        array: Box<dyn ErasedArray>,
    ) -> Result<Option<Box<dyn ErasedArray>>> {
        self.check_tuples(array.as_ref())?;
        Ok(self.arrays.insert(array.name().to_string(), array))
    }

    /// Look up an array by name.
    pub fn array(&self, name: &str) -> Result<&dyn ErasedArray> {
        self.arrays
            .get(name)
            .map(|a| a.as_ref())
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Array,
                name: name.to_string(),
            })
    }

    /// Look up an array by name, mutably.
    pub fn array_mut(&mut self, name: &str) -> Result<&mut (dyn ErasedArray + 'static)> {
        self.arrays
            .get_mut(name)
            .map(|a| a.as_mut())
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Array,
                name: name.to_string(),
            })
    }

    /// Remove and return an array.
    pub fn remove_array(&mut self, name: &str) -> Result<Box<dyn ErasedArray>> {
        self.arrays
            .remove(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Array,
                name: name.to_string(),
            })
    }

    /// Rename an array. Fails if `old` is missing or `new` is already taken.
    pub fn rename_array(&mut self, old: &str, new: &str) -> Result<()> {
        if self.arrays.contains_key(new) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Array,
                name: new.to_string(),
            });
        }
        let mut array = self.remove_array(old)?;
        array.set_name(new);
        self.arrays.insert(new.to_string(), array);
        Ok(())
    }

    /// Drop every array, keeping the matrix itself.
    pub fn clear_arrays(&mut self) {
        self.arrays.clear();
    }

    pub fn contains_array(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    /// Array names in deterministic (sorted) order.
    pub fn array_names(&self) -> Vec<&str> {
        self.arrays.keys().map(|k| k.as_str()).collect()
    }

    /// Iterate the contained arrays in name order.
    pub fn arrays(&self) -> impl Iterator<Item = &dyn ErasedArray> {
        self.arrays.values().map(|a| a.as_ref())
    }

    /// Change the tuple dimensions, resizing every contained array to match.
    pub fn resize(&mut self, tuple_dims: Vec<usize>) -> Result<()> {
        let tuples = tuple_dims.iter().product();
        for array in self.arrays.values_mut() {
            array.resize_tuples(tuples)?;
        }
        self.tuple_dims = tuple_dims;
        Ok(())
    }

    // ── Prerequisite lookups ──

    /// Combined lookup + type check + shape check used by filters before
    /// touching data. Fails with exactly one of `PathNotFound`,
    /// `TypeMismatch`, or `ShapeMismatch`.
    pub fn prereq_array<T: Scalar>(&self, name: &str, components: usize) -> Result<&DataArray<T>> {
        let array = self.array(name)?;
        let typed = array
            .as_typed::<T>()
            .ok_or_else(|| VoxelPipeError::TypeMismatch {
                name: name.to_string(),
                expected: T::SCALAR_TYPE,
                actual: array.scalar_type(),
            })?;
        if typed.components() != components {
            return Err(VoxelPipeError::ShapeMismatch {
                name: name.to_string(),
                detail: format!(
                    "expected {} components per tuple, found {}",
                    components,
                    typed.components()
                ),
            });
        }
        Ok(typed)
    }

    /// Like [`AttributeMatrix::prereq_array`], but for filters that accept
    /// any numeric type and dispatch at run time. Fails with
    /// `UnsupportedType` for non-numeric tags.
    pub fn prereq_numeric_array(&self, name: &str, components: usize) -> Result<&dyn ErasedArray> {
        let array = self.array(name)?;
        if !array.scalar_type().is_numeric() {
            return Err(VoxelPipeError::UnsupportedType {
                name: name.to_string(),
                scalar_type: array.scalar_type(),
            });
        }
        if array.components() != components {
            return Err(VoxelPipeError::ShapeMismatch {
                name: name.to_string(),
                detail: format!(
                    "expected {} components per tuple, found {}",
                    components,
                    array.components()
                ),
            });
        }
        Ok(array)
    }

    fn check_tuples(&self, array: &dyn ErasedArray) -> Result<()> {
        if array.tuples() != self.tuples() {
            return Err(VoxelPipeError::ShapeMismatch {
                name: array.name().to_string(),
                detail: format!(
                    "array has {} tuples, matrix '{}' requires {}",
                    array.tuples(),
                    self.name,
                    self.tuples()
                ),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttributeMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeMatrix")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("tuple_dims", &self.tuple_dims)
            .field("arrays", &self.array_names())
            .finish()
    }
}
