//! Data containers: one geometry plus its attribute matrices.
//!
//! A [`DataContainer`] represents one logical dataset (a loaded or generated
//! volume). It owns at most one geometry descriptor and a name → matrix map.
//! Geometry is set at most once in normal operation; a filter that changes
//! the grid replaces it explicitly through
//! [`DataContainer::set_geometry`].

use crate::error::{Result, VoxelPipeError};
use crate::store::geometry::ImageGeometry;
use crate::store::matrix::AttributeMatrix;
use crate::store::path::PathSegment;
use std::collections::BTreeMap;

/// One logical dataset: geometry + attribute matrices.
#[derive(Debug, Clone)]
pub struct DataContainer {
    name: String,
    geometry: Option<ImageGeometry>,
    matrices: BTreeMap<String, AttributeMatrix>,
}

impl DataContainer {
    /// Create an empty container with no geometry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            matrices: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    // ── Geometry ──

    pub fn geometry(&self) -> Option<&ImageGeometry> {
        self.geometry.as_ref()
    }

    /// The geometry, or `GeometryMissing` for containers without one.
    pub fn require_geometry(&self) -> Result<&ImageGeometry> {
        self.geometry
            .as_ref()
            .ok_or_else(|| VoxelPipeError::GeometryMissing {
                container: self.name.clone(),
            })
    }

    /// Install or explicitly replace the geometry.
    pub fn set_geometry(&mut self, geometry: ImageGeometry) {
        self.geometry = Some(geometry);
    }

    // ── Matrix bookkeeping ──

    /// Add a matrix. Fails with `NameCollision` if the name is taken.
    pub fn add_matrix(&mut self, matrix: AttributeMatrix) -> Result<()> {
        let name = matrix.name().to_string();
        if self.matrices.contains_key(&name) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Matrix,
                name,
            });
        }
        self.matrices.insert(name, matrix);
        Ok(())
    }

    pub fn matrix(&self, name: &str) -> Result<&AttributeMatrix> {
        self.matrices
            .get(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Matrix,
                name: name.to_string(),
            })
    }

    pub fn matrix_mut(&mut self, name: &str) -> Result<&mut AttributeMatrix> {
        self.matrices
            .get_mut(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Matrix,
                name: name.to_string(),
            })
    }

    pub fn remove_matrix(&mut self, name: &str) -> Result<AttributeMatrix> {
        self.matrices
            .remove(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Matrix,
                name: name.to_string(),
            })
    }

    /// Rename a matrix. Fails if `old` is missing or `new` is taken.
    pub fn rename_matrix(&mut self, old: &str, new: &str) -> Result<()> {
        if self.matrices.contains_key(new) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Matrix,
                name: new.to_string(),
            });
        }
        let mut matrix = self.remove_matrix(old)?;
        matrix.set_name(new);
        self.matrices.insert(new.to_string(), matrix);
        Ok(())
    }

    pub fn contains_matrix(&self, name: &str) -> bool {
        self.matrices.contains_key(name)
    }

    pub fn matrix_count(&self) -> usize {
        self.matrices.len()
    }

    /// Matrix names in deterministic (sorted) order.
    pub fn matrix_names(&self) -> Vec<&str> {
        self.matrices.keys().map(|k| k.as_str()).collect()
    }

    /// Iterate the matrices in name order.
    pub fn matrices(&self) -> impl Iterator<Item = &AttributeMatrix> {
        self.matrices.values()
    }
}
