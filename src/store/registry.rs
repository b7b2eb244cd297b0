//! The root data store: a registry of named data containers.
//!
//! One [`DataContainerArray`] is the single mutable store a pipeline run
//! mutates; every filter reaches its data through it by [`DataPath`].
//! Resolution walks container → matrix → array and reports the exact
//! failing segment, which is what makes preflight diagnostics useful.

use crate::error::{Result, VoxelPipeError};
use crate::store::array::{allocate, DataArray, ErasedArray, Scalar};
use crate::store::container::DataContainer;
use crate::store::matrix::AttributeMatrix;
use crate::store::path::{DataPath, PathSegment};
use crate::types::ScalarType;
use std::collections::BTreeMap;

/// Schema-level description of one stored array.
///
/// Snapshots of these drive the preflight/execute parity checks and the
/// runner's end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub path: DataPath,
    pub scalar_type: ScalarType,
    pub tuples: usize,
    pub components: usize,
}

/// Root registry mapping container names to containers.
#[derive(Debug, Clone, Default)]
pub struct DataContainerArray {
    containers: BTreeMap<String, DataContainer>,
}

impl DataContainerArray {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copy the entire store. The pipeline uses this to build the
    /// scratch store its preflight pass runs against.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    // ── Container bookkeeping ──

    /// Add a container. Fails with `NameCollision` if the name is taken.
    pub fn add_container(&mut self, container: DataContainer) -> Result<()> {
        let name = container.name().to_string();
        if self.containers.contains_key(&name) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Container,
                name,
            });
        }
        self.containers.insert(name, container);
        Ok(())
    }

    pub fn container(&self, name: &str) -> Result<&DataContainer> {
        self.containers
            .get(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Container,
                name: name.to_string(),
            })
    }

    pub fn container_mut(&mut self, name: &str) -> Result<&mut DataContainer> {
        self.containers
            .get_mut(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Container,
                name: name.to_string(),
            })
    }

    pub fn remove_container(&mut self, name: &str) -> Result<DataContainer> {
        self.containers
            .remove(name)
            .ok_or_else(|| VoxelPipeError::PathNotFound {
                segment: PathSegment::Container,
                name: name.to_string(),
            })
    }

    /// Rename a container. Fails if `old` is missing or `new` is taken.
    pub fn rename_container(&mut self, old: &str, new: &str) -> Result<()> {
        if self.containers.contains_key(new) {
            return Err(VoxelPipeError::NameCollision {
                segment: PathSegment::Container,
                name: new.to_string(),
            });
        }
        let mut container = self.remove_container(old)?;
        container.set_name(new);
        self.containers.insert(new.to_string(), container);
        Ok(())
    }

    pub fn contains_container(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Container names in deterministic (sorted) order.
    pub fn container_names(&self) -> Vec<&str> {
        self.containers.keys().map(|k| k.as_str()).collect()
    }

    /// Iterate the containers in name order.
    pub fn containers(&self) -> impl Iterator<Item = &DataContainer> {
        self.containers.values()
    }

    // ── Path resolution ──

    /// The matrix a path's container/matrix segments point at.
    pub fn matrix_at(&self, path: &DataPath) -> Result<&AttributeMatrix> {
        self.container(&path.container)?.matrix(&path.matrix)
    }

    /// Mutable form of [`DataContainerArray::matrix_at`].
    pub fn matrix_at_mut(&mut self, path: &DataPath) -> Result<&mut AttributeMatrix> {
        self.container_mut(&path.container)?.matrix_mut(&path.matrix)
    }

    /// Walk container → matrix → array. Any missing segment yields a
    /// `PathNotFound` carrying that segment's kind and name.
    pub fn resolve(&self, path: &DataPath) -> Result<&dyn ErasedArray> {
        self.matrix_at(path)?.array(&path.array)
    }

    /// Mutable form of [`DataContainerArray::resolve`].
    pub fn resolve_mut(&mut self, path: &DataPath) -> Result<&mut (dyn ErasedArray + 'static)> {
        self.matrix_at_mut(path)?.array_mut(&path.array)
    }

    // ── Prerequisite lookups ──

    /// Full-chain lookup + type check + shape check for a known element
    /// type.
    pub fn prereq_array<T: Scalar>(
        &self,
        path: &DataPath,
        components: usize,
    ) -> Result<&DataArray<T>> {
        require_complete(path)?;
        self.matrix_at(path)?.prereq_array(&path.array, components)
    }

    /// Full-chain lookup + shape check for filters that dispatch over any
    /// numeric type at run time.
    pub fn prereq_numeric_array(
        &self,
        path: &DataPath,
        components: usize,
    ) -> Result<&dyn ErasedArray> {
        require_complete(path)?;
        self.matrix_at(path)?
            .prereq_numeric_array(&path.array, components)
    }

    // ── Output creation ──

    /// Create the output array a filter will fill during execution, sized to
    /// its matrix's tuple count and zero-initialized.
    ///
    /// Container and matrix must already exist; only the array segment may
    /// be freshly created. An existing array at the target name is
    /// destructively replaced; this is what "save as new array / overwrite
    /// in place" toggles rely on.
    pub fn create_output_array(
        &mut self,
        path: &DataPath,
        scalar_type: ScalarType,
        components: usize,
    ) -> Result<&mut (dyn ErasedArray + 'static)> {
        require_complete(path)?;
        let matrix = self.matrix_at_mut(path)?;
        let array = allocate(scalar_type, &path.array, matrix.tuples(), components)?;
        matrix.replace_array(array)?;
        matrix.array_mut(&path.array)
    }

    // ── Schema snapshot ──

    /// Describe every stored array: path, type, tuples, components.
    ///
    /// Deterministically ordered (sorted by path), so two snapshots compare
    /// with `==`.
    pub fn schema(&self) -> Vec<ArrayDescriptor> {
        let mut entries = Vec::new();
        for container in self.containers.values() {
            for matrix in container.matrices() {
                for array in matrix.arrays() {
                    entries.push(ArrayDescriptor {
                        path: DataPath::new(container.name(), matrix.name(), array.name()),
                        scalar_type: array.scalar_type(),
                        tuples: array.tuples(),
                        components: array.components(),
                    });
                }
            }
        }
        entries
    }
}

/// All three segments must be set before a path can address an array.
fn require_complete(path: &DataPath) -> Result<()> {
    if !path.is_complete() {
        return Err(VoxelPipeError::parameter(
            path.to_string(),
            "incomplete data path: container, matrix, and array must all be set",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::geometry::ImageGeometry;
    use crate::store::matrix::MatrixKind;

    fn seeded_store() -> DataContainerArray {
        let mut store = DataContainerArray::new();
        let mut container = DataContainer::new("Volume");
        container.set_geometry(ImageGeometry::image([2, 3, 1]));
        let mut matrix = AttributeMatrix::new("CellData", MatrixKind::Cell, vec![2, 3, 1]);
        matrix
            .add_array(allocate(ScalarType::Float32, "Gray", 6, 1).unwrap())
            .unwrap();
        container.add_matrix(matrix).unwrap();
        store.add_container(container).unwrap();
        store
    }

    #[test]
    fn test_resolve_reports_failing_segment() {
        let store = seeded_store();

        let ok = store.resolve(&DataPath::new("Volume", "CellData", "Gray"));
        assert!(ok.is_ok());

        match store
            .resolve(&DataPath::new("Nope", "CellData", "Gray"))
            .unwrap_err()
        {
            VoxelPipeError::PathNotFound { segment, name } => {
                assert_eq!(segment, PathSegment::Container);
                assert_eq!(name, "Nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match store
            .resolve(&DataPath::new("Volume", "Nope", "Gray"))
            .unwrap_err()
        {
            VoxelPipeError::PathNotFound { segment, name } => {
                assert_eq!(segment, PathSegment::Matrix);
                assert_eq!(name, "Nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match store
            .resolve(&DataPath::new("Volume", "CellData", "Nope"))
            .unwrap_err()
        {
            VoxelPipeError::PathNotFound { segment, name } => {
                assert_eq!(segment, PathSegment::Array);
                assert_eq!(name, "Nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_output_array_requires_existing_matrix() {
        let mut store = seeded_store();

        let err = store
            .create_output_array(
                &DataPath::new("Volume", "Missing", "Mask"),
                ScalarType::Uint8,
                1,
            )
            .unwrap_err();
        assert!(matches!(err, VoxelPipeError::PathNotFound { .. }));

        let array = store
            .create_output_array(
                &DataPath::new("Volume", "CellData", "Mask"),
                ScalarType::Uint8,
                1,
            )
            .unwrap();
        assert_eq!(array.tuples(), 6);
        assert_eq!(array.scalar_type(), ScalarType::Uint8);
    }

    #[test]
    fn test_create_output_array_overwrites_existing() {
        let mut store = seeded_store();
        let path = DataPath::new("Volume", "CellData", "Gray");
        // Replacing the existing f32 array with a u8 one is allowed and
        // destructive.
        store
            .create_output_array(&path, ScalarType::Uint8, 1)
            .unwrap();
        assert_eq!(
            store.resolve(&path).unwrap().scalar_type(),
            ScalarType::Uint8
        );
    }

    #[test]
    fn test_incomplete_path_rejected() {
        let store = seeded_store();
        let err = store
            .prereq_numeric_array(&DataPath::new("Volume", "CellData", ""), 1)
            .unwrap_err();
        assert!(matches!(err, VoxelPipeError::Parameter { .. }));
    }

    #[test]
    fn test_schema_snapshot() {
        let mut store = seeded_store();
        store
            .create_output_array(
                &DataPath::new("Volume", "CellData", "Mask"),
                ScalarType::Uint8,
                1,
            )
            .unwrap();

        let schema = store.schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].path, DataPath::new("Volume", "CellData", "Gray"));
        assert_eq!(schema[1].path, DataPath::new("Volume", "CellData", "Mask"));
        assert_eq!(schema[1].scalar_type, ScalarType::Uint8);
        assert_eq!(schema[1].tuples, 6);
    }

    #[test]
    fn test_duplicate_is_deep() {
        let mut store = seeded_store();
        let copy = store.duplicate();
        let path = DataPath::new("Volume", "CellData", "Gray");
        store
            .resolve_mut(&path)
            .unwrap()
            .as_typed_mut::<f32>()
            .unwrap()
            .fill(9.0);
        let copied = copy.resolve(&path).unwrap().as_typed::<f32>().unwrap();
        assert!(copied.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rename_container() {
        let mut store = seeded_store();
        store.rename_container("Volume", "Scan").unwrap();
        assert!(store.contains_container("Scan"));
        assert!(store
            .resolve(&DataPath::new("Scan", "CellData", "Gray"))
            .is_ok());
    }
}
