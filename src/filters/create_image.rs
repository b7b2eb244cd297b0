//! Source filter: create an image container, cell matrix, and seed array.
//!
//! Every pipeline needs at least one source establishing geometry and data
//! for downstream filters to address. This one creates a data container
//! with an image geometry, a cell attribute matrix sized to it, and a
//! single scalar array of a chosen element type, filled with a constant
//! during execution.

use crate::dispatch::{dispatch_numeric_mut, NumericKernelMut};
use crate::error::{Result, VoxelPipeError};
use crate::filter::params::{
    unknown_parameter, ParameterDescriptor, ParameterKind, ParameterValue,
};
use crate::filter::{Filter, FilterContext};
use crate::store::{
    AttributeMatrix, DataArray, DataContainer, DataContainerArray, DataPath, ImageGeometry,
    MatrixKind, NumericScalar,
};
use crate::types::ScalarType;

/// Fills a typed array with a constant given as f64.
struct FillKernel {
    value: f64,
}

impl NumericKernelMut for FillKernel {
    type Output = ();

    fn run<T: NumericScalar>(&mut self, array: &mut DataArray<T>) -> Result<()> {
        let value = T::from(self.value).ok_or_else(|| {
            VoxelPipeError::External(format!(
                "initial value {} is out of range for {}",
                self.value,
                T::SCALAR_TYPE
            ))
        })?;
        array.fill(value);
        Ok(())
    }
}

/// Creates a data container with image geometry and one seeded cell array.
#[derive(Debug, Clone)]
pub struct CreateImageFilter {
    data_container: String,
    cell_matrix: String,
    array_name: String,
    dimensions: [i64; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    scalar_type: ScalarType,
    initial_value: f64,
}

impl CreateImageFilter {
    pub const NAME: &'static str = "CreateImage";

    const PARAMETERS: &'static [ParameterDescriptor] = &[
        ParameterDescriptor::new("data_container", ParameterKind::String),
        ParameterDescriptor::new("cell_matrix", ParameterKind::String),
        ParameterDescriptor::new("array_name", ParameterKind::String),
        ParameterDescriptor::new("dimensions", ParameterKind::IntVec3),
        ParameterDescriptor::new("spacing", ParameterKind::FloatVec3),
        ParameterDescriptor::new("origin", ParameterKind::FloatVec3),
        ParameterDescriptor::new("scalar_type", ParameterKind::String),
        ParameterDescriptor::new("initial_value", ParameterKind::Float),
    ];

    pub fn new() -> Self {
        Self {
            data_container: "ImageDataContainer".to_string(),
            cell_matrix: "CellData".to_string(),
            array_name: "ImageData".to_string(),
            dimensions: [0, 0, 0],
            spacing: [1.0, 1.0, 1.0],
            origin: [0.0, 0.0, 0.0],
            scalar_type: ScalarType::Float32,
            initial_value: 0.0,
        }
    }
}

impl Default for CreateImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for CreateImageFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameters(&self) -> &'static [ParameterDescriptor] {
        Self::PARAMETERS
    }

    fn set_parameter(&mut self, name: &str, value: &ParameterValue) -> Result<()> {
        match name {
            "data_container" => self.data_container = value.expect_str(name)?.to_string(),
            "cell_matrix" => self.cell_matrix = value.expect_str(name)?.to_string(),
            "array_name" => self.array_name = value.expect_str(name)?.to_string(),
            "dimensions" => self.dimensions = value.expect_int_vec3(name)?,
            "spacing" => self.spacing = value.expect_float_vec3(name)?,
            "origin" => self.origin = value.expect_float_vec3(name)?,
            "scalar_type" => {
                let text = value.expect_str(name)?;
                self.scalar_type = text
                    .parse()
                    .map_err(|e: String| VoxelPipeError::parameter(name, e))?;
            }
            "initial_value" => self.initial_value = value.expect_float(name)?,
            _ => return Err(unknown_parameter(Self::NAME, name)),
        }
        Ok(())
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "data_container" => Some(ParameterValue::String(self.data_container.clone())),
            "cell_matrix" => Some(ParameterValue::String(self.cell_matrix.clone())),
            "array_name" => Some(ParameterValue::String(self.array_name.clone())),
            "dimensions" => Some(ParameterValue::IntVec3(self.dimensions)),
            "spacing" => Some(ParameterValue::FloatVec3(self.spacing)),
            "origin" => Some(ParameterValue::FloatVec3(self.origin)),
            "scalar_type" => Some(ParameterValue::String(self.scalar_type.name().to_string())),
            "initial_value" => Some(ParameterValue::Float(self.initial_value)),
            _ => None,
        }
    }

    fn plan(&mut self, store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()> {
        if self.dimensions.iter().any(|&d| d <= 0) {
            return Err(VoxelPipeError::parameter(
                "dimensions",
                format!("all dimensions must be positive, got {:?}", self.dimensions),
            ));
        }
        if self.data_container.is_empty() || self.cell_matrix.is_empty() || self.array_name.is_empty()
        {
            return Err(VoxelPipeError::parameter(
                "data_container",
                "container, matrix, and array names must be non-empty",
            ));
        }

        let dims = [
            self.dimensions[0] as usize,
            self.dimensions[1] as usize,
            self.dimensions[2] as usize,
        ];
        let geometry = ImageGeometry::image(dims)
            .with_spacing([
                self.spacing[0] as f32,
                self.spacing[1] as f32,
                self.spacing[2] as f32,
            ])
            .with_origin([
                self.origin[0] as f32,
                self.origin[1] as f32,
                self.origin[2] as f32,
            ]);

        let mut container = DataContainer::new(&self.data_container);
        container.set_geometry(geometry);
        container.add_matrix(AttributeMatrix::new(
            &self.cell_matrix,
            MatrixKind::Cell,
            dims.to_vec(),
        ))?;
        store.add_container(container)?;

        let path = DataPath::new(&self.data_container, &self.cell_matrix, &self.array_name);
        store.create_output_array(&path, self.scalar_type, 1)?;

        if ctx.is_execute() && self.scalar_type.is_numeric() && self.initial_value != 0.0 {
            let array = store.resolve_mut(&path)?;
            dispatch_numeric_mut(array, &mut FillKernel { value: self.initial_value })?;
        }
        Ok(())
    }
}
