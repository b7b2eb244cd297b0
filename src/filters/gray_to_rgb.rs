//! Grayscale → RGB expansion.
//!
//! Dispatches over any numeric scalar input and produces a 3-component
//! array of the same element type, replicating the gray value into each
//! channel. Exercises component-dimension-changing outputs: the output
//! array has the input's tag but three components per tuple.

use crate::dispatch::{dispatch_numeric, NumericKernel};
use crate::error::{Result, VoxelPipeError};
use crate::filter::params::{
    unknown_parameter, ParameterDescriptor, ParameterKind, ParameterValue,
};
use crate::filter::{Filter, FilterContext};
use crate::store::{DataArray, DataContainerArray, DataPath, ErasedArray, NumericScalar};

/// Builds the 3-channel replica of a typed gray buffer.
struct ExpandKernel {
    output_name: String,
}

impl NumericKernel for ExpandKernel {
    type Output = Box<dyn ErasedArray>;

    fn run<T: NumericScalar>(&mut self, array: &DataArray<T>) -> Result<Box<dyn ErasedArray>> {
        let mut rgb = Vec::with_capacity(array.len() * 3);
        for &v in array.data() {
            rgb.extend_from_slice(&[v, v, v]);
        }
        Ok(Box::new(DataArray::<T>::from_vec(
            self.output_name.clone(),
            rgb,
            3,
        )?))
    }
}

/// Replicates a numeric gray array into a 3-component RGB array.
#[derive(Debug, Clone)]
pub struct GrayToRgbFilter {
    input_array: DataPath,
    output_array_name: String,
}

impl GrayToRgbFilter {
    pub const NAME: &'static str = "GrayToRgb";

    const PARAMETERS: &'static [ParameterDescriptor] = &[
        ParameterDescriptor::new("input_array", ParameterKind::Path),
        ParameterDescriptor::new("output_array_name", ParameterKind::String),
    ];

    pub fn new() -> Self {
        Self {
            input_array: DataPath::default(),
            output_array_name: "RGB".to_string(),
        }
    }
}

impl Default for GrayToRgbFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for GrayToRgbFilter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parameters(&self) -> &'static [ParameterDescriptor] {
        Self::PARAMETERS
    }

    fn set_parameter(&mut self, name: &str, value: &ParameterValue) -> Result<()> {
        match name {
            "input_array" => self.input_array = value.expect_path(name)?,
            "output_array_name" => self.output_array_name = value.expect_str(name)?.to_string(),
            _ => return Err(unknown_parameter(Self::NAME, name)),
        }
        Ok(())
    }

    fn parameter(&self, name: &str) -> Option<ParameterValue> {
        match name {
            "input_array" => Some(ParameterValue::Path(self.input_array.clone())),
            "output_array_name" => {
                Some(ParameterValue::String(self.output_array_name.clone()))
            }
            _ => None,
        }
    }

    fn plan(&mut self, store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()> {
        let output_path = self.input_array.with_array(&self.output_array_name);

        let input = store.prereq_numeric_array(&self.input_array, 1)?;
        let input_type = input.scalar_type();

        if ctx.is_preflight() {
            store.create_output_array(&output_path, input_type, 3)?;
            return Ok(());
        }

        ctx.check_canceled()?;
        let rgb = dispatch_numeric(
            input,
            &mut ExpandKernel {
                output_name: output_path.array.clone(),
            },
        )?;
        let matrix = store.matrix_at_mut(&output_path)?;
        matrix.replace_array(rgb)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Phase;
    use crate::store::{allocate, AttributeMatrix, DataContainer, MatrixKind};
    use crate::types::ScalarType;

    fn store_with_gray() -> (DataContainerArray, DataPath) {
        let mut store = DataContainerArray::new();
        let mut container = DataContainer::new("Volume");
        let mut matrix = AttributeMatrix::new("CellData", MatrixKind::Cell, vec![3]);
        let mut array = allocate(ScalarType::Uint8, "Gray", 3, 1).unwrap();
        array
            .as_typed_mut::<u8>()
            .unwrap()
            .data_mut()
            .copy_from_slice(&[10, 20, 30]);
        matrix.add_array(array).unwrap();
        container.add_matrix(matrix).unwrap();
        store.add_container(container).unwrap();
        (store, DataPath::new("Volume", "CellData", "Gray"))
    }

    #[test]
    fn test_execute_replicates_channels() {
        let (mut store, input) = store_with_gray();
        let mut filter = GrayToRgbFilter::new();
        filter
            .set_parameter("input_array", &ParameterValue::Path(input.clone()))
            .unwrap();
        let ctx = FilterContext::new(Phase::Execute, 0, GrayToRgbFilter::NAME);
        filter.plan(&mut store, &ctx).unwrap();

        let rgb = store
            .resolve(&input.with_array("RGB"))
            .unwrap()
            .as_typed::<u8>()
            .unwrap();
        assert_eq!(rgb.components(), 3);
        assert_eq!(rgb.data(), &[10, 10, 10, 20, 20, 20, 30, 30, 30]);
    }

    #[test]
    fn test_output_keeps_input_element_type() {
        let (mut store, input) = store_with_gray();
        let mut filter = GrayToRgbFilter::new();
        filter
            .set_parameter("input_array", &ParameterValue::Path(input.clone()))
            .unwrap();

        // Preflight and execute must agree on the output type and shape.
        let preflight_ctx = FilterContext::new(Phase::Preflight, 0, GrayToRgbFilter::NAME);
        let mut preflight_store = store.duplicate();
        filter.plan(&mut preflight_store, &preflight_ctx).unwrap();

        let execute_ctx = FilterContext::new(Phase::Execute, 0, GrayToRgbFilter::NAME);
        filter.plan(&mut store, &execute_ctx).unwrap();

        assert_eq!(preflight_store.schema(), store.schema());
        let out = store.resolve(&input.with_array("RGB")).unwrap();
        assert_eq!(out.scalar_type(), ScalarType::Uint8);
    }

    #[test]
    fn test_bool_input_is_unsupported() {
        let mut store = DataContainerArray::new();
        let mut container = DataContainer::new("Volume");
        let mut matrix = AttributeMatrix::new("CellData", MatrixKind::Cell, vec![2]);
        matrix
            .add_array(allocate(ScalarType::Bool, "Flags", 2, 1).unwrap())
            .unwrap();
        container.add_matrix(matrix).unwrap();
        store.add_container(container).unwrap();

        let mut filter = GrayToRgbFilter::new();
        filter
            .set_parameter(
                "input_array",
                &ParameterValue::Path(DataPath::new("Volume", "CellData", "Flags")),
            )
            .unwrap();
        let ctx = FilterContext::new(Phase::Preflight, 0, GrayToRgbFilter::NAME);
        let err = filter.plan(&mut store, &ctx).unwrap_err();
        assert!(matches!(err, VoxelPipeError::UnsupportedType { .. }));
    }
}
