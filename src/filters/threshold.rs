//! Manual threshold: scalar field → uint8 mask.
//!
//! Dispatches over any numeric input type and writes 255 where the value
//! is at or above the threshold, 0 elsewhere. Carries the
//! "save as new array / overwrite in place" toggle: when overwriting, the
//! result is computed under a working name, the input array is removed,
//! and the result is renamed onto the input's name. That rename happens in
//! both phases, so the schema preflight establishes is exactly the schema
//! execution leaves behind.

use crate::dispatch::{dispatch_numeric, NumericKernel};
use crate::error::{Result, VoxelPipeError};
use crate::filter::params::{
    unknown_parameter, ParameterDescriptor, ParameterKind, ParameterValue,
};
use crate::filter::{Filter, FilterContext};
use crate::store::{DataArray, DataContainerArray, DataPath, NumericScalar};
use crate::types::ScalarType;

/// Working name for the in-place path; never survives a successful plan.
const WORKING_NAME: &str = "ThresholdWorking";

/// Produces the mask buffer for a typed input.
struct ThresholdKernel {
    threshold: f64,
}

impl NumericKernel for ThresholdKernel {
    type Output = Vec<u8>;

    fn run<T: NumericScalar>(&mut self, array: &DataArray<T>) -> Result<Vec<u8>> {
        let mut mask = Vec::with_capacity(array.data().len());
        for &v in array.data() {
            let value = v.to_f64().ok_or_else(|| {
                VoxelPipeError::External("value not representable as f64".to_string())
            })?;
            mask.push(if value >= self.threshold { 255 } else { 0 });
        }
        Ok(mask)
    }
}

/// Thresholds a numeric scalar array into a uint8 mask.
#[derive(Debug, Clone)]
pub struct ManualThresholdFilter {
    input_array: DataPath,
    output_array_name: String,
    threshold: f64,
    save_as_new: bool,
}

impl ManualThresholdFilter {
    pub const NAME: &'static str = "ManualThreshold";

    const PARAMETERS: &'static [ParameterDescriptor] = &[
        ParameterDescriptor::new("input_array", ParameterKind::Path),
        ParameterDescriptor::new("output_array_name", ParameterKind::String),
        ParameterDescriptor::new("threshold", ParameterKind::Float),
        ParameterDescriptor::new("save_as_new", ParameterKind::Bool),
    ];

    pub fn new() -> Self {
        Self {
            input_array: DataPath::default(),
            output_array_name: "Mask".to_string(),
            threshold: 128.0,
            save_as_new: true,
        }
    }
}

impl Default for ManualThresholdFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for ManualThresholdFilter {
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
            "threshold" => self.threshold = value.expect_float(name)?,
            "save_as_new" => self.save_as_new = value.expect_bool(name)?,
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
            "threshold" => Some(ParameterValue::Float(self.threshold)),
            "save_as_new" => Some(ParameterValue::Bool(self.save_as_new)),
            _ => None,
        }
    }

    fn plan(&mut self, store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()> {
        let output_name = if self.save_as_new {
            self.output_array_name.as_str()
        } else {
            WORKING_NAME
        };
        let output_path = self.input_array.with_array(output_name);

        // Compute before any store mutation; preflight skips this.
        let mask = if ctx.is_execute() {
            ctx.check_canceled()?;
            let input = store.prereq_numeric_array(&self.input_array, 1)?;
            Some(dispatch_numeric(
                input,
                &mut ThresholdKernel {
                    threshold: self.threshold,
                },
            )?)
        } else {
            store.prereq_numeric_array(&self.input_array, 1)?;
            None
        };

        let output = store.create_output_array(&output_path, ScalarType::Uint8, 1)?;
        if let Some(mask) = mask {
            let output = output.as_typed_mut::<u8>().ok_or_else(|| {
                VoxelPipeError::External("threshold output lost its uint8 type".to_string())
            })?;
            output.assign(mask)?;
        }

        if !self.save_as_new {
            // Overwrite in place: drop the input, move the result onto its
            // name. Runs in both phases so the schemas cannot diverge.
            let matrix = store.matrix_at_mut(&self.input_array)?;
            matrix.remove_array(&self.input_array.array)?;
            matrix.rename_array(WORKING_NAME, &self.input_array.array)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Phase;
    use crate::store::{allocate, AttributeMatrix, DataContainer, MatrixKind};

    fn store_with_gray(values: &[i16]) -> (DataContainerArray, DataPath) {
        let mut store = DataContainerArray::new();
        let mut container = DataContainer::new("Volume");
        let mut matrix =
            AttributeMatrix::new("CellData", MatrixKind::Cell, vec![values.len()]);
        let mut array = allocate(ScalarType::Int16, "Gray", values.len(), 1).unwrap();
        array
            .as_typed_mut::<i16>()
            .unwrap()
            .data_mut()
            .copy_from_slice(values);
        matrix.add_array(array).unwrap();
        container.add_matrix(matrix).unwrap();
        store.add_container(container).unwrap();
        (store, DataPath::new("Volume", "CellData", "Gray"))
    }

    fn configured(input: &DataPath, save_as_new: bool) -> ManualThresholdFilter {
        let mut filter = ManualThresholdFilter::new();
        filter
            .set_parameter("input_array", &ParameterValue::Path(input.clone()))
            .unwrap();
        filter
            .set_parameter("threshold", &ParameterValue::Float(10.0))
            .unwrap();
        filter
            .set_parameter("save_as_new", &ParameterValue::Bool(save_as_new))
            .unwrap();
        filter
    }

    #[test]
    fn test_execute_masks_at_threshold() {
        let (mut store, input) = store_with_gray(&[0, 10, 20, 9]);
        let mut filter = configured(&input, true);
        let ctx = FilterContext::new(Phase::Execute, 0, ManualThresholdFilter::NAME);
        filter.plan(&mut store, &ctx).unwrap();

        let mask = store
            .resolve(&input.with_array("Mask"))
            .unwrap()
            .as_typed::<u8>()
            .unwrap();
        assert_eq!(mask.data(), &[0, 255, 255, 0]);
        // Input untouched in save-as-new mode.
        assert!(store.resolve(&input).is_ok());
    }

    #[test]
    fn test_preflight_creates_zeroed_mask() {
        let (mut store, input) = store_with_gray(&[0, 10, 20, 9]);
        let mut filter = configured(&input, true);
        let ctx = FilterContext::new(Phase::Preflight, 0, ManualThresholdFilter::NAME);
        filter.plan(&mut store, &ctx).unwrap();

        let mask = store
            .resolve(&input.with_array("Mask"))
            .unwrap()
            .as_typed::<u8>()
            .unwrap();
        assert!(mask.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_overwrite_in_place_replaces_input() {
        let (mut store, input) = store_with_gray(&[0, 10, 20, 9]);
        let mut filter = configured(&input, false);
        let ctx = FilterContext::new(Phase::Execute, 0, ManualThresholdFilter::NAME);
        filter.plan(&mut store, &ctx).unwrap();

        // The input path now holds the uint8 mask; no working array remains.
        let replaced = store.resolve(&input).unwrap();
        assert_eq!(replaced.scalar_type(), ScalarType::Uint8);
        assert_eq!(
            replaced.as_typed::<u8>().unwrap().data(),
            &[0, 255, 255, 0]
        );
        assert!(store.resolve(&input.with_array(WORKING_NAME)).is_err());
    }

    #[test]
    fn test_overwrite_schema_matches_across_phases() {
        let (mut preflight_store, input) = store_with_gray(&[0, 10, 20, 9]);
        let (mut execute_store, _) = store_with_gray(&[0, 10, 20, 9]);

        let mut filter = configured(&input, false);
        filter
            .plan(
                &mut preflight_store,
                &FilterContext::new(Phase::Preflight, 0, ManualThresholdFilter::NAME),
            )
            .unwrap();
        filter
            .plan(
                &mut execute_store,
                &FilterContext::new(Phase::Execute, 0, ManualThresholdFilter::NAME),
            )
            .unwrap();

        assert_eq!(preflight_store.schema(), execute_store.schema());
    }

    #[test]
    fn test_missing_input_fails() {
        let (mut store, _) = store_with_gray(&[1, 2]);
        let mut filter = configured(&DataPath::new("Volume", "CellData", "Nope"), true);
        let ctx = FilterContext::new(Phase::Preflight, 0, ManualThresholdFilter::NAME);
        let err = filter.plan(&mut store, &ctx).unwrap_err();
        assert!(matches!(err, VoxelPipeError::PathNotFound { .. }));
    }
}
