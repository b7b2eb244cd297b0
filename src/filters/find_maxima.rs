//! Regional peak finding with noise tolerance.
//!
//! Emulates the classic ImageJ "Find Maxima" behavior on a scalar grid:
//!
//! 1. Find all *regional maxima* (connected plateaus whose every outside
//!    neighbor is strictly lower) and label them in scan order.
//! 2. For each candidate plateau, flood outward through every connected
//!    voxel whose value is at least `peak − tolerance`. Meeting a strictly
//!    higher voxel eliminates the candidate (a taller peak sits within the
//!    noise band); meeting an equal-valued voxel of a different live
//!    plateau merges the two into one peak.
//! 3. Each surviving peak collapses to the rounded centroid of its plateau
//!    voxels.
//!
//! Connectivity is face-only (4-connected in 2-D, 6 in 3-D) or full
//! (8 / 26) per the `fully_connected` flag. Peaks come back in ascending
//! plateau-label order, which makes the output stable for a given field.

use crate::dispatch::{dispatch_numeric, NumericKernel};
use crate::error::{Result, VoxelPipeError};
use crate::filter::params::{
    unknown_parameter, ParameterDescriptor, ParameterKind, ParameterValue,
};
use crate::filter::{Filter, FilterContext};
use crate::store::{DataArray, DataContainerArray, DataPath, ImageGeometry, NumericScalar};
use crate::types::ScalarType;

/// One surviving peak: representative voxel coordinates and plateau value.
#[derive(Debug, Clone, PartialEq)]
pub struct Peak {
    pub position: [usize; 3],
    pub value: f64,
}

const NO_PLATEAU: u32 = u32::MAX;

/// Find all significant local maxima of a scalar field.
///
/// `field` is laid out x-fastest over `dims`; a 1-D profile is
/// `[n, 1, 1]`. Returns one peak per surviving plateau, ordered by
/// ascending plateau label (scan order of discovery).
///
/// A perfectly flat field is a single infinite plateau and yields exactly
/// one peak at the rounded field centroid. With zero tolerance every
/// regional maximum survives on its own.
pub fn find_maxima(
    field: &[f64],
    dims: [usize; 3],
    tolerance: f64,
    fully_connected: bool,
) -> Vec<Peak> {
    let n = dims[0] * dims[1] * dims[2];
    debug_assert_eq!(field.len(), n);
    if n == 0 || field.len() != n {
        return Vec::new();
    }

    struct Candidate {
        value: f64,
        members: Vec<usize>,
    }

    // ── Stage 1: label regional-maximum plateaus in scan order ──

    let mut plateau: Vec<u32> = vec![NO_PLATEAU; n];
    let mut visited = vec![false; n];
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut nbrs = Vec::with_capacity(26);

    for start in 0..n {
        if visited[start] {
            continue;
        }
        let value = field[start];
        // BFS the connected equal-value component.
        let mut members = vec![start];
        visited[start] = true;
        let mut is_max = true;
        let mut head = 0;
        while head < members.len() {
            let voxel = members[head];
            head += 1;
            neighbors(voxel, dims, fully_connected, &mut nbrs);
            for &nb in &nbrs {
                let nv = field[nb];
                if nv > value {
                    is_max = false;
                } else if nv == value && !visited[nb] {
                    visited[nb] = true;
                    members.push(nb);
                }
            }
        }
        if is_max {
            let label = candidates.len() as u32;
            for &m in &members {
                plateau[m] = label;
            }
            candidates.push(Candidate { value, members });
        }
    }

    // ── Stage 2: tolerance flood per candidate, ascending label order ──

    let count = candidates.len();
    let mut alive = vec![true; count];
    // Merged into an earlier candidate; skipped by the outer loop.
    let mut consumed = vec![false; count];
    // Per-flood visit marker, stamped with the flooding label.
    let mut stamp: Vec<u32> = vec![NO_PLATEAU; n];

    for label in 0..count {
        if consumed[label] || !alive[label] {
            continue;
        }
        let peak_value = candidates[label].value;
        let floor = peak_value - tolerance;

        let mut queue: Vec<usize> = candidates[label].members.clone();
        for &voxel in &queue {
            stamp[voxel] = label as u32;
        }

        let mut head = 0;
        let mut eliminated = false;
        'flood: while head < queue.len() {
            let voxel = queue[head];
            head += 1;
            neighbors(voxel, dims, fully_connected, &mut nbrs);
            for &nb in &nbrs {
                if stamp[nb] == label as u32 {
                    continue;
                }
                let nv = field[nb];
                if nv < floor {
                    continue;
                }
                if nv > peak_value {
                    // A higher peak lies within tolerance: not a true
                    // maximum at this noise scale.
                    eliminated = true;
                    break 'flood;
                }
                stamp[nb] = label as u32;
                if nv == peak_value {
                    let other = plateau[nb];
                    if other != NO_PLATEAU && other != label as u32 {
                        let other = other as usize;
                        if alive[other] && !consumed[other] {
                            // Same plateau value, connected within
                            // tolerance: one peak, not two.
                            consumed[other] = true;
                            let moved = std::mem::take(&mut candidates[other].members);
                            for &m in &moved {
                                plateau[m] = label as u32;
                            }
                            candidates[label].members.extend(moved);
                        }
                    }
                }
                queue.push(nb);
            }
        }
        if eliminated {
            alive[label] = false;
        }
    }

    // ── Stage 3: collapse survivors to rounded centroids ──

    let mut peaks = Vec::new();
    for label in 0..count {
        if consumed[label] || !alive[label] {
            continue;
        }
        let members = &candidates[label].members;
        let mut sums = [0.0f64; 3];
        for &voxel in members {
            let [x, y, z] = coords(voxel, dims);
            sums[0] += x as f64;
            sums[1] += y as f64;
            sums[2] += z as f64;
        }
        let len = members.len() as f64;
        // Ties round half up per axis.
        let position = [
            (sums[0] / len).round() as usize,
            (sums[1] / len).round() as usize,
            (sums[2] / len).round() as usize,
        ];
        peaks.push(Peak {
            position,
            value: candidates[label].value,
        });
    }
    peaks
}

#[inline]
fn coords(index: usize, dims: [usize; 3]) -> [usize; 3] {
    let x = index % dims[0];
    let y = (index / dims[0]) % dims[1];
    let z = index / (dims[0] * dims[1]);
    [x, y, z]
}

/// Collect the valid neighbors of `index` into `out`.
///
/// Face connectivity degenerates correctly on thin grids: on `[n, 1, 1]`
/// it is 2-connected, on `[nx, ny, 1]` 4-connected. Full connectivity is
/// 8-connected in 2-D and 26-connected in 3-D.
fn neighbors(index: usize, dims: [usize; 3], fully_connected: bool, out: &mut Vec<usize>) {
    let [x, y, z] = coords(index, dims);
    out.clear();

    if fully_connected {
        for dz in -1i64..=1 {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    let nz = z as i64 + dz;
                    if nx < 0
                        || ny < 0
                        || nz < 0
                        || nx >= dims[0] as i64
                        || ny >= dims[1] as i64
                        || nz >= dims[2] as i64
                    {
                        continue;
                    }
                    out.push(nx as usize + dims[0] * (ny as usize + dims[1] * nz as usize));
                }
            }
        }
    } else {
        if x > 0 {
            out.push(index - 1);
        }
        if x + 1 < dims[0] {
            out.push(index + 1);
        }
        if y > 0 {
            out.push(index - dims[0]);
        }
        if y + 1 < dims[1] {
            out.push(index + dims[0]);
        }
        if z > 0 {
            out.push(index - dims[0] * dims[1]);
        }
        if z + 1 < dims[2] {
            out.push(index + dims[0] * dims[1]);
        }
    }
}

/// Converts a typed field to f64, checking the cancel flag once per slice.
struct ToF64Kernel<'a> {
    slice_len: usize,
    ctx: &'a FilterContext,
}

impl NumericKernel for ToF64Kernel<'_> {
    type Output = Vec<f64>;

    fn run<T: NumericScalar>(&mut self, array: &DataArray<T>) -> Result<Vec<f64>> {
        let data = array.data();
        let mut values = Vec::with_capacity(data.len());
        let slice_len = self.slice_len.max(1);
        for slice in data.chunks(slice_len) {
            self.ctx.check_canceled()?;
            for &v in slice {
                values.push(v.to_f64().ok_or_else(|| {
                    VoxelPipeError::External("value not representable as f64".to_string())
                })?);
            }
        }
        Ok(values)
    }
}

/// Pipeline filter wrapping [`find_maxima`].
///
/// Marks each surviving peak's representative voxel in a uint8 output
/// array (255 at peaks, 0 elsewhere) alongside the input.
#[derive(Debug, Clone)]
pub struct FindMaximaFilter {
    input_array: DataPath,
    output_array_name: String,
    tolerance: f64,
    fully_connected: bool,
}

impl FindMaximaFilter {
    pub const NAME: &'static str = "FindMaxima";

    const PARAMETERS: &'static [ParameterDescriptor] = &[
        ParameterDescriptor::new("input_array", ParameterKind::Path),
        ParameterDescriptor::new("output_array_name", ParameterKind::String),
        ParameterDescriptor::new("tolerance", ParameterKind::Float),
        ParameterDescriptor::new("fully_connected", ParameterKind::Bool),
    ];

    pub fn new() -> Self {
        Self {
            input_array: DataPath::default(),
            output_array_name: "Maxima".to_string(),
            tolerance: 0.0,
            fully_connected: false,
        }
    }
}

impl Default for FindMaximaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for FindMaximaFilter {
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
            "tolerance" => self.tolerance = value.expect_float(name)?,
            "fully_connected" => self.fully_connected = value.expect_bool(name)?,
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
            "tolerance" => Some(ParameterValue::Float(self.tolerance)),
            "fully_connected" => Some(ParameterValue::Bool(self.fully_connected)),
            _ => None,
        }
    }

    fn plan(&mut self, store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()> {
        if self.tolerance < 0.0 {
            return Err(VoxelPipeError::parameter(
                "tolerance",
                "must be non-negative",
            ));
        }

        let geometry: ImageGeometry;
        {
            let input = store.prereq_numeric_array(&self.input_array, 1)?;
            let container = store.container(&self.input_array.container)?;
            geometry = container.require_geometry()?.clone();
            if geometry.voxel_count() != input.tuples() {
                return Err(VoxelPipeError::ShapeMismatch {
                    name: input.name().to_string(),
                    detail: format!(
                        "array has {} tuples but geometry has {} voxels",
                        input.tuples(),
                        geometry.voxel_count()
                    ),
                });
            }
        }

        let output_path = self.input_array.with_array(&self.output_array_name);
        store.create_output_array(&output_path, ScalarType::Uint8, 1)?;

        if ctx.is_preflight() {
            return Ok(());
        }

        let slice_len = geometry.dims[0] * geometry.dims[1];
        let values = {
            let input = store.prereq_numeric_array(&self.input_array, 1)?;
            dispatch_numeric(input, &mut ToF64Kernel { slice_len, ctx })?
        };

        let peaks = find_maxima(&values, geometry.dims, self.tolerance, self.fully_connected);
        ctx.update_status(format!("found {} maxima", peaks.len()));

        let output_array = store.resolve_mut(&output_path)?;
        let actual = output_array.scalar_type();
        let output = output_array
            .as_typed_mut::<u8>()
            .ok_or_else(|| VoxelPipeError::TypeMismatch {
                name: output_path.array.clone(),
                expected: ScalarType::Uint8,
                actual,
            })?;
        output.fill(0);
        for peak in &peaks {
            let [x, y, z] = peak.position;
            let index = geometry.index(x, y, z);
            if let Some(v) = output.data_mut().get_mut(index) {
                *v = 255;
            }
        }
        Ok(())
    }
}
