//! Runtime numeric dispatch over the closed scalar-type set.
//!
//! Filters select their input arrays by user-chosen path, so the concrete
//! element type is only known at run time. [`dispatch_numeric`] recovers it:
//! match the array's tag over the fixed numeric set, downcast once, and
//! invoke a type-parameterized kernel with the now-concrete buffer.
//!
//! Kernels implement [`NumericKernel`] (or [`NumericKernelMut`] for in-place
//! work): one generic `run` body, instantiated per numeric type by the
//! single match below instead of a hand-rolled trial-downcast chain in every
//! filter. A kernel must be a pure function of the typed buffer and its own
//! parameters; it may not assume anything about array identity beyond type
//! and length.
//!
//! Tags outside the closed set (`bool`) fail with
//! [`UnsupportedType`](crate::error::VoxelPipeError::UnsupportedType)
//! without panicking.

use crate::error::{Result, VoxelPipeError};
use crate::store::array::{DataArray, ErasedArray, NumericScalar, Scalar};
use crate::types::ScalarType;

/// A type-parameterized computation over a read-only numeric array.
pub trait NumericKernel {
    /// The (type-independent) result of the kernel.
    type Output;

    /// Run against the concrete typed buffer.
    fn run<T: NumericScalar>(&mut self, array: &DataArray<T>) -> Result<Self::Output>;
}

/// A type-parameterized computation that mutates a numeric array in place.
pub trait NumericKernelMut {
    /// The (type-independent) result of the kernel.
    type Output;

    /// Run against the concrete typed buffer.
    fn run<T: NumericScalar>(&mut self, array: &mut DataArray<T>) -> Result<Self::Output>;
}

/// Recover the concrete element type of `array` and invoke `kernel` with it.
///
/// Trial order over the closed set is fixed: i8, u8, i16, u16, i32, u32,
/// i64, u64, f32, f64. Exactly one arm fires per call.
pub fn dispatch_numeric<K: NumericKernel>(
    array: &dyn ErasedArray,
    kernel: &mut K,
) -> Result<K::Output> {
    match array.scalar_type() {
        ScalarType::Int8 => kernel.run(typed::<i8>(array)?),
        ScalarType::Uint8 => kernel.run(typed::<u8>(array)?),
        ScalarType::Int16 => kernel.run(typed::<i16>(array)?),
        ScalarType::Uint16 => kernel.run(typed::<u16>(array)?),
        ScalarType::Int32 => kernel.run(typed::<i32>(array)?),
        ScalarType::Uint32 => kernel.run(typed::<u32>(array)?),
        ScalarType::Int64 => kernel.run(typed::<i64>(array)?),
        ScalarType::Uint64 => kernel.run(typed::<u64>(array)?),
        ScalarType::Float32 => kernel.run(typed::<f32>(array)?),
        ScalarType::Float64 => kernel.run(typed::<f64>(array)?),
        ScalarType::Bool => Err(VoxelPipeError::UnsupportedType {
            name: array.name().to_string(),
            scalar_type: ScalarType::Bool,
        }),
    }
}

/// Mutable counterpart of [`dispatch_numeric`].
pub fn dispatch_numeric_mut<K: NumericKernelMut>(
    array: &mut dyn ErasedArray,
    kernel: &mut K,
) -> Result<K::Output> {
    match array.scalar_type() {
        ScalarType::Int8 => kernel.run(typed_mut::<i8>(array)?),
        ScalarType::Uint8 => kernel.run(typed_mut::<u8>(array)?),
        ScalarType::Int16 => kernel.run(typed_mut::<i16>(array)?),
        ScalarType::Uint16 => kernel.run(typed_mut::<u16>(array)?),
        ScalarType::Int32 => kernel.run(typed_mut::<i32>(array)?),
        ScalarType::Uint32 => kernel.run(typed_mut::<u32>(array)?),
        ScalarType::Int64 => kernel.run(typed_mut::<i64>(array)?),
        ScalarType::Uint64 => kernel.run(typed_mut::<u64>(array)?),
        ScalarType::Float32 => kernel.run(typed_mut::<f32>(array)?),
        ScalarType::Float64 => kernel.run(typed_mut::<f64>(array)?),
        ScalarType::Bool => Err(VoxelPipeError::UnsupportedType {
            name: array.name().to_string(),
            scalar_type: ScalarType::Bool,
        }),
    }
}

fn typed<T: Scalar>(array: &dyn ErasedArray) -> Result<&DataArray<T>> {
    array
        .as_typed::<T>()
        .ok_or_else(|| VoxelPipeError::TypeMismatch {
            name: array.name().to_string(),
            expected: T::SCALAR_TYPE,
            actual: array.scalar_type(),
        })
}

fn typed_mut<T: Scalar>(array: &mut dyn ErasedArray) -> Result<&mut DataArray<T>> {
    let actual = array.scalar_type();
    let name = array.name().to_string();
    array
        .as_typed_mut::<T>()
        .ok_or(VoxelPipeError::TypeMismatch {
            name,
            expected: T::SCALAR_TYPE,
            actual,
        })
}
