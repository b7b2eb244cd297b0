//! Runtime-typed data arrays.
//!
//! Two-layer design:
//! - **`DataArray<T>`**: the concrete, strongly typed tuple buffer.
//! - **`ErasedArray` trait**: the type-erased capability interface the rest
//!   of the engine stores and passes around without knowing `T`.
//!
//! An array is a dynamically sized sequence of *tuples*, each tuple holding
//! a fixed number of *components* (1 for a scalar field, 3 for RGB, …).
//! Storage length is always `tuples * components`.
//!
//! Typed access back out of the erased interface goes through
//! [`ErasedArray::as_typed`], which succeeds if and only if the runtime tag
//! matches the requested element type, never a reinterpretation.

use crate::error::{Result, VoxelPipeError};
use crate::types::ScalarType;
use num_traits::{NumCast, ToPrimitive};
use std::any::Any;

/// Binds a Rust element type to its runtime [`ScalarType`] tag.
pub trait Scalar:
    Copy + Default + PartialOrd + Send + Sync + std::fmt::Debug + Any + 'static
{
    /// The runtime tag for this element type.
    const SCALAR_TYPE: ScalarType;
}

impl Scalar for bool {
    const SCALAR_TYPE: ScalarType = ScalarType::Bool;
}
impl Scalar for i8 {
    const SCALAR_TYPE: ScalarType = ScalarType::Int8;
}
impl Scalar for u8 {
    const SCALAR_TYPE: ScalarType = ScalarType::Uint8;
}
impl Scalar for i16 {
    const SCALAR_TYPE: ScalarType = ScalarType::Int16;
}
impl Scalar for u16 {
    const SCALAR_TYPE: ScalarType = ScalarType::Uint16;
}
impl Scalar for i32 {
    const SCALAR_TYPE: ScalarType = ScalarType::Int32;
}
impl Scalar for u32 {
    const SCALAR_TYPE: ScalarType = ScalarType::Uint32;
}
impl Scalar for i64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Int64;
}
impl Scalar for u64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Uint64;
}
impl Scalar for f32 {
    const SCALAR_TYPE: ScalarType = ScalarType::Float32;
}
impl Scalar for f64 {
    const SCALAR_TYPE: ScalarType = ScalarType::Float64;
}

/// Scalars that participate in numeric kernel dispatch.
///
/// `bool` is deliberately excluded: it is the one tag outside the closed
/// numeric set, and feeding a bool array to dispatch yields
/// [`VoxelPipeError::UnsupportedType`].
pub trait NumericScalar: Scalar + NumCast + ToPrimitive {}

impl NumericScalar for i8 {}
impl NumericScalar for u8 {}
impl NumericScalar for i16 {}
impl NumericScalar for u16 {}
impl NumericScalar for i32 {}
impl NumericScalar for u32 {}
impl NumericScalar for i64 {}
impl NumericScalar for u64 {}
impl NumericScalar for f32 {}
impl NumericScalar for f64 {}

/// A concrete, strongly typed tuple buffer.
#[derive(Clone)]
pub struct DataArray<T: Scalar> {
    name: String,
    components: usize,
    data: Vec<T>,
}

impl<T: Scalar> DataArray<T> {
    /// Allocate a zero-initialized array of `tuples * components` elements.
    ///
    /// Allocation failure is reported as
    /// [`VoxelPipeError::AllocationFailure`], not a crash.
    pub fn new(name: impl Into<String>, tuples: usize, components: usize) -> Result<Self> {
        let name = name.into();
        if components == 0 {
            return Err(VoxelPipeError::ShapeMismatch {
                name,
                detail: "component count must be at least 1".to_string(),
            });
        }
        let len = tuples
            .checked_mul(components)
            .ok_or_else(|| VoxelPipeError::AllocationFailure {
                name: name.clone(),
                bytes: usize::MAX,
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| VoxelPipeError::AllocationFailure {
                name: name.clone(),
                bytes: len * std::mem::size_of::<T>(),
            })?;
        data.resize(len, T::default());
        Ok(Self {
            name,
            components,
            data,
        })
    }

    /// Wrap an existing buffer. Fails if the length is not a whole number of
    /// tuples.
    pub fn from_vec(name: impl Into<String>, data: Vec<T>, components: usize) -> Result<Self> {
        let name = name.into();
        if components == 0 || data.len() % components != 0 {
            return Err(VoxelPipeError::ShapeMismatch {
                name,
                detail: format!(
                    "buffer of {} elements is not divisible into {}-component tuples",
                    data.len(),
                    components
                ),
            });
        }
        Ok(Self {
            name,
            components,
            data,
        })
    }

    /// The raw element slice, `tuples * components` long.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the raw element slice.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// The components of tuple `i`, or `None` past the end.
    pub fn tuple(&self, i: usize) -> Option<&[T]> {
        let start = i.checked_mul(self.components)?;
        self.data.get(start..start + self.components)
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Replace the buffer contents, keeping name and component count.
    /// Fails if the new buffer is not a whole number of tuples.
    pub fn assign(&mut self, data: Vec<T>) -> Result<()> {
        if data.len() % self.components != 0 {
            return Err(VoxelPipeError::ShapeMismatch {
                name: self.name.clone(),
                detail: format!(
                    "buffer of {} elements is not divisible into {}-component tuples",
                    data.len(),
                    self.components
                ),
            });
        }
        self.data = data;
        Ok(())
    }
}

impl<T: Scalar> std::fmt::Debug for DataArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataArray")
            .field("name", &self.name)
            .field("scalar_type", &T::SCALAR_TYPE)
            .field("tuples", &self.tuples())
            .field("components", &self.components)
            .finish()
    }
}

/// Type-erased capability interface implemented by every [`DataArray<T>`].
///
/// This is what the store owns (`Box<dyn ErasedArray>`) and what filters see
/// until they dispatch to a concrete kernel.
pub trait ErasedArray: Send + Sync + std::fmt::Debug {
    /// Array name, unique within its owning matrix.
    fn name(&self) -> &str;

    /// Rename the array. Only the owning matrix should call this; going
    /// through [`AttributeMatrix::rename_array`](crate::store::AttributeMatrix::rename_array)
    /// keeps the map key and the array name in sync.
    fn set_name(&mut self, name: &str);

    /// Runtime element-type tag.
    fn scalar_type(&self) -> ScalarType;

    /// Number of tuples.
    fn tuples(&self) -> usize;

    /// Components per tuple.
    fn components(&self) -> usize;

    /// Total element count (`tuples * components`).
    fn len(&self) -> usize;

    /// Whether the array holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total storage size in bytes.
    fn byte_len(&self) -> usize {
        self.len() * self.scalar_type().size_bytes()
    }

    /// Resize to `tuples` tuples, preserving existing tuples up to
    /// `min(old, new)` and zero-filling any growth.
    fn resize_tuples(&mut self, tuples: usize) -> Result<()>;

    /// Clone into a fresh boxed array.
    fn boxed_clone(&self) -> Box<dyn ErasedArray>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Scalar> ErasedArray for DataArray<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }

    fn tuples(&self) -> usize {
        self.data.len() / self.components
    }

    fn components(&self) -> usize {
        self.components
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize_tuples(&mut self, tuples: usize) -> Result<()> {
        let new_len =
            tuples
                .checked_mul(self.components)
                .ok_or_else(|| VoxelPipeError::AllocationFailure {
                    name: self.name.clone(),
                    bytes: usize::MAX,
                })?;
        if new_len > self.data.len() {
            self.data
                .try_reserve_exact(new_len - self.data.len())
                .map_err(|_| VoxelPipeError::AllocationFailure {
                    name: self.name.clone(),
                    bytes: new_len * std::mem::size_of::<T>(),
                })?;
        }
        self.data.resize(new_len, T::default());
        Ok(())
    }

    fn boxed_clone(&self) -> Box<dyn ErasedArray> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<'b> dyn ErasedArray + 'b {
    /// Strongly typed view, `Some` iff the runtime tag matches `T`.
    pub fn as_typed<T: Scalar>(&self) -> Option<&DataArray<T>> {
        self.as_any().downcast_ref::<DataArray<T>>()
    }

    /// Mutable strongly typed view, `Some` iff the runtime tag matches `T`.
    pub fn as_typed_mut<T: Scalar>(&mut self) -> Option<&mut DataArray<T>> {
        self.as_any_mut().downcast_mut::<DataArray<T>>()
    }
}

impl Clone for Box<dyn ErasedArray> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Allocate a zero-initialized array of the given runtime type.
///
/// The one place where a [`ScalarType`] tag turns into a concrete
/// `DataArray<T>` allocation.
pub fn allocate(
    scalar_type: ScalarType,
    name: &str,
    tuples: usize,
    components: usize,
) -> Result<Box<dyn ErasedArray>> {
    Ok(match scalar_type {
        ScalarType::Bool => Box::new(DataArray::<bool>::new(name, tuples, components)?),
        ScalarType::Int8 => Box::new(DataArray::<i8>::new(name, tuples, components)?),
        ScalarType::Uint8 => Box::new(DataArray::<u8>::new(name, tuples, components)?),
        ScalarType::Int16 => Box::new(DataArray::<i16>::new(name, tuples, components)?),
        ScalarType::Uint16 => Box::new(DataArray::<u16>::new(name, tuples, components)?),
        ScalarType::Int32 => Box::new(DataArray::<i32>::new(name, tuples, components)?),
        ScalarType::Uint32 => Box::new(DataArray::<u32>::new(name, tuples, components)?),
        ScalarType::Int64 => Box::new(DataArray::<i64>::new(name, tuples, components)?),
        ScalarType::Uint64 => Box::new(DataArray::<u64>::new(name, tuples, components)?),
        ScalarType::Float32 => Box::new(DataArray::<f32>::new(name, tuples, components)?),
        ScalarType::Float64 => Box::new(DataArray::<f64>::new(name, tuples, components)?),
    })
}
