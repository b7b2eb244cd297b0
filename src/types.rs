//! Core scalar type tags for voxelpipe
//!
//! Every data array records its element type as a runtime [`ScalarType`] tag
//! rather than a compile-time parameter, which is what lets heterogeneous
//! arrays live behind one interface and lets filters recover the concrete
//! type at execution time (see [`crate::dispatch`]).
//!
//! The tag set is closed: the ten numeric kinds plus `Bool`. The serialized
//! names (`int8`, `uint8`, …, `float32`, `float64`, `bool`) are also the
//! type names used by pipeline documents.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents the element type of a stored data array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// Boolean flags (not part of the numeric dispatch set)
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    Uint8,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    Uint32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    Uint64,
    /// 32-bit floating point
    #[default]
    Float32,
    /// 64-bit floating point
    Float64,
}

impl ScalarType {
    /// All supported tags, in declaration order.
    pub const ALL: [ScalarType; 11] = [
        ScalarType::Bool,
        ScalarType::Int8,
        ScalarType::Uint8,
        ScalarType::Int16,
        ScalarType::Uint16,
        ScalarType::Int32,
        ScalarType::Uint32,
        ScalarType::Int64,
        ScalarType::Uint64,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// The closed numeric set understood by kernel dispatch, in the fixed
    /// trial order used by [`crate::dispatch::dispatch_numeric`].
    pub const NUMERIC: [ScalarType; 10] = [
        ScalarType::Int8,
        ScalarType::Uint8,
        ScalarType::Int16,
        ScalarType::Uint16,
        ScalarType::Int32,
        ScalarType::Uint32,
        ScalarType::Int64,
        ScalarType::Uint64,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// Returns the size in bytes of one element of this type
    pub fn size_bytes(&self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::Int8 | ScalarType::Uint8 => 1,
            ScalarType::Int16 | ScalarType::Uint16 => 2,
            ScalarType::Int32 | ScalarType::Uint32 | ScalarType::Float32 => 4,
            ScalarType::Int64 | ScalarType::Uint64 | ScalarType::Float64 => 8,
        }
    }

    /// Whether this tag belongs to the closed numeric dispatch set
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ScalarType::Bool)
    }

    /// The serialized name of this tag (`"int8"`, `"float32"`, …)
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int8 => "int8",
            ScalarType::Uint8 => "uint8",
            ScalarType::Int16 => "int16",
            ScalarType::Uint16 => "uint16",
            ScalarType::Int32 => "int32",
            ScalarType::Uint32 => "uint32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown scalar type '{}'", s))
    }
}
