//! Filter parameter declarations and values.
//!
//! Each filter declares its parameter schema as a static
//! [`ParameterDescriptor`] slice (hosts re-query it to render forms) and
//! exchanges values as [`ParameterValue`], the unit of the grouped
//! key-value persistence format. Serialization and deserialization are
//! inverse for every kind.

use crate::error::{Result, VoxelPipeError};
use crate::store::path::DataPath;
use serde::{Deserialize, Serialize};

/// The kind of value a filter parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Bool,
    Int,
    Float,
    String,
    /// A container/matrix/array path triple
    Path,
    IntVec3,
    FloatVec3,
}

/// Static descriptor for a declared filter parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub kind: ParameterKind,
}

impl ParameterDescriptor {
    pub const fn new(name: &'static str, kind: ParameterKind) -> Self {
        Self { name, kind }
    }
}

/// A parameter value as held by a filter and persisted in a pipeline
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Path(DataPath),
    IntVec3([i64; 3]),
    FloatVec3([f64; 3]),
}

impl ParameterValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Bool(_) => ParameterKind::Bool,
            ParameterValue::Int(_) => ParameterKind::Int,
            ParameterValue::Float(_) => ParameterKind::Float,
            ParameterValue::String(_) => ParameterKind::String,
            ParameterValue::Path(_) => ParameterKind::Path,
            ParameterValue::IntVec3(_) => ParameterKind::IntVec3,
            ParameterValue::FloatVec3(_) => ParameterKind::FloatVec3,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats accept integer literals too; documents written by hand often
    /// say `5` where `5.0` is meant.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&DataPath> {
        match self {
            ParameterValue::Path(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_vec3(&self) -> Option<[i64; 3]> {
        match self {
            ParameterValue::IntVec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float_vec3(&self) -> Option<[f64; 3]> {
        match self {
            ParameterValue::FloatVec3(v) => Some(*v),
            _ => None,
        }
    }

    // ── Coercion helpers for set_parameter bodies ──

    pub fn expect_bool(&self, name: &str) -> Result<bool> {
        self.as_bool()
            .ok_or_else(|| wrong_kind(name, ParameterKind::Bool, self))
    }

    pub fn expect_int(&self, name: &str) -> Result<i64> {
        self.as_int()
            .ok_or_else(|| wrong_kind(name, ParameterKind::Int, self))
    }

    pub fn expect_float(&self, name: &str) -> Result<f64> {
        self.as_float()
            .ok_or_else(|| wrong_kind(name, ParameterKind::Float, self))
    }

    pub fn expect_str(&self, name: &str) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| wrong_kind(name, ParameterKind::String, self))
    }

    pub fn expect_path(&self, name: &str) -> Result<DataPath> {
        self.as_path()
            .cloned()
            .ok_or_else(|| wrong_kind(name, ParameterKind::Path, self))
    }

    pub fn expect_int_vec3(&self, name: &str) -> Result<[i64; 3]> {
        self.as_int_vec3()
            .ok_or_else(|| wrong_kind(name, ParameterKind::IntVec3, self))
    }

    pub fn expect_float_vec3(&self, name: &str) -> Result<[f64; 3]> {
        self.as_float_vec3()
            .ok_or_else(|| wrong_kind(name, ParameterKind::FloatVec3, self))
    }
}

fn wrong_kind(name: &str, expected: ParameterKind, found: &ParameterValue) -> VoxelPipeError {
    VoxelPipeError::parameter(
        name,
        format!("expected {:?} value, found {:?}", expected, found.kind()),
    )
}

/// The error every `set_parameter` body returns for keys it does not
/// declare.
pub fn unknown_parameter(filter: &str, name: &str) -> VoxelPipeError {
    VoxelPipeError::parameter(name, format!("filter '{}' has no such parameter", filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_kind() {
        assert_eq!(ParameterValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ParameterValue::Int(42).as_int(), Some(42));
        assert_eq!(ParameterValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(
            ParameterValue::String("hi".into()).as_str(),
            Some("hi")
        );
        assert_eq!(
            ParameterValue::Path(DataPath::new("V", "M", "A"))
                .as_path()
                .map(|p| p.to_string()),
            Some("V/M/A".to_string())
        );
        assert_eq!(
            ParameterValue::IntVec3([1, 2, 3]).as_int_vec3(),
            Some([1, 2, 3])
        );
        assert_eq!(ParameterValue::Bool(true).as_int(), None);
    }

    #[test]
    fn test_int_coerces_to_float() {
        assert_eq!(ParameterValue::Int(5).as_float(), Some(5.0));
        assert_eq!(ParameterValue::Float(5.0).as_int(), None);
    }

    #[test]
    fn test_expect_reports_parameter_error() {
        let err = ParameterValue::Bool(true).expect_float("tolerance").unwrap_err();
        match err {
            VoxelPipeError::Parameter { name, .. } => assert_eq!(name, "tolerance"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_serde_round_trip_every_kind() {
        let values = [
            ParameterValue::Bool(false),
            ParameterValue::Int(-7),
            ParameterValue::Float(0.125),
            ParameterValue::String("Mask".into()),
            ParameterValue::Path(DataPath::new("Volume", "CellData", "Gray")),
            ParameterValue::IntVec3([128, 128, 64]),
            ParameterValue::FloatVec3([0.25, 0.25, 1.0]),
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let back: ParameterValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }
}
