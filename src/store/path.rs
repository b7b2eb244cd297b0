//! Path addressing for the hierarchical data store.
//!
//! A [`DataPath`] names an array as `Container/Matrix/Array`. It is a plain
//! value: a lookup key, never an owning handle. Filters hold paths, not
//! array references, and re-resolve through the store whenever they need the
//! data; this is what keeps references valid across pipeline phases where
//! intervening filters may have replaced, renamed, or resized arrays.

use serde::{Deserialize, Serialize};

/// Which level of a [`DataPath`] an operation refers to.
///
/// Carried by lookup errors so the failing segment is visible to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    Container,
    Matrix,
    Array,
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Container => write!(f, "data container"),
            PathSegment::Matrix => write!(f, "attribute matrix"),
            PathSegment::Array => write!(f, "data array"),
        }
    }
}

/// Three-segment key addressing an array in the store.
///
/// Any segment may be empty, meaning "unset": a path fresh out of a
/// document with no user selection yet. The external string form is
/// `Container/Matrix/Array`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DataPath {
    pub container: String,
    pub matrix: String,
    pub array: String,
}

impl DataPath {
    /// Create a fully specified path.
    pub fn new(
        container: impl Into<String>,
        matrix: impl Into<String>,
        array: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            matrix: matrix.into(),
            array: array.into(),
        }
    }

    /// True when every segment is empty.
    pub fn is_unset(&self) -> bool {
        self.container.is_empty() && self.matrix.is_empty() && self.array.is_empty()
    }

    /// True when every segment is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.container.is_empty() && !self.matrix.is_empty() && !self.array.is_empty()
    }

    /// A sibling path: same container and matrix, different array name.
    ///
    /// This is how filters derive their output path from a selected input.
    pub fn with_array(&self, array: impl Into<String>) -> Self {
        Self {
            container: self.container.clone(),
            matrix: self.matrix.clone(),
            array: array.into(),
        }
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.container, self.matrix, self.array)
    }
}

impl From<&str> for DataPath {
    fn from(s: &str) -> Self {
        let mut parts = s.splitn(3, '/');
        Self {
            container: parts.next().unwrap_or_default().to_string(),
            matrix: parts.next().unwrap_or_default().to_string(),
            array: parts.next().unwrap_or_default().to_string(),
        }
    }
}

impl From<String> for DataPath {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DataPath> for String {
    fn from(path: DataPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_string_round_trip() {
        let path = DataPath::new("Volume", "CellData", "Confidence");
        let text = path.to_string();
        assert_eq!(text, "Volume/CellData/Confidence");
        assert_eq!(DataPath::from(text.as_str()), path);
    }

    #[test]
    fn test_path_unset_and_partial() {
        assert!(DataPath::default().is_unset());
        assert!(!DataPath::default().is_complete());

        let partial = DataPath::from("Volume//");
        assert_eq!(partial.container, "Volume");
        assert!(partial.matrix.is_empty());
        assert!(partial.array.is_empty());
        assert!(!partial.is_complete());
        assert!(!partial.is_unset());
    }

    #[test]
    fn test_path_missing_separators() {
        let path = DataPath::from("Volume");
        assert_eq!(path.container, "Volume");
        assert!(path.matrix.is_empty());
        assert!(path.array.is_empty());
    }

    #[test]
    fn test_path_with_array() {
        let input = DataPath::new("Volume", "CellData", "Gray");
        let output = input.with_array("Mask");
        assert_eq!(output, DataPath::new("Volume", "CellData", "Mask"));
    }

    #[test]
    fn test_path_serde_as_string() {
        let path = DataPath::new("V", "M", "A");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"V/M/A\"");
        let back: DataPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
