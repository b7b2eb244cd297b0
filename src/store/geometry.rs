//! Grid geometry descriptors.
//!
//! A [`DataContainer`](crate::store::DataContainer) owns at most one
//! geometry describing the spatial layout its cell data is defined on. The
//! external form is a structured record: kind, three integer dimensions,
//! three float spacings, three float origins.

use serde::{Deserialize, Serialize};

/// The spatial layout a geometry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryKind {
    /// Regular axis-aligned voxel grid with uniform spacing per axis
    #[default]
    Image,
    /// Rectilinear grid with per-plane spacing (reserved; no filter emits it yet)
    RectGrid,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Image => write!(f, "Image"),
            GeometryKind::RectGrid => write!(f, "RectGrid"),
        }
    }
}

/// Regular-grid geometry: dimensions, per-axis spacing, and origin.
///
/// Dimensions are voxel counts along x, y, z; a 2-D image is simply
/// `[nx, ny, 1]` and a 1-D profile `[nx, 1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub kind: GeometryKind,
    pub dims: [usize; 3],
    pub spacing: [f32; 3],
    pub origin: [f32; 3],
}

impl Default for ImageGeometry {
    fn default() -> Self {
        Self {
            kind: GeometryKind::Image,
            dims: [0, 0, 0],
            spacing: [1.0, 1.0, 1.0],
            origin: [0.0, 0.0, 0.0],
        }
    }
}

impl ImageGeometry {
    /// Create an image geometry with unit spacing and zero origin.
    pub fn image(dims: [usize; 3]) -> Self {
        Self {
            dims,
            ..Default::default()
        }
    }

    /// Set the per-axis spacing.
    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: [f32; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Total number of voxels (`x * y * z`).
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Flat index of the voxel at `(x, y, z)`, x fastest.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    /// Inverse of [`ImageGeometry::index`].
    #[inline]
    pub fn coords(&self, index: usize) -> [usize; 3] {
        let x = index % self.dims[0];
        let y = (index / self.dims[0]) % self.dims[1];
        let z = index / (self.dims[0] * self.dims[1]);
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_count() {
        let geom = ImageGeometry::image([4, 3, 2]);
        assert_eq!(geom.voxel_count(), 24);
        assert_eq!(ImageGeometry::default().voxel_count(), 0);
    }

    #[test]
    fn test_index_coords_round_trip() {
        let geom = ImageGeometry::image([5, 4, 3]);
        for z in 0..3 {
            for y in 0..4 {
                for x in 0..5 {
                    let idx = geom.index(x, y, z);
                    assert_eq!(geom.coords(idx), [x, y, z]);
                }
            }
        }
    }

    #[test]
    fn test_builders() {
        let geom = ImageGeometry::image([2, 2, 2])
            .with_spacing([0.5, 0.5, 2.0])
            .with_origin([-1.0, 0.0, 1.0]);
        assert_eq!(geom.kind, GeometryKind::Image);
        assert_eq!(geom.spacing, [0.5, 0.5, 2.0]);
        assert_eq!(geom.origin, [-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_serde_record_form() {
        let geom = ImageGeometry::image([4, 4, 1]);
        let json = serde_json::to_string(&geom).unwrap();
        let back: ImageGeometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, geom);
        assert!(json.contains("\"kind\""));
        assert!(json.contains("\"dims\""));
        assert!(json.contains("\"spacing\""));
        assert!(json.contains("\"origin\""));
    }
}
