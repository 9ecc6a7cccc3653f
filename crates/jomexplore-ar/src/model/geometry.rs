use crate::coords::{ColorRgba, Vec3};

use super::ModelCategory;

/// Where a piece of geometry came from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GeometrySource {
    /// Backed by the asset at `path`.
    Asset { path: String },
    /// Synthesized from a built-in table.
    Procedural,
}

/// Immutable, non-indexed triangle geometry with a flat color.
///
/// `positions` and `normals` are flat `xyz` triples of equal length; each run of three
/// vertices is one triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGeometry {
    category: ModelCategory,
    positions: Vec<f32>,
    normals: Vec<f32>,
    color: ColorRgba,
    source: GeometrySource,
}

impl ModelGeometry {
    /// Builds geometry from a flat triangle list, computing one face normal per triangle.
    ///
    /// Trailing floats that do not complete a triangle are dropped.
    pub(crate) fn from_triangles(
        category: ModelCategory,
        triangles: &[f32],
        color: ColorRgba,
        source: GeometrySource,
    ) -> Self {
        debug_assert_eq!(triangles.len() % 9, 0, "triangle list is not a multiple of 9");

        let whole = triangles.len() - triangles.len() % 9;
        let positions = triangles[..whole].to_vec();
        let mut normals = Vec::with_capacity(whole);

        for tri in positions.chunks_exact(9) {
            let n = face_normal(
                Vec3::new(tri[0], tri[1], tri[2]),
                Vec3::new(tri[3], tri[4], tri[5]),
                Vec3::new(tri[6], tri[7], tri[8]),
            );
            for _ in 0..3 {
                normals.extend_from_slice(&n.to_array());
            }
        }

        Self {
            category,
            positions,
            normals,
            color,
            source,
        }
    }

    #[inline]
    pub fn category(&self) -> ModelCategory {
        self.category
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    #[inline]
    pub fn color(&self) -> ColorRgba {
        self.color
    }

    #[inline]
    pub fn source(&self) -> &GeometrySource {
        &self.source
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Unit normal of triangle `(a, b, c)`: `normalize((b - a) × (c - a))`.
///
/// Degenerate triangles get the up vector.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::UP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_triangle_faces_plus_z() {
        let n = face_normal(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn degenerate_triangle_gets_up() {
        let p = Vec3::new(0.3, 0.3, 0.3);
        assert_eq!(face_normal(p, p, Vec3::new(0.6, 0.6, 0.6)), Vec3::UP);
    }

    #[test]
    fn normals_parallel_positions() {
        let tris = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0,
        ];
        let g = ModelGeometry::from_triangles(
            ModelCategory::Default,
            &tris,
            ColorRgba::gray(1.0),
            GeometrySource::Procedural,
        );
        assert_eq!(g.vertex_count(), 6);
        assert_eq!(g.normals().len(), g.positions().len());
        assert_eq!(&g.normals()[9..12], &[0.0, 1.0, 0.0]);
    }
}
