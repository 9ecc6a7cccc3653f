//! Built-in triangle tables.
//!
//! Every table is a flat, non-indexed triangle list (9 floats per triangle) in model
//! space: meters, +Y up, base resting on `y = 0`. Normals are never stored; the
//! geometry builder derives them.

use crate::coords::ColorRgba;

use super::ModelCategory;

pub(crate) struct GeometryTable {
    pub triangles: &'static [f32],
    pub color: ColorRgba,
}

/// Table used when no usable asset exists for `category`.
pub(crate) fn procedural(category: ModelCategory) -> &'static GeometryTable {
    match category {
        ModelCategory::BlueMosque => &MOSQUE,
        ModelCategory::BatuCaves => &CAVES,
        ModelCategory::MerdekaSquare => &SQUARE,
        ModelCategory::Default => &CUBE,
    }
}

/// Higher-detail table used once the category's asset is present.
pub(crate) fn detailed(category: ModelCategory) -> Option<&'static GeometryTable> {
    match category {
        ModelCategory::BlueMosque => Some(&MOSQUE_DETAILED),
        ModelCategory::BatuCaves => Some(&CAVES_DETAILED),
        ModelCategory::MerdekaSquare => Some(&SQUARE_DETAILED),
        ModelCategory::Default => None,
    }
}

// ── procedural ────────────────────────────────────────────────────────────

#[rustfmt::skip]
static MOSQUE: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.3, 0.6, 1.0, 1.0),
    triangles: &[
        // base
        -0.2, 0.0, -0.15,    0.2, 0.0, -0.15,    0.2, 0.2, -0.15,
        -0.2, 0.0, -0.15,    0.2, 0.2, -0.15,   -0.2, 0.2, -0.15,
        -0.2, 0.0,  0.15,   -0.2, 0.2,  0.15,    0.2, 0.2,  0.15,
        -0.2, 0.0,  0.15,    0.2, 0.2,  0.15,    0.2, 0.0,  0.15,
        // dome
        -0.15, 0.2, -0.1,    0.15, 0.2, -0.1,    0.0, 0.35, 0.0,
         0.15, 0.2, -0.1,    0.15, 0.2,  0.1,    0.0, 0.35, 0.0,
         0.15, 0.2,  0.1,   -0.15, 0.2,  0.1,    0.0, 0.35, 0.0,
        -0.15, 0.2,  0.1,   -0.15, 0.2, -0.1,    0.0, 0.35, 0.0,
        // minarets
        -0.3, 0.0, -0.05,   -0.25, 0.0, -0.05,  -0.25, 0.4, -0.05,
        -0.3, 0.0, -0.05,   -0.25, 0.4, -0.05,  -0.3, 0.4, -0.05,
         0.25, 0.0, -0.05,   0.3, 0.0, -0.05,    0.3, 0.4, -0.05,
         0.25, 0.0, -0.05,   0.3, 0.4, -0.05,    0.25, 0.4, -0.05,
    ],
};

#[rustfmt::skip]
static CAVES: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.8, 0.7, 0.5, 1.0),
    triangles: &[
        // entrance arch
        -0.25, 0.0, 0.0,    -0.15, 0.3, 0.0,    -0.05, 0.2, 0.0,
        -0.05, 0.2, 0.0,     0.05, 0.2, 0.0,     0.15, 0.3, 0.0,
         0.15, 0.3, 0.0,     0.25, 0.0, 0.0,     0.0, 0.0, 0.0,
        // statue
        -0.02, 0.0, -0.1,    0.02, 0.0, -0.1,    0.02, 0.5, -0.1,
        -0.02, 0.0, -0.1,    0.02, 0.5, -0.1,   -0.02, 0.5, -0.1,
        // steps
        -0.3, 0.0, -0.2,     0.3, 0.0, -0.2,     0.3, 0.05, -0.15,
        -0.3, 0.0, -0.2,     0.3, 0.05, -0.15,  -0.3, 0.05, -0.15,
    ],
};

#[rustfmt::skip]
static SQUARE: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.6, 0.8, 0.4, 1.0),
    triangles: &[
        // flagpole
        -0.01, 0.0, 0.0,     0.01, 0.0, 0.0,     0.01, 0.6, 0.0,
        -0.01, 0.0, 0.0,     0.01, 0.6, 0.0,    -0.01, 0.6, 0.0,
        // square base
        -0.3, 0.0, -0.3,     0.3, 0.0, -0.3,     0.3, 0.02, -0.3,
        -0.3, 0.0, -0.3,     0.3, 0.02, -0.3,   -0.3, 0.02, -0.3,
        -0.3, 0.0,  0.3,    -0.3, 0.02,  0.3,    0.3, 0.02,  0.3,
        -0.3, 0.0,  0.3,     0.3, 0.02,  0.3,    0.3, 0.0,  0.3,
        // surrounding buildings
        -0.2, 0.0, 0.4,     -0.1, 0.0, 0.4,     -0.1, 0.25, 0.4,
        -0.2, 0.0, 0.4,     -0.1, 0.25, 0.4,    -0.2, 0.25, 0.4,
         0.1, 0.0, 0.4,      0.2, 0.0, 0.4,      0.2, 0.3, 0.4,
         0.1, 0.0, 0.4,      0.2, 0.3, 0.4,      0.1, 0.3, 0.4,
    ],
};

#[rustfmt::skip]
static CUBE: GeometryTable = GeometryTable {
    color: ColorRgba::new(1.0, 0.5, 0.0, 1.0),
    triangles: &[
        // +z
        -0.1, -0.1,  0.1,    0.1, -0.1,  0.1,    0.1,  0.1,  0.1,
        -0.1, -0.1,  0.1,    0.1,  0.1,  0.1,   -0.1,  0.1,  0.1,
        // -z
        -0.1, -0.1, -0.1,   -0.1,  0.1, -0.1,    0.1,  0.1, -0.1,
        -0.1, -0.1, -0.1,    0.1,  0.1, -0.1,    0.1, -0.1, -0.1,
        // +y
        -0.1,  0.1, -0.1,   -0.1,  0.1,  0.1,    0.1,  0.1,  0.1,
        -0.1,  0.1, -0.1,    0.1,  0.1,  0.1,    0.1,  0.1, -0.1,
        // -y
        -0.1, -0.1, -0.1,    0.1, -0.1, -0.1,    0.1, -0.1,  0.1,
        -0.1, -0.1, -0.1,    0.1, -0.1,  0.1,   -0.1, -0.1,  0.1,
        // +x
         0.1, -0.1, -0.1,    0.1,  0.1, -0.1,    0.1,  0.1,  0.1,
         0.1, -0.1, -0.1,    0.1,  0.1,  0.1,    0.1, -0.1,  0.1,
        // -x
        -0.1, -0.1, -0.1,   -0.1, -0.1,  0.1,   -0.1,  0.1,  0.1,
        -0.1, -0.1, -0.1,   -0.1,  0.1,  0.1,   -0.1,  0.1, -0.1,
    ],
};

// ── detailed ──────────────────────────────────────────────────────────────

#[rustfmt::skip]
static MOSQUE_DETAILED: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.15, 0.35, 0.7, 1.0),
    triangles: &[
        // main hall
        -0.4, 0.0, -0.3,     0.4, 0.0, -0.3,     0.4, 0.3, -0.3,
        -0.4, 0.0, -0.3,     0.4, 0.3, -0.3,    -0.4, 0.3, -0.3,
        -0.4, 0.0,  0.3,    -0.4, 0.3,  0.3,     0.4, 0.3,  0.3,
        -0.4, 0.0,  0.3,     0.4, 0.3,  0.3,     0.4, 0.0,  0.3,
        // side walls
        -0.4, 0.0, -0.3,    -0.4, 0.3, -0.3,    -0.4, 0.3,  0.3,
        -0.4, 0.0, -0.3,    -0.4, 0.3,  0.3,    -0.4, 0.0,  0.3,
         0.4, 0.0, -0.3,     0.4, 0.0,  0.3,     0.4, 0.3,  0.3,
         0.4, 0.0, -0.3,     0.4, 0.3,  0.3,     0.4, 0.3, -0.3,
        // dome drum
        -0.2, 0.3, -0.2,     0.2, 0.3, -0.2,     0.15, 0.45, -0.15,
        -0.2, 0.3, -0.2,     0.15, 0.45, -0.15, -0.15, 0.45, -0.15,
         0.2, 0.3, -0.2,     0.2, 0.3,  0.2,     0.15, 0.45,  0.15,
         0.2, 0.3, -0.2,     0.15, 0.45,  0.15,  0.15, 0.45, -0.15,
         0.2, 0.3,  0.2,    -0.2, 0.3,  0.2,    -0.15, 0.45,  0.15,
         0.2, 0.3,  0.2,    -0.15, 0.45,  0.15,  0.15, 0.45,  0.15,
        -0.2, 0.3,  0.2,    -0.2, 0.3, -0.2,    -0.15, 0.45, -0.15,
        -0.2, 0.3,  0.2,    -0.15, 0.45, -0.15, -0.15, 0.45,  0.15,
        // dome cap
        -0.15, 0.45, -0.15,  0.15, 0.45, -0.15,  0.0, 0.6, 0.0,
         0.15, 0.45, -0.15,  0.15, 0.45,  0.15,  0.0, 0.6, 0.0,
         0.15, 0.45,  0.15, -0.15, 0.45,  0.15,  0.0, 0.6, 0.0,
        -0.15, 0.45,  0.15, -0.15, 0.45, -0.15,  0.0, 0.6, 0.0,
        // minarets
        -0.5, 0.0, -0.08,   -0.42, 0.0, -0.08,  -0.42, 0.8, -0.08,
        -0.5, 0.0, -0.08,   -0.42, 0.8, -0.08,  -0.5, 0.8, -0.08,
         0.42, 0.0, -0.08,   0.5, 0.0, -0.08,    0.5, 0.8, -0.08,
         0.42, 0.0, -0.08,   0.5, 0.8, -0.08,    0.42, 0.8, -0.08,
        -0.5, 0.0,  0.08,   -0.42, 0.0,  0.08,  -0.42, 0.8,  0.08,
        -0.5, 0.0,  0.08,   -0.42, 0.8,  0.08,  -0.5, 0.8,  0.08,
         0.42, 0.0,  0.08,   0.5, 0.0,  0.08,    0.5, 0.8,  0.08,
         0.42, 0.0,  0.08,   0.5, 0.8,  0.08,    0.42, 0.8,  0.08,
        // minaret caps
        -0.5, 0.8, -0.08,   -0.42, 0.8, -0.08,  -0.46, 0.9, -0.04,
        -0.46, 0.9, -0.04,  -0.46, 0.9,  0.04,  -0.5, 0.8,  0.08,
         0.42, 0.8, -0.08,   0.5, 0.8, -0.08,    0.46, 0.9, -0.04,
         0.46, 0.9, -0.04,   0.46, 0.9,  0.04,   0.5, 0.8,  0.08,
    ],
};

#[rustfmt::skip]
static CAVES_DETAILED: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.9, 0.7, 0.2, 1.0),
    triangles: &[
        // entrance arch
        -0.4, 0.0, 0.0,     -0.3, 0.5, 0.0,     -0.2, 0.4, 0.0,
        -0.2, 0.4, 0.0,     -0.1, 0.45, 0.0,     0.0, 0.5, 0.0,
         0.0, 0.5, 0.0,      0.1, 0.45, 0.0,     0.2, 0.4, 0.0,
         0.2, 0.4, 0.0,      0.3, 0.5, 0.0,      0.4, 0.0, 0.0,
        // statue
        -0.04, 0.0, -0.2,    0.04, 0.0, -0.2,    0.04, 0.9, -0.2,
        -0.04, 0.0, -0.2,    0.04, 0.9, -0.2,   -0.04, 0.9, -0.2,
        // pedestal
        -0.1, 0.0, -0.18,    0.1, 0.0, -0.18,    0.1, 0.15, -0.18,
        -0.1, 0.0, -0.18,    0.1, 0.15, -0.18,  -0.1, 0.15, -0.18,
        // steps
        -0.5, 0.0, -0.3,     0.5, 0.0, -0.3,     0.5, 0.05, -0.25,
        -0.5, 0.0, -0.3,     0.5, 0.05, -0.25,  -0.5, 0.05, -0.25,
        -0.45, 0.05, -0.25,  0.45, 0.05, -0.25,  0.45, 0.1, -0.2,
        -0.45, 0.05, -0.25,  0.45, 0.1, -0.2,   -0.45, 0.1, -0.2,
        -0.4, 0.1, -0.2,     0.4, 0.1, -0.2,     0.4, 0.15, -0.15,
        -0.4, 0.1, -0.2,     0.4, 0.15, -0.15,  -0.4, 0.15, -0.15,
        // roof
        -0.6, 0.0, 0.1,     -0.4, 0.6, 0.1,     -0.2, 0.5, 0.1,
         0.0, 0.55, 0.1,     0.2, 0.5, 0.1,      0.4, 0.6, 0.1,
         0.4, 0.6, 0.1,      0.6, 0.0, 0.1,      0.0, 0.0, 0.1,
        // side walls
        -0.6, 0.0, 0.1,     -0.6, 0.4, 0.05,    -0.4, 0.6, 0.1,
         0.6, 0.0, 0.1,      0.4, 0.6, 0.1,      0.6, 0.4, 0.05,
    ],
};

#[rustfmt::skip]
static SQUARE_DETAILED: GeometryTable = GeometryTable {
    color: ColorRgba::new(0.3, 0.6, 0.3, 1.0),
    triangles: &[
        // flagpole
        -0.02, 0.0, 0.0,     0.02, 0.0, 0.0,     0.02, 1.0, 0.0,
        -0.02, 0.0, 0.0,     0.02, 1.0, 0.0,    -0.02, 1.0, 0.0,
        // flag
         0.02, 0.7, 0.0,     0.35, 0.7, 0.0,     0.35, 0.9, 0.0,
         0.02, 0.7, 0.0,     0.35, 0.9, 0.0,     0.02, 0.9, 0.0,
        // platform
        -0.5, 0.0, -0.5,     0.5, 0.0, -0.5,     0.5, 0.04, -0.5,
        -0.5, 0.0, -0.5,     0.5, 0.04, -0.5,   -0.5, 0.04, -0.5,
        -0.5, 0.0,  0.5,    -0.5, 0.04,  0.5,    0.5, 0.04,  0.5,
        -0.5, 0.0,  0.5,     0.5, 0.04,  0.5,    0.5, 0.0,  0.5,
        -0.5, 0.0, -0.5,    -0.5, 0.04, -0.5,   -0.5, 0.04,  0.5,
        -0.5, 0.0, -0.5,    -0.5, 0.04,  0.5,   -0.5, 0.0,  0.5,
         0.5, 0.0, -0.5,     0.5, 0.0,  0.5,     0.5, 0.04,  0.5,
         0.5, 0.0, -0.5,     0.5, 0.04,  0.5,    0.5, 0.04, -0.5,
        // buildings along the far edge
        -0.4, 0.0, 0.6,     -0.25, 0.0, 0.6,    -0.25, 0.4, 0.6,
        -0.4, 0.0, 0.6,     -0.25, 0.4, 0.6,    -0.4, 0.4, 0.6,
        -0.15, 0.0, 0.6,     0.0, 0.0, 0.6,      0.0, 0.35, 0.6,
        -0.15, 0.0, 0.6,     0.0, 0.35, 0.6,    -0.15, 0.35, 0.6,
         0.1, 0.0, 0.6,      0.4, 0.0, 0.6,      0.4, 0.45, 0.6,
         0.1, 0.0, 0.6,      0.4, 0.45, 0.6,     0.1, 0.45, 0.6,
        // clock tower
         0.4, 0.0, -0.55,    0.5, 0.0, -0.55,    0.5, 0.7, -0.55,
         0.4, 0.0, -0.55,    0.5, 0.7, -0.55,    0.4, 0.7, -0.55,
         0.4, 0.7, -0.55,    0.5, 0.7, -0.55,    0.45, 0.8, -0.52,
        // side building
        -0.6, 0.0, -0.3,    -0.45, 0.0, -0.3,   -0.45, 0.3, -0.3,
        -0.6, 0.0, -0.3,    -0.45, 0.3, -0.3,   -0.6, 0.3, -0.3,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ModelCategory; 4] = [
        ModelCategory::BlueMosque,
        ModelCategory::BatuCaves,
        ModelCategory::MerdekaSquare,
        ModelCategory::Default,
    ];

    #[test]
    fn every_table_is_whole_triangles() {
        for c in ALL {
            assert_eq!(procedural(c).triangles.len() % 9, 0, "{c:?}");
            if let Some(t) = detailed(c) {
                assert_eq!(t.triangles.len() % 9, 0, "{c:?} detailed");
            }
        }
    }

    #[test]
    fn triangle_counts() {
        assert_eq!(procedural(ModelCategory::BlueMosque).triangles.len() / 9, 12);
        assert_eq!(procedural(ModelCategory::BatuCaves).triangles.len() / 9, 7);
        assert_eq!(procedural(ModelCategory::MerdekaSquare).triangles.len() / 9, 10);
        assert_eq!(procedural(ModelCategory::Default).triangles.len() / 9, 12);
        assert!(detailed(ModelCategory::Default).is_none());
    }
}
