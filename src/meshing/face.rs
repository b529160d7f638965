//! Static face descriptors for quad emission.
//!
//! Every quad the mesher emits is an axis-aligned rectangle between a cell's
//! start and end coordinates. A `FaceDescriptor` captures everything that
//! varies between the five face kinds: which neighbor cell occludes the face,
//! which start/end corner each of the four vertices selects, and the face
//! normal. The mesher resolves the selectors against the current cell's
//! `[start, end]` extents per axis and emits the corners in descriptor order,
//! so the winding is identical for every face of a kind.

use cgmath::Vector3;

/// Selects the start (0) or end (1) coordinate of an axis for one corner.
pub type CornerSelector = [u8; 3];

/// Describes one face kind: its occluding neighbor, corners, and normal.
pub struct FaceDescriptor {
    /// Offset `(dx, dz)` of the neighbor column whose cell occludes this face.
    /// `(0, 0)` for the top face, which is occluded by the cell above instead.
    pub neighbor: (i32, i32),
    /// Start/end selectors for the four corners, in emission order.
    /// Triangulated as `(v0, v1, v3)` and `(v3, v1, v2)`.
    pub corners: [CornerSelector; 4],
    /// The flat per-face normal.
    pub normal: Vector3<f32>,
}

/// The four lateral face kinds, in `(+X, -X, +Z, -Z)` neighbor order.
pub const LATERAL_FACES: [FaceDescriptor; 4] = [
    // Face on the cell's +X plane, visible when the +X neighbor is absent.
    FaceDescriptor {
        neighbor: (1, 0),
        corners: [[1, 1, 0], [1, 0, 0], [1, 0, 1], [1, 1, 1]],
        normal: Vector3 {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        },
    },
    // Face on the cell's -X plane, visible when the -X neighbor is absent.
    FaceDescriptor {
        neighbor: (-1, 0),
        corners: [[0, 1, 0], [0, 0, 0], [0, 0, 1], [0, 1, 1]],
        normal: Vector3 {
            x: -1.0,
            y: 0.0,
            z: 0.0,
        },
    },
    // Face on the cell's +Z plane, visible when the +Z neighbor is absent.
    FaceDescriptor {
        neighbor: (0, 1),
        corners: [[0, 1, 1], [0, 0, 1], [1, 0, 1], [1, 1, 1]],
        normal: Vector3 {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        },
    },
    // Face on the cell's -Z plane, visible when the -Z neighbor is absent.
    FaceDescriptor {
        neighbor: (0, -1),
        corners: [[0, 1, 0], [0, 0, 0], [1, 0, 0], [1, 1, 0]],
        normal: Vector3 {
            x: 0.0,
            y: 0.0,
            z: -1.0,
        },
    },
];

/// The upward-facing top face, emitted at a column's topmost occupied layer.
pub const TOP_FACE: FaceDescriptor = FaceDescriptor {
    neighbor: (0, 0),
    corners: [[0, 1, 1], [0, 1, 0], [1, 1, 0], [1, 1, 1]],
    normal: Vector3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    },
};
