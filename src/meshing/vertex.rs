//! Vertex data for the terrain mesh.
//!
//! This module defines the position vertex format emitted by the chunk mesher.
//! Per-face normals and colors are not part of the vertex itself; they live in
//! separate attribute channels appended in lock-step with positions (see
//! [`GeometrySink`](super::GeometrySink)).

use cgmath::Point3;

/// A position vertex in block-size-scaled local chunk coordinates.
///
/// The layout is plain `[f32; 3]` so a renderer can hand the vertex buffer to
/// the GPU directly.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// X coordinate in chunk-local space
    x: f32,
    /// Y coordinate in chunk-local space
    y: f32,
    /// Z coordinate in chunk-local space
    z: f32,
}

impl Vertex {
    /// Creates a new vertex at the given position.
    pub fn new(pos: Point3<f32>) -> Self {
        Vertex {
            x: pos.x,
            y: pos.y,
            z: pos.z,
        }
    }

    /// Returns the vertex position.
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.x, self.y, self.z)
    }
}
