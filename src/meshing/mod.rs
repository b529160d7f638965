//! # Meshing Module
//!
//! This module owns the boundary between chunk meshing and rendering: the
//! [`GeometrySink`] contract that the mesher writes into, and [`MeshBuffer`],
//! the CPU-side implementation that buffers vertices, triangle indices, and
//! per-vertex attribute channels until a renderer uploads them.
//!
//! ## Attribute Channels
//!
//! Normals and colors are flat per face, so the mesher appends the same value
//! four times per quad - once per corner vertex, in the same order the corner
//! vertices were created. A sink may therefore assume channel values arrive in
//! lock-step with positions, and a well-formed mesh always satisfies
//! `attribute_count(channel) == vertex_count()`.

mod face;
mod vertex;

pub use face::{CornerSelector, FaceDescriptor, LATERAL_FACES, TOP_FACE};
pub use vertex::Vertex;

use cgmath::{Point3, Vector3};
use log::debug;

/// Identifies an attribute channel created on a [`GeometrySink`].
pub type ChannelId = usize;

/// Describes the data layout of one attribute channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeLayout {
    /// The shader-facing name of the attribute, e.g. `"normal"`.
    pub name: &'static str,
    /// The component format of each value.
    pub format: AttributeFormat,
}

/// The component format of an attribute value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeFormat {
    /// Three 32-bit floats per vertex.
    Float3,
}

/// The target that receives emitted geometry.
///
/// In the full system this is backed by a GPU mesh; the mesher only requires
/// the operations below. Vertices are appended one at a time and connected
/// into triangles by index; attribute values are appended per channel in the
/// same order the vertices were created.
pub trait GeometrySink {
    /// Creates a new per-vertex attribute channel and returns its id.
    fn create_attribute_channel(&mut self, layout: AttributeLayout) -> ChannelId;

    /// Appends a position vertex and returns its index.
    fn add_vertex(&mut self, position: Point3<f32>) -> u32;

    /// Appends one value to an attribute channel.
    ///
    /// Values must be appended in lock-step with position vertices.
    fn add_attribute(&mut self, channel: ChannelId, value: Vector3<f32>);

    /// Records one triangle by vertex index.
    fn connect_vertices(&mut self, a: u32, b: u32, c: u32);

    /// One-shot flush of the buffered geometry to the external target.
    ///
    /// Idempotent: returns `true` the first time after new geometry was
    /// buffered and `false` on repeat calls until the sink is cleared.
    fn flush(&mut self) -> bool;

    /// Drops all buffered geometry and re-arms `flush`.
    fn clear(&mut self);

    /// The number of position vertices currently buffered.
    fn vertex_count(&self) -> usize;

    /// The number of triangle indices currently buffered.
    fn index_count(&self) -> usize;

    /// The number of values currently buffered in an attribute channel.
    fn attribute_count(&self, channel: ChannelId) -> usize;
}

/// One attribute channel of a [`MeshBuffer`].
#[derive(Debug)]
struct AttributeChannel {
    layout: AttributeLayout,
    values: Vec<[f32; 3]>,
}

/// A CPU-side [`GeometrySink`] buffering geometry for later GPU upload.
///
/// The renderer-facing accessors (`vertices`, `indices`, `attribute_values`)
/// expose the raw buffers; `Vertex` is `bytemuck::Pod`, so the vertex buffer
/// can be cast to bytes without copying.
#[derive(Debug, Default)]
pub struct MeshBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    channels: Vec<AttributeChannel>,
    flushed: bool,
}

impl MeshBuffer {
    /// Creates a new, empty mesh buffer with no attribute channels.
    pub fn new() -> Self {
        MeshBuffer {
            vertices: Vec::new(),
            indices: Vec::new(),
            channels: Vec::new(),
            flushed: false,
        }
    }

    /// Returns the buffered position vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the buffered triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the buffered values of one attribute channel.
    ///
    /// # Panics
    /// Panics if `channel` was not created on this buffer.
    pub fn attribute_values(&self, channel: ChannelId) -> &[[f32; 3]] {
        &self.channels[channel].values
    }

    /// Returns the layout a channel was created with.
    ///
    /// # Panics
    /// Panics if `channel` was not created on this buffer.
    pub fn attribute_layout(&self, channel: ChannelId) -> AttributeLayout {
        self.channels[channel].layout
    }

    /// Whether the buffered geometry has already been flushed.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }
}

impl GeometrySink for MeshBuffer {
    fn create_attribute_channel(&mut self, layout: AttributeLayout) -> ChannelId {
        self.channels.push(AttributeChannel {
            layout,
            values: Vec::new(),
        });
        self.channels.len() - 1
    }

    fn add_vertex(&mut self, position: Point3<f32>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(position));
        index
    }

    fn add_attribute(&mut self, channel: ChannelId, value: Vector3<f32>) {
        self.channels[channel].values.push(value.into());
    }

    fn connect_vertices(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn flush(&mut self) -> bool {
        if self.flushed {
            return false;
        }
        debug!(
            "Flushing mesh buffer: {} vertices, {} indices",
            self.vertices.len(),
            self.indices.len()
        );
        self.flushed = true;
        true
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        for channel in &mut self.channels {
            channel.values.clear();
        }
        self.flushed = false;
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn attribute_count(&self, channel: ChannelId) -> usize {
        self.channels[channel].values.len()
    }
}
