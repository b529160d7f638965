//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a cubic `size x size x size` grid
//! of blocks (X and Z horizontal, Y vertical) with a derived per-column height
//! map, a buffered mesh, and an atomically readable readiness flag.
//!
//! ## Lifecycle
//!
//! A chunk moves through four states:
//!
//! ```text
//! Unallocated -> Allocated -> Populated -> Meshed
//! ```
//!
//! `allocate` reserves storage, `populate` fills columns from a height
//! function, and `generate_mesh` (in [`chunk_meshing`]) emits geometry.
//! `clear` returns the chunk to `Unallocated` from any state, forcing the
//! readiness flag false before storage is dropped so a consumer never
//! observes `ready == true` against torn-down data.
//!
//! ## Terrain Shape
//!
//! Populated terrain has no overhangs or caves: each column is solid from
//! y = 0 up to its height and empty above it. The mesher leans on this - once
//! a lateral neighbor turns solid at some layer, it is solid at every layer
//! below, so the face in that direction is occluded for the rest of the
//! column's descent.

mod chunk_meshing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use log::debug;
use thiserror::Error;

use crate::meshing::{AttributeFormat, AttributeLayout, ChannelId, GeometrySink, MeshBuffer};

use super::block::{BlockType, CellState};
use super::palette::Palette;

/// A chunk lifecycle contract violation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// `populate` was called before `allocate`.
    #[error("chunk storage has not been allocated")]
    NotAllocated,
    /// `generate_mesh` was called before `populate`.
    #[error("chunk has not been populated")]
    NotPopulated,
}

/// The lifecycle state of a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkState {
    /// No storage reserved.
    Unallocated,
    /// Block and height storage reserved, heights zeroed.
    Allocated,
    /// Heights and blocks filled from a height function.
    Populated,
    /// Geometry emitted; the readiness flag is true.
    Meshed,
}

/// A cloneable, non-blocking view of one chunk's readiness flag.
///
/// Lets a consumer poll whether a chunk's mesh is complete without taking the
/// chunk's lock. The load uses acquire ordering, pairing with the release
/// store at the end of mesh generation, so a `true` observation guarantees
/// the chunk's geometry writes are visible.
#[derive(Clone, Debug)]
pub struct ReadyFlag(Arc<AtomicBool>);

impl ReadyFlag {
    /// Whether the chunk's mesh is complete and safe to read.
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A cubic grid of blocks with a derived height map and buffered mesh.
///
/// The chunk exclusively owns its block grid, height map, and mesh buffer;
/// during background generation, the owning task must hold exclusive access
/// (see [`MtResource`](crate::core::MtResource)) for the whole
/// allocate/populate/mesh pipeline. The readiness flag is the only field with
/// a cross-thread contract while generation is in flight.
pub struct Chunk {
    state: ChunkState,
    blocks: Vec<BlockType>,
    heights: Vec<i32>,
    mesh: MeshBuffer,
    normal_channel: ChannelId,
    color_channel: ChannelId,
    ready: Arc<AtomicBool>,
    palette: Palette,
    size: i32,
    block_size: i32,
    x_offset: i32,
    z_offset: i32,
    position: Vector3<f32>,
    transform: Matrix4<f32>,
}

impl Chunk {
    /// Creates an unallocated chunk of `size^3` cells at `block_size` world
    /// units per block.
    ///
    /// The mesh buffer and its normal/color attribute channels are created up
    /// front; block storage is deferred to [`Chunk::allocate`] so it can
    /// happen on a background thread.
    ///
    /// # Panics
    /// Panics if `size` or `block_size` is not positive.
    pub fn new(size: i32, block_size: i32, palette: Palette) -> Self {
        assert!(size > 0, "chunk size must be positive");
        assert!(block_size > 0, "block size must be positive");

        let mut mesh = MeshBuffer::new();
        let normal_channel = mesh.create_attribute_channel(AttributeLayout {
            name: "normal",
            format: AttributeFormat::Float3,
        });
        let color_channel = mesh.create_attribute_channel(AttributeLayout {
            name: "color",
            format: AttributeFormat::Float3,
        });

        Chunk {
            state: ChunkState::Unallocated,
            blocks: Vec::new(),
            heights: Vec::new(),
            mesh,
            normal_channel,
            color_channel,
            ready: Arc::new(AtomicBool::new(false)),
            palette,
            size,
            block_size,
            x_offset: 0,
            z_offset: 0,
            position: Vector3::new(0.0, 0.0, 0.0),
            transform: Matrix4::identity(),
        }
    }

    /// Reserves block storage (`size^3` cells) and zeroed height storage
    /// (`size^2` columns).
    ///
    /// No-op on an already-allocated chunk: storage and any existing heights
    /// are left untouched. On actual allocation the readiness flag is forced
    /// false.
    pub fn allocate(&mut self) {
        if self.state != ChunkState::Unallocated {
            return;
        }

        let size = self.size as usize;
        self.blocks.resize(size * size * size, BlockType::Empty);
        self.heights.resize(size * size, 0);
        self.set_ready(false);
        self.state = ChunkState::Allocated;
    }

    /// Records the chunk's grid cell and computes its world-space placement.
    ///
    /// The X placement deliberately overlaps adjacent chunks by two blocks
    /// (`gx * (block_size * size - 2 * block_size)`) to close the visual seam
    /// left by unmeshed border columns; Z chunks tile edge to edge.
    pub fn set_offset(&mut self, gx: i32, gz: i32) {
        self.x_offset = gx;
        self.z_offset = gz;
        self.position = Vector3::new(
            (gx * (self.block_size * self.size - 2 * self.block_size)) as f32,
            0.0,
            (gz * self.block_size * self.size) as f32,
        );
        self.transform = Matrix4::from_translation(self.position);
    }

    /// Fills every column from a height function.
    ///
    /// `height_fn` receives world-translated column coordinates
    /// (`x + size * gx`, `z + size * gz`) so noise stays continuous across
    /// chunk boundaries, and returns a value in `[0, 1]`. The column height is
    /// `ceil(value * (size - 1))` clamped to `[0, size]`; blocks `0..h-1` are
    /// filled solid with the topmost tagged [`BlockType::SolidTop`].
    ///
    /// Resets the readiness flag and any previously generated mesh before
    /// mutating, so repopulating a meshed chunk is safe.
    ///
    /// # Errors
    /// [`ChunkError::NotAllocated`] if `allocate` has not been called.
    pub fn populate<F>(&mut self, height_fn: F) -> Result<(), ChunkError>
    where
        F: Fn(i32, i32) -> f32,
    {
        if self.state == ChunkState::Unallocated {
            return Err(ChunkError::NotAllocated);
        }

        let timer = Instant::now();
        self.set_ready(false);
        self.mesh.clear();
        self.blocks.fill(BlockType::Empty);

        for x in 0..self.size {
            for z in 0..self.size {
                let sample = height_fn(x + self.size * self.x_offset, z + self.size * self.z_offset);
                let height = (sample * (self.size - 1) as f32).ceil() as i32;
                let height = height.clamp(0, self.size);

                for layer in 0..height {
                    let block = if layer == height - 1 {
                        BlockType::SolidTop
                    } else {
                        BlockType::Solid
                    };
                    let loc = self.block_loc(x, z, layer);
                    self.blocks[loc] = block;
                }
                let loc = self.column_loc(x, z);
                self.heights[loc] = height;
            }
        }

        self.state = ChunkState::Populated;
        debug!(
            "Populated chunk ({}, {}) in {:?}",
            self.x_offset,
            self.z_offset,
            timer.elapsed()
        );
        Ok(())
    }

    /// Idempotent one-shot flush of the buffered geometry to the sink target.
    ///
    /// Returns `true` only the first time new geometry is flushed.
    pub fn flush_mesh(&mut self) -> bool {
        self.mesh.flush()
    }

    /// Non-blocking read of the readiness flag (acquire ordering).
    pub fn mesh_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Returns a cloneable handle for polling readiness without the chunk lock.
    pub fn ready_flag(&self) -> ReadyFlag {
        ReadyFlag(self.ready.clone())
    }

    /// Forces the readiness flag false ahead of teardown.
    ///
    /// Call before [`Chunk::clear`] when a consumer on another thread may
    /// still be polling; `clear` also does this itself, first thing.
    pub fn prepare_for_clearing(&mut self) {
        self.set_ready(false);
    }

    /// Drops block, height, and mesh storage, returning to `Unallocated`.
    ///
    /// The readiness flag is forced false *before* any storage is touched.
    pub fn clear(&mut self) {
        self.prepare_for_clearing();
        self.blocks = Vec::new();
        self.heights = Vec::new();
        self.mesh.clear();
        self.state = ChunkState::Unallocated;
    }

    /// The chunk's lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The chunk's edge length in blocks.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// The world-unit scale of one block.
    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    /// The chunk's `(gx, gz)` grid cell.
    pub fn offset(&self) -> (i32, i32) {
        (self.x_offset, self.z_offset)
    }

    /// The chunk's world-space placement.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// The cached translation matrix for the renderer.
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// The chunk's world-space dimensions.
    pub fn dimensions(&self) -> Vector3<f32> {
        let extent = (self.size * self.block_size) as f32;
        Vector3::new(extent, extent, extent)
    }

    /// The buffered mesh.
    pub fn mesh(&self) -> &MeshBuffer {
        &self.mesh
    }

    /// The attribute channel holding per-vertex normals.
    pub fn normal_channel(&self) -> ChannelId {
        self.normal_channel
    }

    /// The attribute channel holding per-vertex colors.
    pub fn color_channel(&self) -> ChannelId {
        self.color_channel
    }

    /// The populated height of column `(x, z)`.
    ///
    /// # Panics
    /// Panics if the column is out of bounds or the chunk is unallocated.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        self.heights[self.column_loc(x, z)]
    }

    /// The block at `(x, z, y)`, or `Empty` when out of bounds.
    pub fn block_at(&self, x: i32, z: i32, y: i32) -> BlockType {
        if !self.in_bounds(x, z, y) {
            return BlockType::Empty;
        }
        self.blocks[self.block_loc(x, z, y)]
    }

    /// Classifies the cell at `(x, z, y)` for neighbor visibility tests.
    ///
    /// Boundary columns classify as [`CellState::Edge`] before anything else;
    /// all remaining out-of-bounds coordinates classify as
    /// [`CellState::Nonexistent`]. Indexing only happens after both checks
    /// pass, so a query can never read adjacent memory.
    pub fn cell_state(&self, x: i32, z: i32, y: i32) -> CellState {
        if x == 0 || x == self.size - 1 || z == 0 || z == self.size - 1 {
            return CellState::Edge;
        }
        if !self.in_bounds(x, z, y) {
            return CellState::Nonexistent;
        }

        match self.blocks[self.block_loc(x, z, y)] {
            BlockType::Empty => CellState::Nonexistent,
            BlockType::Solid => CellState::Body,
            BlockType::SolidTop => CellState::Top,
        }
    }

    pub(super) fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub(super) fn set_state(&mut self, state: ChunkState) {
        self.state = state;
    }

    pub(super) fn palette(&self) -> &Palette {
        &self.palette
    }

    pub(super) fn mesh_mut(&mut self) -> &mut MeshBuffer {
        &mut self.mesh
    }

    fn in_bounds(&self, x: i32, z: i32, y: i32) -> bool {
        x >= 0 && x < self.size && z >= 0 && z < self.size && y >= 0 && y < self.size
    }

    fn column_loc(&self, x: i32, z: i32) -> usize {
        (self.size * z + x) as usize
    }

    fn block_loc(&self, x: i32, z: i32, y: i32) -> usize {
        (self.size * (z + self.size * y) + x) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f32) -> impl Fn(i32, i32) -> f32 {
        move |_, _| value
    }

    #[test]
    fn allocate_is_idempotent() {
        let mut chunk = Chunk::new(8, 4, Palette::terrain());
        chunk.allocate();
        chunk.populate(flat(0.5)).unwrap();
        let expected = chunk.height_at(3, 3);

        chunk.allocate();
        assert_eq!(chunk.state(), ChunkState::Populated);
        assert_eq!(chunk.height_at(3, 3), expected);
    }

    #[test]
    fn populate_requires_allocation() {
        let mut chunk = Chunk::new(8, 4, Palette::terrain());
        assert_eq!(chunk.populate(flat(0.5)), Err(ChunkError::NotAllocated));
    }

    #[test]
    fn heights_follow_the_ceil_formula() {
        let size = 8;
        let mut chunk = Chunk::new(size, 4, Palette::terrain());
        chunk.allocate();
        let height_fn = |x: i32, z: i32| ((x + z) as f32 / 20.0).min(1.0);
        chunk.populate(height_fn).unwrap();

        for x in 0..size {
            for z in 0..size {
                let expected = (height_fn(x, z) * (size - 1) as f32).ceil() as i32;
                assert_eq!(chunk.height_at(x, z), expected.clamp(0, size));
            }
        }
    }

    #[test]
    fn columns_are_solid_up_to_their_height() {
        let size = 8;
        let mut chunk = Chunk::new(size, 4, Palette::terrain());
        chunk.allocate();
        chunk
            .populate(|x, z| ((x * 7 + z * 13) % 10) as f32 / 10.0)
            .unwrap();

        for x in 0..size {
            for z in 0..size {
                let height = chunk.height_at(x, z);
                let solid = (0..size)
                    .filter(|&y| chunk.block_at(x, z, y).is_solid())
                    .count() as i32;
                assert_eq!(solid, height);

                if height > 0 {
                    assert_eq!(chunk.block_at(x, z, height - 1), BlockType::SolidTop);
                }
                for y in height..size {
                    assert_eq!(chunk.block_at(x, z, y), BlockType::Empty);
                }
            }
        }
    }

    #[test]
    fn repopulating_shrinks_columns() {
        let mut chunk = Chunk::new(8, 4, Palette::terrain());
        chunk.allocate();
        chunk.populate(flat(1.0)).unwrap();
        assert_eq!(chunk.height_at(4, 4), 7);

        chunk.populate(flat(0.2)).unwrap();
        let height = chunk.height_at(4, 4);
        assert!(height < 7);
        // Blocks above the new height must have been wiped.
        assert_eq!(chunk.block_at(4, 4, height), BlockType::Empty);
    }

    #[test]
    fn seam_offset_formula() {
        let mut chunk = Chunk::new(8, 4, Palette::terrain());
        chunk.set_offset(1, 0);
        assert_eq!(chunk.position(), Vector3::new(24.0, 0.0, 0.0));

        chunk.set_offset(0, 1);
        assert_eq!(chunk.position(), Vector3::new(0.0, 0.0, 32.0));
        assert_eq!(chunk.offset(), (0, 1));
    }

    #[test]
    fn cell_state_sentinels() {
        let size = 8;
        let mut chunk = Chunk::new(size, 4, Palette::terrain());
        chunk.allocate();
        chunk.populate(flat(1.0)).unwrap();

        // Boundary columns classify as Edge regardless of y.
        assert_eq!(chunk.cell_state(0, 4, 3), CellState::Edge);
        assert_eq!(chunk.cell_state(size - 1, 4, 3), CellState::Edge);
        assert_eq!(chunk.cell_state(4, 0, 3), CellState::Edge);

        // Out-of-bounds interior queries classify as Nonexistent.
        assert_eq!(chunk.cell_state(4, 4, -1), CellState::Nonexistent);
        assert_eq!(chunk.cell_state(4, 4, size), CellState::Nonexistent);

        // Interior cells classify by block type; height is size - 1 here.
        assert_eq!(chunk.cell_state(4, 4, 0), CellState::Body);
        assert_eq!(chunk.cell_state(4, 4, size - 2), CellState::Top);
        assert_eq!(chunk.cell_state(4, 4, size - 1), CellState::Nonexistent);
    }

    #[test]
    fn clear_forces_ready_false_and_drops_storage() {
        let mut chunk = Chunk::new(8, 4, Palette::terrain());
        chunk.allocate();
        chunk.populate(flat(0.5)).unwrap();
        chunk.generate_mesh().unwrap();
        assert!(chunk.mesh_ready());

        let flag = chunk.ready_flag();
        chunk.clear();
        assert!(!flag.is_ready());
        assert_eq!(chunk.state(), ChunkState::Unallocated);
        assert_eq!(chunk.mesh().vertex_count(), 0);
    }
}
