//! # World Generation Module
//!
//! This module lays out a rectangular grid of chunks with non-overlapping
//! world-space placements and drives each chunk's three-stage pipeline
//! (`allocate` -> `populate` -> `generate_mesh`) as one unit of background
//! work.
//!
//! ## Pipeline
//!
//! `WorldGenerator::generate_world` constructs the chunk collection up front
//! on the calling thread, then submits one fire-and-forget work unit per
//! chunk to the `"chunk-gen"` worker queue and returns immediately.
//! Completion is observed per chunk through its readiness flag; the grid as a
//! whole is done when `is_generating()` turns false.
//!
//! ## Epoch Guard
//!
//! Work units own `MtResource` handles into the chunk collection, so the
//! collection must not be rebuilt while any unit is still running. The
//! generator enforces this with an outstanding-task counter: a
//! `generate_world` call that overlaps a running generation is rejected with
//! [`WorldGenError::GenerationInFlight`] instead of mutating the collection
//! under the tasks' feet.

mod noise_field;
mod settings;

pub use noise_field::NoiseField;
pub use settings::{GenerationSettings, SettingsError};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cgmath::Vector3;
use log::{error, info};
use thiserror::Error;

use crate::core::MtResource;
use crate::task_management::WorkerPool;
use crate::voxels::{Chunk, Palette, ReadyFlag};

/// The worker queue that runs chunk generation pipelines.
pub const CHUNK_GENERATION_QUEUE: &str = "chunk-gen";

/// A rejected world-generation request.
#[derive(Debug, Error)]
pub enum WorldGenError {
    /// A previous generation's tasks have not all completed.
    #[error("a previous world generation is still in flight")]
    GenerationInFlight,
    /// The requested grid has no cells.
    #[error("world grid must have at least one column and row, got {cols}x{rows}")]
    EmptyGrid {
        /// Requested column count.
        cols: i32,
        /// Requested row count.
        rows: i32,
    },
    /// A settings value was out of range.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Lays out the chunk grid and dispatches generation work.
///
/// Owns the ordered chunk collection and a parallel list of world-space
/// placements (index *i* in both refers to the same chunk), plus the worker
/// pool the pipelines run on. The consumer-facing accessors (`chunks`,
/// `placements`, readiness queries) are all safe to use while generation is
/// in flight; chunk contents other than the readiness flag must only be read
/// after the flag is observed true.
pub struct WorldGenerator {
    chunks: Vec<MtResource<Chunk>>,
    placements: Vec<Vector3<f32>>,
    ready_flags: Vec<ReadyFlag>,
    pending: Arc<AtomicUsize>,
    workers: WorkerPool,
    palette: Palette,
}

impl WorldGenerator {
    /// Creates a generator running its pipelines on the given pool, coloring
    /// terrain with the default palette.
    pub fn new(workers: WorkerPool) -> Self {
        Self::with_palette(workers, Palette::terrain())
    }

    /// Creates a generator that meshes chunks with a custom palette.
    pub fn with_palette(workers: WorkerPool, palette: Palette) -> Self {
        WorldGenerator {
            chunks: Vec::new(),
            placements: Vec::new(),
            ready_flags: Vec::new(),
            pending: Arc::new(AtomicUsize::new(0)),
            workers,
            palette,
        }
    }

    /// Generates a square world of `round(sqrt(chunk_count))` chunks per side.
    ///
    /// See [`WorldGenerator::generate_grid`].
    pub fn generate_world(&mut self, settings: &GenerationSettings) -> Result<(), WorldGenError> {
        let dimension = settings.grid_dimension();
        self.generate_grid(settings, dimension, dimension)
    }

    /// Replaces the current world with a freshly generated `cols x rows` grid.
    ///
    /// Chunks are laid out row-major: chunk *i* occupies grid cell
    /// `(i % cols, (i / cols) % rows)`. The call validates settings, rebuilds
    /// the chunk collection, submits one background work unit per chunk, and
    /// returns without awaiting completion.
    ///
    /// # Errors
    /// - [`WorldGenError::GenerationInFlight`] if a previous generation has
    ///   unfinished tasks
    /// - [`WorldGenError::EmptyGrid`] for a degenerate grid
    /// - [`WorldGenError::Settings`] for out-of-range settings
    pub fn generate_grid(
        &mut self,
        settings: &GenerationSettings,
        cols: i32,
        rows: i32,
    ) -> Result<(), WorldGenError> {
        settings.validate()?;
        if cols <= 0 || rows <= 0 {
            return Err(WorldGenError::EmptyGrid { cols, rows });
        }
        if self.is_generating() {
            return Err(WorldGenError::GenerationInFlight);
        }

        let count = (cols * rows) as usize;
        info!(
            "Generating {cols}x{rows} world: chunk size {}, block size {}",
            settings.chunk_size, settings.block_size
        );

        let noise = Arc::new(NoiseField::new(
            settings.seed,
            settings.noise_scale,
            settings.noise_multiplier,
            settings.noise_x_offset,
            settings.noise_y_offset,
        ));

        self.chunks.clear();
        self.placements.clear();
        self.ready_flags.clear();
        self.pending.store(count, Ordering::Release);

        for i in 0..cols * rows {
            let gx = i % cols;
            let gz = (i / cols) % rows;

            let mut chunk = Chunk::new(settings.chunk_size, settings.block_size, self.palette.clone());
            chunk.set_offset(gx, gz);
            self.placements.push(chunk.position());
            self.ready_flags.push(chunk.ready_flag());

            let chunk = MtResource::new(chunk);
            self.chunks.push(chunk.clone());

            let noise = noise.clone();
            let pending = self.pending.clone();
            self.workers.submit(CHUNK_GENERATION_QUEUE, move || {
                {
                    // Hold the write lock for the whole pipeline so nothing
                    // observes the chunk mid-mutation.
                    let mut chunk = chunk.get_mut();
                    chunk.allocate();
                    let outcome = chunk
                        .populate(|x, z| noise.sample_normalized(x as f64, z as f64) as f32)
                        .and_then(|_| chunk.generate_mesh());
                    if let Err(err) = outcome {
                        // Unreachable given the allocate call above, but a
                        // contract violation must not strand the epoch.
                        error!("Chunk pipeline failed at {:?}: {err}", chunk.offset());
                    }
                }
                pending.fetch_sub(1, Ordering::AcqRel);
            });
        }

        Ok(())
    }

    /// Clears all chunks, dropping their readiness flags first.
    ///
    /// # Errors
    /// [`WorldGenError::GenerationInFlight`] if tasks are still running.
    pub fn clear(&mut self) -> Result<(), WorldGenError> {
        if self.is_generating() {
            return Err(WorldGenError::GenerationInFlight);
        }

        for chunk in &self.chunks {
            chunk.get_mut().clear();
        }
        self.chunks.clear();
        self.placements.clear();
        self.ready_flags.clear();
        Ok(())
    }

    /// Whether any generation task of the current epoch is still running.
    pub fn is_generating(&self) -> bool {
        self.pending.load(Ordering::Acquire) != 0
    }

    /// The ordered chunk collection of the current world.
    pub fn chunks(&self) -> &[MtResource<Chunk>] {
        &self.chunks
    }

    /// World-space placements, indexed identically to [`WorldGenerator::chunks`].
    pub fn placements(&self) -> &[Vector3<f32>] {
        &self.placements
    }

    /// Number of chunks in the current world.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the world currently holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether chunk `index`'s mesh is ready, without taking its lock.
    pub fn chunk_ready(&self, index: usize) -> bool {
        self.ready_flags[index].is_ready()
    }

    /// Number of chunks whose meshes are currently ready.
    pub fn ready_count(&self) -> usize {
        self.ready_flags.iter().filter(|flag| flag.is_ready()).count()
    }
}
