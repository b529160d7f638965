#![warn(missing_docs)]

//! # Voxel Terrain
//!
//! A chunked voxel terrain generator that turns coherent noise into renderable
//! geometry.
//!
//! The crate owns the full CPU side of the pipeline: a deterministic fractal
//! noise field drives a per-column height map, the height map fills a cubic
//! block grid per chunk, and a face-culling mesher converts that grid into a
//! flat vertex/index description with per-face normals and colors. Chunk
//! pipelines run on background worker threads and publish completion through
//! an atomic readiness flag, so a render-thread consumer can poll chunks and
//! upload their geometry without ever blocking on generation.
//!
//! ## Key Modules
//!
//! * `core` - Shared-resource primitives used to hand chunks between threads
//! * `task_management` - Named worker queues for fire-and-forget background work
//! * `voxels` - Block types, chunks, and the block-to-mesh conversion
//! * `meshing` - The geometry sink contract and its CPU-buffer implementation
//! * `worldgen` - Noise sampling, generation settings, and world orchestration
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_terrain::task_management::WorkerPool;
//! use voxel_terrain::worldgen::{GenerationSettings, WorldGenerator};
//!
//! let mut generator = WorldGenerator::new(WorkerPool::with_default_parallelism());
//! generator.generate_world(&GenerationSettings::default()).unwrap();
//!
//! // On the render thread, poll readiness and draw whatever has finished.
//! for chunk in generator.chunks() {
//!     if chunk.get().mesh_ready() {
//!         // upload chunk.get().mesh() ...
//!     }
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! Each chunk pipeline (`allocate` -> `populate` -> `generate_mesh`) runs as a
//! single unit of background work holding the chunk's write lock for its whole
//! duration. The readiness flag is the only field shared across threads while
//! a pipeline is in flight: it is stored with release ordering after meshing
//! completes and loaded with acquire ordering by consumers, so every write made
//! during generation is visible to any thread that observes `mesh_ready()`.

pub mod core;
pub mod meshing;
pub mod task_management;
pub mod voxels;
pub mod worldgen;

use log::info;

/// Initializes the crate's logger for binaries and examples.
///
/// Builds an `env_logger` targeting stdout and configured from the `RUST_LOG`
/// environment variable. Call once, before any generation work is started.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}
