//! # Terrain Generator Smoke Tool
//!
//! Generates one world with the default settings and prints what came out.
//! Useful for eyeballing generation timing with `RUST_LOG=debug`.

use std::thread;
use std::time::Duration;

use voxel_terrain::meshing::GeometrySink;
use voxel_terrain::task_management::WorkerPool;
use voxel_terrain::worldgen::{GenerationSettings, WorldGenerator};

fn main() {
    voxel_terrain::init_logging();

    let settings = GenerationSettings::default();
    let mut generator = WorldGenerator::new(WorkerPool::with_default_parallelism());
    generator
        .generate_world(&settings)
        .expect("default settings must generate");

    while generator.is_generating() {
        thread::sleep(Duration::from_millis(5));
    }

    let mut total_vertices = 0;
    let mut total_indices = 0;
    for chunk in generator.chunks() {
        let chunk = chunk.get();
        total_vertices += chunk.mesh().vertex_count();
        total_indices += chunk.mesh().index_count();
    }

    println!(
        "Generated {} chunks ({}x{} grid): {} vertices, {} triangles",
        generator.len(),
        settings.grid_dimension(),
        settings.grid_dimension(),
        total_vertices,
        total_indices / 3,
    );
}
