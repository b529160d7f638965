//! End-to-end pipeline tests: settings in, ready renderable geometry out.

use std::thread;
use std::time::{Duration, Instant};

use voxel_terrain::meshing::GeometrySink;
use voxel_terrain::task_management::WorkerPool;
use voxel_terrain::voxels::ChunkState;
use voxel_terrain::worldgen::{GenerationSettings, WorldGenerator};

fn settings() -> GenerationSettings {
    GenerationSettings {
        chunk_size: 16,
        block_size: 2,
        chunk_count: 9,
        noise_scale: 0.05,
        seed: 1234,
        ..Default::default()
    }
}

fn generate(settings: &GenerationSettings) -> WorldGenerator {
    let mut generator = WorldGenerator::new(WorkerPool::with_default_parallelism());
    generator.generate_world(settings).unwrap();

    let deadline = Instant::now() + Duration::from_secs(30);
    while generator.is_generating() {
        assert!(Instant::now() < deadline, "generation timed out");
        thread::sleep(Duration::from_millis(2));
    }
    generator
}

#[test]
fn full_pipeline_produces_consistent_chunks() {
    let settings = settings();
    let generator = generate(&settings);

    assert_eq!(generator.len(), 9);
    assert_eq!(generator.ready_count(), 9);

    for (i, chunk) in generator.chunks().iter().enumerate() {
        let chunk = chunk.get();
        assert!(chunk.mesh_ready());
        assert_eq!(chunk.state(), ChunkState::Meshed);
        assert_eq!(chunk.position(), generator.placements()[i]);

        // Attribute channels stay in lock-step with positions, and every
        // quad contributed exactly two triangles.
        let mesh = chunk.mesh();
        assert_eq!(mesh.vertex_count() % 4, 0);
        assert_eq!(mesh.index_count(), mesh.vertex_count() / 4 * 6);
        assert_eq!(mesh.attribute_count(chunk.normal_channel()), mesh.vertex_count());
        assert_eq!(mesh.attribute_count(chunk.color_channel()), mesh.vertex_count());

        // All indices reference emitted vertices.
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices().iter().all(|&index| index < max));
    }
}

#[test]
fn generation_is_reproducible() {
    let settings = settings();
    let first = generate(&settings);
    let second = generate(&settings);

    for (a, b) in first.chunks().iter().zip(second.chunks()) {
        let (a, b) = (a.get(), b.get());
        assert_eq!(a.mesh().vertex_count(), b.mesh().vertex_count());
        for x in 0..settings.chunk_size {
            for z in 0..settings.chunk_size {
                assert_eq!(a.height_at(x, z), b.height_at(x, z));
            }
        }
    }
}

#[test]
fn consumer_flush_is_one_shot_per_chunk() {
    let generator = generate(&settings());

    // A render-thread consumer polls readiness and flushes once per chunk.
    for chunk in generator.chunks() {
        if !chunk.get().mesh_ready() {
            continue;
        }
        let mut chunk = chunk.get_mut();
        assert!(chunk.flush_mesh());
        assert!(!chunk.flush_mesh(), "second flush must be a no-op");
    }
}

#[test]
fn row_major_grid_layout() {
    let settings = settings();
    let generator = generate(&settings);
    let dim = settings.grid_dimension();

    for (i, chunk) in generator.chunks().iter().enumerate() {
        let expected = (i as i32 % dim, (i as i32 / dim) % dim);
        assert_eq!(chunk.get().offset(), expected);
    }
}
