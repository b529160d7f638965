//! # Chunk Meshing
//!
//! Converts a populated chunk's block grid into quads.
//!
//! ## Algorithm
//!
//! Each column `(x, z)` is scanned from its topmost occupied layer downward.
//! Per layer, the cell's four lateral neighbors are classified with
//! [`Chunk::cell_state`](super::Chunk::cell_state); a face is emitted only
//! where the neighbor cell is absent. Two things cut a column's scan short:
//!
//! - Boundary columns classify as `Edge` and stop immediately, leaving chunk
//!   borders unmeshed on their outward side (the neighboring chunk's overlap
//!   covers the seam; see [`Chunk::set_offset`](super::Chunk::set_offset)).
//! - A sides-remaining counter: since columns are solid from the floor up, a
//!   neighbor that is solid at some layer is solid at every layer below it,
//!   so once all four lateral neighbors have turned solid no deeper layer of
//!   this column can emit anything.
//!
//! A top face is emitted only at the column's topmost occupied layer.
//!
//! ## Emission Order
//!
//! Each face is one quad: 4 position vertices wound per its
//! [`FaceDescriptor`](crate::meshing::FaceDescriptor), two triangles
//! `(v0, v1, v3)` / `(v3, v1, v2)`, then the face's flat normal and flat
//! color appended once per corner. Attribute channels therefore stay in
//! lock-step with the vertex buffer, quad by quad.

use std::time::Instant;

use cgmath::{Point3, Vector3};
use log::debug;

use crate::meshing::{FaceDescriptor, GeometrySink, LATERAL_FACES, TOP_FACE};

use super::{Chunk, ChunkError, ChunkState};

/// The world-space extents of one cell, in block-size-scaled coordinates.
struct CellExtents {
    start: Point3<f32>,
    end: Point3<f32>,
}

impl CellExtents {
    fn new(x: i32, z: i32, layer: i32, block_size: i32) -> Self {
        let start = Point3::new(
            (x * block_size) as f32,
            (layer * block_size) as f32,
            (z * block_size) as f32,
        );
        CellExtents {
            start,
            end: Point3::new(
                start.x + block_size as f32,
                start.y + block_size as f32,
                start.z + block_size as f32,
            ),
        }
    }

    /// Resolves a face descriptor's corner selectors against these extents.
    fn corners(&self, face: &FaceDescriptor) -> [Point3<f32>; 4] {
        face.corners.map(|selector| {
            let pick = |axis: u8, start: f32, end: f32| if axis == 0 { start } else { end };
            Point3::new(
                pick(selector[0], self.start.x, self.end.x),
                pick(selector[1], self.start.y, self.end.y),
                pick(selector[2], self.start.z, self.end.z),
            )
        })
    }
}

impl Chunk {
    /// Converts the populated block grid into mesh geometry.
    ///
    /// Clears any previous geometry, scans every column as described in the
    /// [module docs](self), and finally publishes completion by storing the
    /// readiness flag `true` with release ordering. The flag is false for the
    /// whole duration of the scan.
    ///
    /// Must not be called concurrently with `populate` on the same chunk; the
    /// generation pipeline guarantees this by holding the chunk's write lock
    /// across both.
    ///
    /// # Errors
    /// [`ChunkError::NotPopulated`] if the chunk has no terrain data.
    pub fn generate_mesh(&mut self) -> Result<(), ChunkError> {
        if self.state() < ChunkState::Populated {
            return Err(ChunkError::NotPopulated);
        }

        let timer = Instant::now();
        self.set_ready(false);
        self.mesh_mut().clear();

        let size = self.size();
        let block_size = self.block_size();

        for x in 0..size {
            for z in 0..size {
                let height = self.height_at(x, z);
                let mut side_open = [true; 4];
                let mut sides_remaining = side_open.len();

                for layer in (0..height).rev() {
                    if self.cell_state(x, z, layer) == super::CellState::Edge {
                        break;
                    }

                    let extents = CellExtents::new(x, z, layer, block_size);
                    let top_color = self.palette().top_color(layer, size);
                    let lateral_color = self.palette().lateral_color(layer, size);

                    if layer == height - 1 {
                        self.emit_face(extents.corners(&TOP_FACE), TOP_FACE.normal, top_color);
                    }

                    for (side, face) in LATERAL_FACES.iter().enumerate() {
                        let neighbor =
                            self.cell_state(x + face.neighbor.0, z + face.neighbor.1, layer);
                        if neighbor.exists() {
                            // Solid here means solid all the way down, so this
                            // side is done for the rest of the column.
                            if side_open[side] {
                                side_open[side] = false;
                                sides_remaining -= 1;
                            }
                            continue;
                        }

                        self.emit_face(extents.corners(face), face.normal, lateral_color);
                    }

                    if sides_remaining == 0 {
                        break;
                    }
                }
            }
        }

        debug_assert_eq!(
            self.mesh().attribute_count(self.normal_channel()),
            self.mesh().vertex_count()
        );
        self.set_state(ChunkState::Meshed);
        self.set_ready(true);
        debug!(
            "Meshed chunk {:?}: {} vertices in {:?}",
            self.offset(),
            self.mesh().vertex_count(),
            timer.elapsed()
        );
        Ok(())
    }

    /// Emits one quad: 4 vertices, 2 triangles, and the face's flat normal
    /// and color appended once per corner vertex.
    fn emit_face(&mut self, corners: [Point3<f32>; 4], normal: Vector3<f32>, color: Vector3<f32>) {
        let normal_channel = self.normal_channel();
        let color_channel = self.color_channel();
        let mesh = self.mesh_mut();

        let v0 = mesh.add_vertex(corners[0]);
        let v1 = mesh.add_vertex(corners[1]);
        let v2 = mesh.add_vertex(corners[2]);
        let v3 = mesh.add_vertex(corners[3]);

        mesh.connect_vertices(v0, v1, v3);
        mesh.connect_vertices(v3, v1, v2);

        for _ in 0..4 {
            mesh.add_attribute(normal_channel, normal);
        }
        for _ in 0..4 {
            mesh.add_attribute(color_channel, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::palette::Palette;

    /// Groups the mesh back into quads: (4 corner positions, normal, color).
    fn quads(chunk: &Chunk) -> Vec<([Point3<f32>; 4], Vector3<f32>, Vector3<f32>)> {
        let mesh = chunk.mesh();
        let normals = mesh.attribute_values(chunk.normal_channel());
        let colors = mesh.attribute_values(chunk.color_channel());
        assert_eq!(normals.len(), mesh.vertex_count());
        assert_eq!(colors.len(), mesh.vertex_count());
        assert_eq!(mesh.vertex_count() % 4, 0);

        (0..mesh.vertex_count() / 4)
            .map(|quad| {
                let base = quad * 4;
                let corners = [
                    mesh.vertices()[base].position(),
                    mesh.vertices()[base + 1].position(),
                    mesh.vertices()[base + 2].position(),
                    mesh.vertices()[base + 3].position(),
                ];
                (corners, normals[base].into(), colors[base].into())
            })
            .collect()
    }

    fn flat_chunk(size: i32, block_size: i32, value: f32) -> Chunk {
        let mut chunk = Chunk::new(size, block_size, Palette::terrain());
        chunk.allocate();
        chunk.populate(move |_, _| value).unwrap();
        chunk.generate_mesh().unwrap();
        chunk
    }

    #[test]
    fn mesh_requires_population() {
        let mut chunk = Chunk::new(4, 4, Palette::terrain());
        assert_eq!(chunk.generate_mesh(), Err(ChunkError::NotPopulated));
        chunk.allocate();
        assert_eq!(chunk.generate_mesh(), Err(ChunkError::NotPopulated));
    }

    #[test]
    fn readiness_tracks_the_lifecycle() {
        let mut chunk = Chunk::new(4, 4, Palette::terrain());
        assert!(!chunk.mesh_ready());
        chunk.allocate();
        assert!(!chunk.mesh_ready());
        chunk.populate(|_, _| 0.5).unwrap();
        assert!(!chunk.mesh_ready());
        chunk.generate_mesh().unwrap();
        assert!(chunk.mesh_ready());
        assert_eq!(chunk.state(), ChunkState::Meshed);

        // Repopulating drops readiness until the next mesh completes.
        chunk.populate(|_, _| 0.25).unwrap();
        assert!(!chunk.mesh_ready());
    }

    #[test]
    fn flat_terrain_scenario() {
        // size=4, block_size=4, flat noise 1.0: every height is ceil(1.0*3)=3.
        let chunk = flat_chunk(4, 4, 1.0);
        for x in 0..4 {
            for z in 0..4 {
                assert_eq!(chunk.height_at(x, z), 3);
            }
        }

        let quads = quads(&chunk);
        assert!(!quads.is_empty());

        // Top faces only at layer 2, i.e. on the y = 12 plane, one per
        // interior column (boundary columns stop at the Edge sentinel).
        let top_quads: Vec<_> = quads
            .iter()
            .filter(|(_, normal, _)| *normal == Vector3::new(0.0, 1.0, 0.0))
            .collect();
        assert_eq!(top_quads.len(), 4);
        for (corners, _, _) in &top_quads {
            assert!(corners.iter().all(|corner| corner.y == 12.0));
        }

        // No lateral face may sit between the two interior columns: with
        // size 4 and block_size 4 that shared plane is x = 8 (and z = 8).
        for (corners, normal, _) in &quads {
            if normal.x != 0.0 {
                assert!(corners.iter().any(|corner| corner.x != 8.0));
            }
            if normal.z != 0.0 {
                assert!(corners.iter().any(|corner| corner.z != 8.0));
            }
        }
    }

    #[test]
    fn boundary_columns_emit_nothing() {
        let chunk = flat_chunk(4, 4, 1.0);

        // A quad from a boundary column would have corners at x < 4 or
        // x > 12 (likewise for z). The Edge sentinel prevents all of them.
        for (corners, _, _) in quads(&chunk) {
            for corner in corners {
                assert!((4.0..=12.0).contains(&corner.x));
                assert!((4.0..=12.0).contains(&corner.z));
            }
        }
    }

    #[test]
    fn no_face_between_interior_solid_cells() {
        // Random monotone terrain; verify occlusion correctness per quad.
        let size = 16;
        let block_size = 2;
        let mut chunk = Chunk::new(size, block_size, Palette::terrain());
        chunk.allocate();
        fastrand::seed(7);
        let heights: Vec<f32> = (0..size * size).map(|_| fastrand::f32()).collect();
        chunk
            .populate(|x, z| heights[(z * size + x) as usize])
            .unwrap();
        chunk.generate_mesh().unwrap();

        for (corners, normal, _) in quads(&chunk) {
            if normal.y != 0.0 {
                continue;
            }

            // Recover the emitting cell and its neighbor from the quad.
            let min = |f: fn(&Point3<f32>) -> f32| {
                corners.iter().map(f).fold(f32::INFINITY, f32::min)
            };
            let layer = min(|c| c.y) as i32 / block_size;
            let x0 = min(|c| c.x) as i32 / block_size;
            let z0 = min(|c| c.z) as i32 / block_size;
            // The face plane's min corner belongs to the neighbor cell when
            // the normal points negative, to the cell itself otherwise.
            let (cell, neighbor) = if normal.x > 0.0 {
                ((x0 - 1, z0), (x0, z0))
            } else if normal.x < 0.0 {
                ((x0, z0), (x0 - 1, z0))
            } else if normal.z > 0.0 {
                ((x0, z0 - 1), (x0, z0))
            } else {
                ((x0, z0), (x0, z0 - 1))
            };

            assert!(
                chunk.block_at(cell.0, cell.1, layer).is_solid(),
                "lateral quad not backed by a solid cell"
            );
            assert!(
                !chunk.block_at(neighbor.0, neighbor.1, layer).is_solid()
                    || neighbor.0 == 0
                    || neighbor.0 == size - 1
                    || neighbor.1 == 0
                    || neighbor.1 == size - 1,
                "lateral quad emitted between two interior solid cells"
            );
        }
    }

    #[test]
    fn lateral_faces_use_the_fixed_color() {
        let chunk = flat_chunk(8, 4, 0.8);
        let lateral = Palette::terrain().lateral_color(0, 8);

        let mut saw_lateral = false;
        for (_, normal, color) in quads(&chunk) {
            if normal.y == 0.0 {
                saw_lateral = true;
                assert_eq!(color, lateral);
            }
        }
        assert!(saw_lateral);
    }

    #[test]
    fn empty_terrain_emits_nothing() {
        let chunk = flat_chunk(8, 4, 0.0);
        assert_eq!(chunk.mesh().vertex_count(), 0);
        assert!(chunk.mesh_ready());
    }
}
