//! # Voxels Module
//!
//! Block typing, chunk storage, and the block-to-mesh conversion.

pub mod block;
pub mod chunk;
pub mod palette;

pub use block::{BlockType, BlockTypeSize, CellState};
pub use chunk::{Chunk, ChunkError, ChunkState, ReadyFlag};
pub use palette::{LateralColor, Palette};
