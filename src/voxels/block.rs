//! # Block Module
//!
//! This module defines the per-cell block type tag and the classification
//! returned by chunk neighbor queries. Blocks carry a type tag only; colors
//! and normals are computed at mesh time from position and neighbor context.

use num_derive::FromPrimitive;

/// The storage-level integer representation of a block type.
pub type BlockTypeSize = u8;

/// The type tag of one block in a chunk's grid.
///
/// The `FromPrimitive` derive allows conversion from the compact integer
/// representation used for bulk storage and serialization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An empty cell; never meshed.
    #[default]
    Empty,

    /// A solid terrain block below the surface of its column.
    Solid,

    /// The topmost solid block of a column (the "dirt cap").
    ///
    /// Meshing treats it exactly like [`BlockType::Solid`]; the distinct tag
    /// exists so a renderer can texture the cap differently later.
    SolidTop,
}

impl BlockType {
    /// Converts a stored integer back to a `BlockType`.
    ///
    /// Returns `None` if the value does not correspond to a valid type.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Whether this block occupies its cell.
    pub fn is_solid(self) -> bool {
        self != BlockType::Empty
    }
}

/// The classification of a cell returned by a chunk neighbor query.
///
/// Queries never index out of bounds: coordinates outside the grid classify
/// as [`CellState::Nonexistent`], and columns on the literal X/Z chunk
/// boundary classify as [`CellState::Edge`] before anything else is checked.
/// `Edge` both stops the mesher's downward scan for boundary columns and
/// counts as "absent" for a neighbor visibility test, which is what leaves
/// chunk borders intentionally unmeshed on their outward side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellState {
    /// No block: empty cell or out-of-bounds coordinates.
    Nonexistent,
    /// The topmost solid block of its column.
    Top,
    /// A column on the chunk's X/Z boundary.
    Edge,
    /// A solid block below the top of its column.
    Body,
}

impl CellState {
    /// Whether the classified cell contains a solid block.
    pub fn exists(self) -> bool {
        matches!(self, CellState::Top | CellState::Body)
    }
}
