//! # Palette Module
//!
//! Per-face color selection for the mesher. Top faces look their color up by
//! layer across the palette gradient; lateral faces follow a pluggable
//! strategy, since the two historical variants of this mesher disagreed on
//! whether side faces share the top color or use one fixed color.

use cgmath::Vector3;

/// How lateral (side) faces are colored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LateralColor {
    /// Every lateral face uses this one fixed color.
    Fixed(Vector3<f32>),
    /// Lateral faces reuse the top color of their layer.
    MatchTop,
}

/// A height-indexed color gradient plus the lateral coloring strategy.
///
/// Colors are flat per face: one color is chosen per emitted quad and
/// appended once per corner vertex. The top color for a layer interpolates
/// linearly between the two palette entries bracketing the layer's relative
/// height.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Vector3<f32>>,
    lateral: LateralColor,
}

/// The fixed lateral color of the default palette (exposed soil).
const DEFAULT_LATERAL_COLOR: Vector3<f32> = Vector3 {
    x: 0.68,
    y: 0.52,
    z: 0.2,
};

impl Palette {
    /// Creates a palette from a non-empty gradient and a lateral strategy.
    ///
    /// # Panics
    /// Panics if `colors` is empty.
    pub fn new(colors: Vec<Vector3<f32>>, lateral: LateralColor) -> Self {
        assert!(!colors.is_empty(), "palette requires at least one color");
        Palette { colors, lateral }
    }

    /// The eight-color terrain gradient: water, sand, soil, then greens.
    pub fn terrain() -> Self {
        Palette::new(
            vec![
                Vector3::new(0.0, 0.0, 0.6),
                Vector3::new(0.9, 0.9, 0.52),
                Vector3::new(0.68, 0.52, 0.2),
                Vector3::new(0.0, 0.54, 0.0),
                Vector3::new(0.0, 0.75, 0.0),
                Vector3::new(0.0, 0.85, 0.25),
                Vector3::new(0.0, 0.78, 0.5),
                Vector3::new(0.0, 0.78, 0.65),
            ],
            LateralColor::Fixed(DEFAULT_LATERAL_COLOR),
        )
    }

    /// The top-face color for a layer of a chunk with `size` layers.
    ///
    /// Layer 0 maps to the first palette entry and layer `size - 1` to the
    /// last, interpolating linearly in between. The returned color is flat
    /// for the whole face.
    pub fn top_color(&self, layer: i32, size: i32) -> Vector3<f32> {
        let last = self.colors.len() - 1;
        if last == 0 || size <= 1 {
            return self.colors[0];
        }

        let relative = layer.clamp(0, size - 1) as f32 / (size - 1) as f32;
        let scaled = relative * last as f32;
        let index = (scaled.floor() as usize).min(last - 1);
        let fraction = scaled - index as f32;

        let from = self.colors[index];
        let to = self.colors[index + 1];
        from + (to - from) * fraction
    }

    /// The lateral-face color for a layer, per the configured strategy.
    pub fn lateral_color(&self, layer: i32, size: i32) -> Vector3<f32> {
        match self.lateral {
            LateralColor::Fixed(color) => color,
            LateralColor::MatchTop => self.top_color(layer, size),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::terrain()
    }
}
