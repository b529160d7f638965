//! # Generation Settings
//!
//! The numeric configuration surface exposed to the surrounding application.
//! The allowed ranges match the reference control panel that drives world
//! regeneration; values are validated before any generation starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration value outside its allowed range.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    /// A numeric setting fell outside its control-panel range.
    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// The name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
    },
}

/// All parameters of one world-generation request.
///
/// Deserializable so a frontend can ship the whole panel state as JSON.
/// Unspecified fields fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Base noise frequency, `[0, 2]`.
    pub noise_scale: f64,
    /// Multiplier composed onto the base scale, `[0.1, 2]`.
    pub noise_multiplier: f64,
    /// Noise domain translation along X, `[0, 10]`.
    pub noise_x_offset: f64,
    /// Noise domain translation along Y, `[0, 10]`.
    pub noise_y_offset: f64,
    /// World-unit scale of one block, `[2, 16]`.
    pub block_size: i32,
    /// Blocks per chunk edge, `[8, 64]`.
    pub chunk_size: i32,
    /// Total chunks to generate, `[8, 128]`; the grid is
    /// `round(sqrt(count))` square.
    pub chunk_count: i32,
    /// Noise seed; equal seeds reproduce identical terrain.
    pub seed: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            noise_scale: 0.025,
            noise_multiplier: 1.0,
            noise_x_offset: 0.0,
            noise_y_offset: 0.0,
            block_size: 4,
            chunk_size: 32,
            chunk_count: 25,
            seed: 0,
        }
    }
}

impl GenerationSettings {
    /// Parses settings from a JSON document.
    ///
    /// Parsing does not validate ranges; call [`GenerationSettings::validate`]
    /// before handing the result to a generator (the generator re-validates
    /// anyway).
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks every field against its control-panel range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("noise_scale", self.noise_scale, 0.0, 2.0)?;
        check("noise_multiplier", self.noise_multiplier, 0.1, 2.0)?;
        check("noise_x_offset", self.noise_x_offset, 0.0, 10.0)?;
        check("noise_y_offset", self.noise_y_offset, 0.0, 10.0)?;
        check("block_size", self.block_size as f64, 2.0, 16.0)?;
        check("chunk_size", self.chunk_size as f64, 8.0, 64.0)?;
        check("chunk_count", self.chunk_count as f64, 8.0, 128.0)?;
        Ok(())
    }

    /// The edge length of the square chunk grid: `round(sqrt(chunk_count))`.
    pub fn grid_dimension(&self) -> i32 {
        (self.chunk_count as f64).sqrt().round() as i32
    }
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), SettingsError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
