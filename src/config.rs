//! Engine configuration.
//!
//! Every config deserializes from JSON with per-field defaults, so a settings file only needs
//! the keys it wants to change. Values are checked by `validate()` when an engine is built,
//! never per frame.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::background::segmap::SegmapMode;
use crate::foundation::error::{FxError, FxResult};

/// ViBe background model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VibeConfig {
    /// Samples kept per pixel (`N`).
    pub sample_count: u32,
    /// Per-channel absolute difference below which a sample matches (`R`).
    pub color_distance_threshold: u16,
    /// Matches needed to call a pixel background (`#min`).
    pub required_matches: u32,
    /// Inverse probability of a model update on a background pixel (`phi`).
    pub decay_rate: u32,
    pub segmap_mode: SegmapMode,
    /// Reinitialize the model when most of the frame changes at once.
    pub shaky_camera: bool,
    /// Fraction of unchanged pixels below which the camera is considered to have moved.
    pub frame_difference_threshold: f64,
    /// Largest luma difference still counted as "unchanged". `0.0` means exact equality.
    pub luma_tolerance: f64,
    /// Seed for the model's random generator. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for VibeConfig {
    fn default() -> Self {
        Self {
            sample_count: 20,
            color_distance_threshold: 20,
            required_matches: 2,
            decay_rate: 16,
            segmap_mode: SegmapMode::OnlySegmap,
            shaky_camera: false,
            frame_difference_threshold: 0.125,
            luma_tolerance: 0.0,
            seed: None,
        }
    }
}

impl VibeConfig {
    pub fn validate(&self) -> FxResult<()> {
        positive("vibe.sample_count", self.sample_count)?;
        positive("vibe.color_distance_threshold", u32::from(self.color_distance_threshold))?;
        positive("vibe.required_matches", self.required_matches)?;
        positive("vibe.decay_rate", self.decay_rate)?;
        if !self.frame_difference_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.frame_difference_threshold)
        {
            return Err(FxError::validation(
                "vibe.frame_difference_threshold must be within [0, 1]",
            ));
        }
        if !self.luma_tolerance.is_finite() || self.luma_tolerance < 0.0 {
            return Err(FxError::validation(
                "vibe.luma_tolerance must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Photo mosaic parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MosaicConfig {
    /// Directory scanned for tile images.
    pub tile_directory: PathBuf,
    /// Edge length of both the tiles and the frame blocks they replace.
    pub tile_size: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            tile_directory: PathBuf::from("tiles"),
            tile_size: 24,
        }
    }
}

impl MosaicConfig {
    pub fn validate(&self) -> FxResult<()> {
        positive("mosaic.tile_size", self.tile_size)
    }
}

/// Particle morph parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MorphConfig {
    /// Block edge length; must be >= 2.
    pub particle_size: u32,
    /// Frames in a complete transition; must be >= 2.
    pub total_steps: u32,
    /// Presentation hint between frames. The engine itself never sleeps.
    pub frame_delay_ms: u32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            particle_size: 8,
            total_steps: 90,
            frame_delay_ms: 33,
        }
    }
}

impl MorphConfig {
    pub fn validate(&self) -> FxResult<()> {
        if self.particle_size < 2 {
            return Err(FxError::validation("morph.particle_size must be >= 2"));
        }
        if self.total_steps < 2 {
            return Err(FxError::validation("morph.total_steps must be >= 2"));
        }
        positive("morph.frame_delay_ms", self.frame_delay_ms)
    }
}

/// Complete settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub vibe: VibeConfig,
    pub mosaic: MosaicConfig,
    pub morph: MorphConfig,
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Settings {
    pub fn from_json_str(s: &str) -> FxResult<Self> {
        let settings: Self = serde_json::from_str(s)
            .map_err(|e| FxError::validation(format!("settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> FxResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> FxResult<()> {
        self.vibe.validate()?;
        self.mosaic.validate()?;
        self.morph.validate()?;
        if self.threads == Some(0) {
            return Err(FxError::validation("threads must be >= 1 when set"));
        }
        Ok(())
    }
}

fn positive(name: &str, v: u32) -> FxResult<()> {
    if v == 0 {
        return Err(FxError::validation(format!("{name} must be > 0")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
