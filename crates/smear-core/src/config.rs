use serde::{Deserialize, Serialize};

use crate::error::{SmearError, SmearResult};
use crate::types::{AlphaScalingMode, Extent, SurfaceOptions};

/// Number of history layers composited when nothing else is configured.
pub const DEFAULT_VISIBLE_LAYERS: usize = 4;

/// Log base used by [`AlphaScalingMode::Log`] when nothing else is configured.
pub const DEFAULT_LOG_BASE: f64 = 1.4;

fn default_visible_layers() -> usize {
    DEFAULT_VISIBLE_LAYERS
}

fn default_log_base() -> f64 {
    DEFAULT_LOG_BASE
}

/// Settings for a trail compositor, loadable from a `trail.toml` file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrailConfig {
    /// Number of history surfaces in the ring. Fixed for a compositor's lifetime.
    pub capacity: usize,
    /// How many of the most recent layers are composited. Clamped to `capacity`.
    #[serde(default = "default_visible_layers")]
    pub visible_layers: usize,
    #[serde(default)]
    pub alpha_scaling: AlphaScalingMode,
    #[serde(default = "default_log_base")]
    pub log_base: f64,
    // Tables come after plain values so the TOML output stays valid.
    #[serde(default)]
    pub dimensions: Extent,
    #[serde(default)]
    pub surface: SurfaceOptions,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_VISIBLE_LAYERS)
    }
}

impl TrailConfig {
    /// Default settings for a ring of `capacity` layers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            visible_layers: DEFAULT_VISIBLE_LAYERS.min(capacity),
            alpha_scaling: AlphaScalingMode::default(),
            log_base: DEFAULT_LOG_BASE,
            dimensions: Extent::default(),
            surface: SurfaceOptions::default(),
        }
    }

    /// Check the values that can be rejected before any surface is created.
    pub fn validate(&self) -> SmearResult<()> {
        if self.capacity == 0 {
            return Err(SmearError::configuration("capacity must be at least 1"));
        }
        if self.dimensions.is_empty() {
            return Err(SmearError::configuration(format!(
                "dimensions must be non-zero, got {}",
                self.dimensions
            )));
        }
        if self.alpha_scaling == AlphaScalingMode::Log
            && !(self.log_base.is_finite() && self.log_base > 1.0)
        {
            return Err(SmearError::configuration(format!(
                "log_base must be a finite number greater than 1, got {}",
                self.log_base
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> SmearResult<Self> {
        let config: TrailConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &std::path::Path) -> SmearResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> SmearResult<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
