use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width and height of a surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Extent {
    /// The minimal valid surface size, 1x1.
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Extent {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `640x480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h))?;
        Ok(Self::new(width, height))
    }
}

/// Backend context parameters applied uniformly to every history surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    /// Multisample anti-aliasing level (0 = off).
    pub antialiasing_level: u32,
    /// Whether the surface stores sRGB-encoded color.
    pub srgb: bool,
}

/// How a layer's recency maps to its composite opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaScalingMode {
    /// Every visible layer is drawn fully opaque.
    None,
    /// Opacity grows linearly from the oldest to the newest layer.
    Linear,
    /// Opacity follows `(b^(i+1) - 1) / (b^n - 1)` for log base `b`.
    Log,
}

impl Default for AlphaScalingMode {
    fn default() -> Self {
        AlphaScalingMode::Log
    }
}

impl AlphaScalingMode {
    /// Weight in [0, 1] for draw position `position` out of `visible` layers,
    /// where position 0 is the oldest drawn layer and `visible - 1` the newest.
    ///
    /// `log_base` is only consulted in [`AlphaScalingMode::Log`] mode and must be
    /// greater than 1; other bases produce meaningless weights.
    pub fn weight(&self, position: usize, visible: usize, log_base: f64) -> f64 {
        if visible == 0 {
            return 0.0;
        }
        match self {
            AlphaScalingMode::None => 1.0,
            AlphaScalingMode::Linear => (position + 1) as f64 / visible as f64,
            AlphaScalingMode::Log if position + 1 >= visible => 1.0,
            AlphaScalingMode::Log => {
                // Same curve divided through by b^n, so large n cannot overflow.
                let floor = log_base.powf(-(visible as f64));
                let steps_behind = (visible - position - 1) as f64;
                (log_base.powf(-steps_behind) - floor) / (1.0 - floor)
            }
        }
    }
}

/// Convert a weight in [0, 1] to an 8-bit alpha value.
pub fn weight_to_alpha(weight: f64) -> u8 {
    (weight.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for AlphaScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphaScalingMode::None => write!(f, "none"),
            AlphaScalingMode::Linear => write!(f, "linear"),
            AlphaScalingMode::Log => write!(f, "log"),
        }
    }
}

impl FromStr for AlphaScalingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AlphaScalingMode::None),
            "linear" => Ok(AlphaScalingMode::Linear),
            "log" => Ok(AlphaScalingMode::Log),
            other => Err(format!(
                "unknown alpha scaling mode '{}' (expected none, linear or log)",
                other
            )),
        }
    }
}
