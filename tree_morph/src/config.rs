//! Load-time configuration.
//!
//! Every field has a built-in default, so an empty TOML file (or no file at
//! all) gives the stock scene.  Nothing here is written back at runtime.
//!
//! ```toml
//! particle_count = 6000
//! auto_rotate    = false
//! images         = ["photos/ski.jpg", "photos/cabin.jpg"]
//!
//! [[palette]]
//! name  = "gold"
//! color = "#FFD700"
//!
//! [orbit]
//! visible_radius = 11.0
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error("invalid colour {0:?} (expected #RRGGBB)")]
    Color(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ════════════════════════════════════════════════════════════════════════════
// Rgb: palette colour
// ════════════════════════════════════════════════════════════════════════════

/// Linear 0.0–1.0 RGB, written as `#RRGGBB` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Rgb { r: r as f32 / 255.0, g: g as f32 / 255.0, b: b as f32 / 255.0 }
    }

    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::Color(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb::from_u8(byte(0)?, byte(2)?, byte(4)?))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Packed `0xFFRRGGBB`.
    pub fn to_argb(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        0xFF00_0000 | (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argb = self.to_argb();
        write!(f, "#{:06X}", argb & 0x00FF_FFFF)
    }
}

/// A palette entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name:  String,
    pub color: Rgb,
}

impl NamedColor {
    fn new(name: &str, color: Rgb) -> Self {
        NamedColor { name: name.to_string(), color }
    }
}

fn default_palette() -> Vec<NamedColor> {
    vec![
        NamedColor::new("pine",   Rgb::from_u8(0x1B, 0x5E, 0x20)),
        NamedColor::new("green",  Rgb::from_u8(0x2E, 0x9E, 0x4F)),
        NamedColor::new("red",    Rgb::from_u8(0xD6, 0x28, 0x28)),
        NamedColor::new("gold",   Rgb::from_u8(0xFF, 0xD7, 0x00)),
        NamedColor::new("silver", Rgb::from_u8(0xC0, 0xC0, 0xC8)),
        NamedColor::new("white",  Rgb::from_u8(0xF8, 0xF9, 0xFA)),
    ]
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitConfig
// ════════════════════════════════════════════════════════════════════════════

/// Geometry and easing of the image ring shown while exploded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Ring radius while the tree is converged (images hidden inside it).
    pub hidden_radius:  f32,
    /// Ring radius when fully exploded.
    pub visible_radius: f32,
    /// Fixed world-space height of the ring.
    pub height:         f32,
    /// Base sprite scale before the explode/selection factors.
    pub image_scale:    f32,
    /// First-order low-pass factor for opacity and scale, per tick.
    pub smoothing:      f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            hidden_radius:  0.5,
            visible_radius: 9.0,
            height:         0.0,
            image_scale:    2.0,
            smoothing:      0.1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TreeConfig
// ════════════════════════════════════════════════════════════════════════════

/// Static scene configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub particle_count:    usize,
    pub tree_height:       f32,
    /// Radius of the cone's base.
    pub tree_radius:       f32,
    /// Morph progress step per tick.
    pub transition_speed:  f32,
    /// Exponential smoothing factor of the tree rotation, per tick.
    pub rotation_speed:    f32,
    pub auto_rotate:       bool,
    /// Radians added to the rotation target per tick while auto-rotating.
    pub auto_rotate_speed: f32,
    pub ornament_count:    usize,
    pub light_count:       usize,
    /// Radius of the sphere exploded endpoints are sampled in.
    pub explode_radius:    f32,
    pub palette:           Vec<NamedColor>,
    /// Image sources placed on the orbit, one slot each.
    pub images:            Vec<String>,
    pub orbit:             OrbitConfig,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            particle_count:    4000,
            tree_height:       10.0,
            tree_radius:       4.0,
            transition_speed:  0.02,
            rotation_speed:    0.05,
            auto_rotate:       true,
            auto_rotate_speed: 0.003,
            ornament_count:    60,
            light_count:       120,
            explode_radius:    14.0,
            palette:           default_palette(),
            images:            (1..=8).map(|i| format!("images/memory-{}.jpg", i)).collect(),
            orbit:             OrbitConfig::default(),
        }
    }
}

impl TreeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TreeConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            particles = cfg.particle_count,
            images = cfg.images.len(),
            "loaded tree config"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::Invalid { field, reason: reason.to_string() }
        }
        let positive = [
            ("tree_height",          self.tree_height),
            ("tree_radius",          self.tree_radius),
            ("explode_radius",       self.explode_radius),
            ("orbit.visible_radius", self.orbit.visible_radius),
            ("orbit.image_scale",    self.orbit.image_scale),
        ];
        for (field, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid(field, "must be a positive number"));
            }
        }
        let rates = [
            ("transition_speed", self.transition_speed),
            ("rotation_speed",   self.rotation_speed),
            ("orbit.smoothing",  self.orbit.smoothing),
        ];
        for (field, v) in rates {
            if !(v > 0.0 && v <= 1.0) {
                return Err(invalid(field, "must be in (0, 1]"));
            }
        }
        if !(self.orbit.hidden_radius >= 0.0 && self.orbit.hidden_radius < self.orbit.visible_radius) {
            return Err(invalid("orbit.hidden_radius", "must be in [0, visible_radius)"));
        }
        if !self.auto_rotate_speed.is_finite() {
            return Err(invalid("auto_rotate_speed", "must be finite"));
        }
        if self.palette.is_empty() {
            return Err(invalid("palette", "needs at least one colour"));
        }
        Ok(())
    }

    /// Look up a palette colour by name.
    pub fn color(&self, name: &str) -> Option<Rgb> {
        self.palette.iter().find(|c| c.name == name).map(|c| c.color)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
