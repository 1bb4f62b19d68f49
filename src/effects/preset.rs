use crate::eval::phase::Phase;
use crate::foundation::core::Canvas;
use crate::foundation::math::{harmonic, harmonic_cos};
use serde::{Deserialize, Serialize};

/// Selectable per-frame effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Preset {
    /// The working image unchanged.
    #[default]
    None,
    /// Zoom/orbit drift with tinted echoes and streak bands.
    Orbital,
    /// Horizontal glitch strips.
    SliceSplit,
    /// Vertically displaced columns with an additive glow.
    ColumnWave,
    /// Dense per-pixel ripple, ring and twist displacement.
    Warp,
    /// Row displacement, RGB split and CRT raster.
    Scanline,
}

impl Preset {
    /// All presets, in menu order.
    pub const ALL: [Preset; 6] = [
        Preset::None,
        Preset::Orbital,
        Preset::SliceSplit,
        Preset::ColumnWave,
        Preset::Warp,
        Preset::Scanline,
    ];

    /// Stable name used in settings files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Orbital => "drift",
            Preset::SliceSplit => "slices",
            Preset::ColumnWave => "melt",
            Preset::Warp => "warp",
            Preset::Scanline => "scanline",
        }
    }

    /// Parse a preset name or alias (case-insensitive). Unknown names return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Some(match key.as_str() {
            "none" | "passthrough" | "" => Preset::None,
            "drift" | "orbital" | "orbit" => Preset::Orbital,
            "slices" | "slice_split" | "glitch_slices" => Preset::SliceSplit,
            "melt" | "column_wave" | "wave_melt" => Preset::ColumnWave,
            "warp" | "twist" | "radial_twist" => Preset::Warp,
            "scanline" | "scanline_glitch" | "crt" => Preset::Scanline,
            _ => return None,
        })
    }

    /// Parse a name, falling back to passthrough for anything unknown.
    pub fn from_name_or_passthrough(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::debug!(name = s, "unknown preset, using passthrough");
            Preset::None
        })
    }
}

impl From<String> for Preset {
    fn from(s: String) -> Self {
        Preset::from_name_or_passthrough(&s)
    }
}

impl From<Preset> for String {
    fn from(p: Preset) -> Self {
        p.name().to_owned()
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-frame render inputs supplied by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Active preset.
    pub preset: Preset,
    /// Displacement magnitude. Suggested range `[0, 1]`, not clamped; negative values mirror
    /// the motion.
    pub intensity: f32,
}

impl RenderParams {
    /// Params for `preset` at `intensity`.
    pub fn new(preset: Preset, intensity: f32) -> Self {
        Self { preset, intensity }
    }

    /// Intensity the presets actually use: non-finite input degrades to zero.
    pub fn effective_intensity(&self) -> f32 {
        if self.intensity.is_finite() {
            self.intensity
        } else {
            0.0
        }
    }
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            preset: Preset::None,
            intensity: 0.6,
        }
    }
}

/// Time and magnitude inputs shared by every preset for one frame.
///
/// All motion goes through [`Motion::sin`]/[`Motion::cos`] with integer harmonics, so every
/// preset returns to its starting state at the end of the loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Motion {
    /// Phase in radians.
    pub t: f32,
    pub intensity: f32,
    /// Canvas size relative to 540 px wide.
    pub scale: f32,
}

impl Motion {
    pub fn new(phase: Phase, params: &RenderParams, canvas: Canvas) -> Self {
        Self {
            t: phase.radians(),
            intensity: params.effective_intensity(),
            scale: canvas.scale(),
        }
    }

    pub fn sin(&self, k: u32, offset: f32) -> f32 {
        harmonic(self.t, k, offset)
    }

    pub fn cos(&self, k: u32, offset: f32) -> f32 {
        harmonic_cos(self.t, k, offset)
    }

    /// A pixel amplitude tuned on the canonical canvas, scaled to this canvas and intensity.
    pub fn px(&self, amplitude: f32) -> f32 {
        amplitude * self.scale * self.intensity
    }
}

/// Pixel bounds `[start, end)` of band `i` when `len` pixels are split into `n` equal bands.
pub(crate) fn band_bounds(i: u32, n: u32, len: u32) -> (u32, u32) {
    if n == 0 {
        return (0, 0);
    }
    let start = u64::from(i) * u64::from(len) / u64::from(n);
    let end = (u64::from(i) + 1) * u64::from(len) / u64::from(n);
    (start as u32, end.min(u64::from(len)) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/preset.rs"]
mod tests;
