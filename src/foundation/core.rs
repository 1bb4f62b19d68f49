use crate::foundation::error::{LoopError, LoopResult};
use std::time::Duration;

/// Width of the canonical canvas; pixel constants in the presets are tuned against it.
const REFERENCE_WIDTH: f32 = 540.0;

/// Absolute 0-based frame index within one loop.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output canvas dimensions in pixels.
///
/// The canvas is always portrait 9:16; [`Canvas::validate`] rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Half of 1080x1920.
    pub const CANONICAL: Canvas = Canvas {
        width: 540,
        height: 960,
    };

    /// Create a validated canvas.
    pub fn new(width: u32, height: u32) -> LoopResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Check for non-zero dimensions and an exact 9:16 ratio.
    pub fn validate(self) -> LoopResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LoopError::validation("canvas width/height must be non-zero"));
        }
        if u64::from(self.width) * 16 != u64::from(self.height) * 9 {
            return Err(LoopError::validation(format!(
                "canvas {}x{} is not 9:16",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Size of this canvas relative to the canonical one.
    pub fn scale(self) -> f32 {
        (self.width.min(self.height) as f32 / REFERENCE_WIDTH).max(0.0)
    }

    /// Number of bytes of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Loop length and export cadence. Constant for a session.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoopConfig {
    /// Length of one loop in seconds.
    pub duration_secs: f64,
    /// Export frame rate.
    pub frame_rate: u32,
}

impl LoopConfig {
    /// Create a validated loop configuration.
    pub fn new(duration_secs: f64, frame_rate: u32) -> LoopResult<Self> {
        let cfg = Self {
            duration_secs,
            frame_rate,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check for a finite positive duration and a non-zero frame rate.
    pub fn validate(self) -> LoopResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(LoopError::validation(
                "loop duration_secs must be finite and > 0",
            ));
        }
        if self.frame_rate == 0 {
            return Err(LoopError::validation("loop frame_rate must be > 0"));
        }
        Ok(())
    }

    /// Frames in one exported loop: `round(duration_secs * frame_rate)`, at least one.
    pub fn total_frames(self) -> u64 {
        let n = (self.duration_secs * f64::from(self.frame_rate)).round();
        if n.is_finite() && n >= 1.0 { n as u64 } else { 1 }
    }

    /// Inter-frame delay in milliseconds (`1000 / frame_rate`).
    pub fn frame_delay_ms(self) -> f64 {
        1000.0 / f64::from(self.frame_rate.max(1))
    }

    /// Inter-frame delay as a [`Duration`].
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    /// Loop length as a [`Duration`].
    pub fn duration(self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs).unwrap_or(Duration::ZERO)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            duration_secs: 4.0,
            frame_rate: 16,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
