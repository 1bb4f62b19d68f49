use crate::effects::preset::{Preset, RenderParams};
use crate::foundation::core::{Canvas, LoopConfig};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::scene::RenderOpts;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON settings document.
///
/// Every field is optional; missing fields take the defaults (540x960, 4 s at 16 fps,
/// passthrough, intensity 0.6, parallel warp).
///
/// ```json
/// { "canvas": { "width": 540, "height": 960 },
///   "loop": { "duration_secs": 4.0, "frame_rate": 16 },
///   "preset": "drift", "intensity": 0.6, "parallel": true }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    /// Output canvas, exactly 9:16.
    pub canvas: Canvas,
    /// Loop length and frame rate.
    #[serde(rename = "loop")]
    pub loop_cfg: LoopConfig,
    /// Preset name; unknown names select passthrough.
    pub preset: Preset,
    /// Motion amplitude; not clamped.
    pub intensity: f32,
    /// Row-parallel warp.
    pub parallel: bool,
    /// Rayon worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        let params = RenderParams::default();
        Self {
            canvas: Canvas::CANONICAL,
            loop_cfg: LoopConfig::default(),
            preset: params.preset,
            intensity: params.intensity,
            parallel: RenderOpts::default().parallel,
            threads: None,
        }
    }
}

impl LoopSettings {
    /// Parse settings from a JSON reader and validate them.
    pub fn from_reader<R: std::io::Read>(r: R) -> LoopResult<Self> {
        let settings: Self = serde_json::from_reader(r)
            .map_err(|e| LoopError::validation(format!("parse settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON file and validate them.
    pub fn from_path(path: impl AsRef<Path>) -> LoopResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LoopError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check canvas, loop timing and thread count.
    pub fn validate(&self) -> LoopResult<()> {
        self.canvas.validate()?;
        self.loop_cfg.validate()?;
        if self.threads == Some(0) {
            return Err(LoopError::validation("'threads' must be >= 1 when set"));
        }
        Ok(())
    }

    /// Preset and intensity as render params.
    pub fn render_params(&self) -> RenderParams {
        RenderParams::new(self.preset, self.intensity)
    }

    /// Renderer options.
    pub fn render_opts(&self) -> RenderOpts {
        RenderOpts {
            parallel: self.parallel,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
