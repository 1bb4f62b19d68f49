use crate::assets::decode::{decode_working_image, load_working_image};
use crate::assets::working::WorkingImage;
use crate::effects::preset::RenderParams;
use crate::eval::phase::{Phase, PreviewClock};
use crate::foundation::core::{Canvas, LoopConfig};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::frame::FrameRGBA;
use crate::render::scene::{RenderOpts, SceneRenderer, placeholder_frame};
use crate::session::export::{ExportGuard, ExportJob, ExportKind, ExportReport};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const STATUS_EMPTY: &str = "Upload an image to begin.";

/// The state of one interactive session.
///
/// Holds the working image, the current render params, the preview clock and the exporting flag.
/// Preview rendering and export jobs both go through this object; nothing is global.
#[derive(Debug)]
pub struct RenderSession {
    canvas: Canvas,
    loop_cfg: LoopConfig,
    opts: RenderOpts,
    params: RenderParams,
    image: Option<WorkingImage>,
    clock: PreviewClock,
    renderer: SceneRenderer,
    placeholder: FrameRGBA,
    status: String,
    exporting: Arc<AtomicBool>,
    exports_started: u64,
}

impl RenderSession {
    /// Start an empty, playing session at `now`.
    pub fn new(
        canvas: Canvas,
        loop_cfg: LoopConfig,
        opts: RenderOpts,
        now: Instant,
    ) -> LoopResult<Self> {
        canvas.validate()?;
        loop_cfg.validate()?;
        Ok(Self {
            canvas,
            loop_cfg,
            opts,
            params: RenderParams::default(),
            image: None,
            clock: PreviewClock::new(loop_cfg, now),
            renderer: SceneRenderer::new(opts),
            placeholder: placeholder_frame(canvas),
            status: STATUS_EMPTY.to_owned(),
            exporting: Arc::new(AtomicBool::new(false)),
            exports_started: 0,
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Loop length and frame rate.
    pub fn loop_config(&self) -> LoopConfig {
        self.loop_cfg
    }

    /// Current params.
    pub fn params(&self) -> RenderParams {
        self.params
    }

    /// The working image, if one is loaded.
    pub fn image(&self) -> Option<&WorkingImage> {
        self.image.as_ref()
    }

    /// Last user-facing status message.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether an export job is alive.
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Exports accepted so far. Rejected requests do not count.
    pub fn exports_started(&self) -> u64 {
        self.exports_started
    }

    /// Whether the preview is advancing.
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Preview phase at `now`.
    pub fn phase_at(&self, now: Instant) -> Phase {
        self.clock.phase_at(now)
    }

    /// Decode `bytes` and install the result. On failure the previous image stays in place.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn load_image_bytes(&mut self, bytes: &[u8], now: Instant) -> LoopResult<()> {
        let decoded = decode_working_image(bytes, self.canvas);
        self.finish_load(decoded, now)
    }

    /// Read and install an image file. On failure the previous image stays in place.
    #[tracing::instrument(skip(self))]
    pub fn load_image_path(&mut self, path: &Path, now: Instant) -> LoopResult<()> {
        let loaded = load_working_image(path, self.canvas);
        self.finish_load(loaded, now)
    }

    fn finish_load(&mut self, result: LoopResult<WorkingImage>, now: Instant) -> LoopResult<()> {
        match result {
            Ok(image) => self.install_image(image, now),
            Err(e) => {
                tracing::warn!(error = %e, "image load failed");
                self.status = format!("Could not load image: {e}");
                Err(e)
            }
        }
    }

    /// Replace the working image and restart the loop at `now`.
    ///
    /// The image must already match the session canvas. A running export keeps its own copy.
    pub fn install_image(&mut self, image: WorkingImage, now: Instant) -> LoopResult<()> {
        if image.canvas() != self.canvas {
            let e = LoopError::validation(format!(
                "working image is {}x{}, session canvas is {}x{}",
                image.width, image.height, self.canvas.width, self.canvas.height
            ));
            self.status = format!("Could not load image: {e}");
            return Err(e);
        }
        self.image = Some(image);
        self.clock.restart(now);
        self.status = format!("Image loaded ({}x{}).", self.canvas.width, self.canvas.height);
        tracing::info!(
            width = self.canvas.width,
            height = self.canvas.height,
            "working image installed"
        );
        Ok(())
    }

    /// Change preset and intensity. Running exports are not affected.
    pub fn set_params(&mut self, params: RenderParams) {
        self.params = params;
    }

    /// Pause or resume the preview; returns `true` when now playing.
    pub fn toggle_play(&mut self, now: Instant) -> bool {
        if self.clock.is_playing() {
            self.clock.pause(now);
        } else {
            self.clock.resume(now);
        }
        self.clock.is_playing()
    }

    /// Render the preview frame for `now`, or the placeholder before an image is loaded.
    pub fn preview_frame(&mut self, now: Instant) -> &FrameRGBA {
        match &self.image {
            None => &self.placeholder,
            Some(image) => {
                let phase = self.clock.phase_at(now);
                self.renderer.render(image, phase, &self.params)
            }
        }
    }

    /// Start an export from a snapshot of the current image, params and loop settings.
    ///
    /// Fails with [`LoopError::ExportBusy`] while another job from this session is alive; the
    /// rejected request changes nothing but the status message.
    pub fn begin_export(&mut self, kind: ExportKind) -> LoopResult<ExportJob> {
        let Some(image) = self.image.clone() else {
            self.status = "Load an image before exporting.".to_owned();
            return Err(LoopError::validation("no working image loaded"));
        };
        let Some(guard) = ExportGuard::acquire(&self.exporting) else {
            tracing::warn!(%kind, "export rejected: already exporting");
            self.status = "Export already in progress.".to_owned();
            return Err(LoopError::ExportBusy);
        };
        self.exports_started += 1;
        self.status = format!("Exporting {kind}...");
        tracing::info!(%kind, preset = %self.params.preset, "export started");
        Ok(ExportJob::new(
            kind,
            image,
            self.params,
            self.loop_cfg,
            self.opts,
            guard,
        ))
    }

    /// Turn the result of an export run into a status message.
    pub fn record_export_outcome(&mut self, outcome: &LoopResult<ExportReport>) {
        self.status = match outcome {
            Ok(r) if r.timed_out => format!(
                "Export stopped at the time limit after {} of {} frames.",
                r.frames_written, r.frames_total
            ),
            Ok(r) if r.cancelled => format!(
                "Export cancelled after {} of {} frames.",
                r.frames_written, r.frames_total
            ),
            Ok(r) => format!("Export finished: {} frames.", r.frames_written),
            Err(e) => format!("Export failed: {e}"),
        };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
