use crate::foundation::core::{Canvas, FrameIndex, LoopConfig};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::frame::FrameRGBA;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frames per second.
    pub frame_rate: u32,
    /// Display time of each frame.
    pub frame_delay: Duration,
}

impl SinkConfig {
    /// Sink settings for exporting one loop of `loop_cfg` at `canvas` size.
    pub fn new(canvas: Canvas, loop_cfg: LoopConfig) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            frame_rate: loop_cfg.frame_rate,
            frame_delay: loop_cfg.frame_duration(),
        }
    }

    /// Check for non-zero dimensions and frame rate.
    pub fn validate(&self) -> LoopResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LoopError::validation("sink width/height must be non-zero"));
        }
        if self.frame_rate == 0 {
            return Err(LoopError::validation("sink frame_rate must be non-zero"));
        }
        Ok(())
    }

    /// Delay per frame in milliseconds.
    pub fn frame_delay_ms(&self) -> f64 {
        self.frame_delay.as_secs_f64() * 1000.0
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values,
/// one per rendered frame, between one `begin` and one `end`.
pub trait FrameSink: Send {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> LoopResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LoopResult<()>;
    /// Finalize the output. Called after the last frame, also for cancelled runs.
    fn end(&mut self) -> LoopResult<()>;

    /// Handle that unblocks this sink from another thread, or `None` if it cannot be interrupted.
    ///
    /// Stream capture fires it when a sink call overruns the capture deadline. After that the
    /// sink's pending and later calls are expected to fail promptly.
    fn interrupter(&self) -> Option<SinkInterrupt> {
        None
    }
}

/// Cloneable, thread-safe trigger returned by [`FrameSink::interrupter`].
#[derive(Clone)]
pub struct SinkInterrupt(Arc<dyn Fn() + Send + Sync>);

impl SinkInterrupt {
    /// Wrap the action that stops the sink.
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Fire the interrupt. May be called more than once.
    pub fn interrupt(&self) {
        (self.0)();
    }
}

impl std::fmt::Debug for SinkInterrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SinkInterrupt(..)")
    }
}

/// Shared checks for `push_frame`: sink started, index increasing, frame size matching.
pub(crate) fn check_push(
    cfg: Option<&SinkConfig>,
    last_idx: Option<FrameIndex>,
    idx: FrameIndex,
    frame: &FrameRGBA,
) -> LoopResult<()> {
    let cfg = cfg.ok_or_else(|| LoopError::validation("sink not started"))?;
    if let Some(last) = last_idx
        && idx <= last
    {
        return Err(LoopError::validation(format!(
            "out-of-order frame index {} after {}",
            idx.0, last.0
        )));
    }
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(LoopError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    if frame.data.len() != (cfg.width as usize) * (cfg.height as usize) * 4 {
        return Err(LoopError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LoopResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LoopResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LoopResult<()> {
        check_push(
            self.cfg.as_ref(),
            self.frames.last().map(|(i, _)| *i),
            idx,
            frame,
        )?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> LoopResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
