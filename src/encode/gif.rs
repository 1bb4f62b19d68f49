use crate::encode::sink::{FrameSink, SinkConfig, check_push, ensure_parent_dir};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::frame::FrameRGBA;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// NeuQuant sampling factor; 1 is best quality, 30 fastest.
const QUANTIZER_SPEED: i32 = 10;

/// Options for [`GifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl GifSinkOpts {
    /// Write to `out_path`, overwriting.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Frame-sequence export: an infinitely repeating animated GIF.
///
/// Each frame is shown for `1000 / frame_rate` ms. A run that ends without any frame removes its
/// output file and reports an error.
pub struct GifSink {
    opts: GifSinkOpts,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    cfg: Option<SinkConfig>,
    delay: Delay,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl GifSink {
    /// Create a sink writing to `opts.out_path`.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            delay: Delay::from_numer_denom_ms(0, 1),
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Output path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    /// Frames encoded since the last `begin`.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn discard_output(&mut self) {
        self.encoder = None;
        let _ = std::fs::remove_file(&self.opts.out_path);
    }
}

impl FrameSink for GifSink {
    #[tracing::instrument(skip(self), fields(path = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> LoopResult<()> {
        cfg.validate()?;
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(LoopError::validation("gif frames are limited to 65535x65535"));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(LoopError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let file = {
            use anyhow::Context as _;
            File::create(&self.opts.out_path).with_context(|| {
                format!("failed to create '{}'", self.opts.out_path.display())
            })?
        };
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), QUANTIZER_SPEED);
        if let Err(e) = encoder.set_repeat(Repeat::Infinite) {
            self.discard_output();
            return Err(LoopError::encode(format!("failed to set gif repeat: {e}")));
        }

        self.delay = Delay::from_numer_denom_ms(1000, cfg.frame_rate);
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LoopResult<()> {
        check_push(self.cfg.as_ref(), self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        let Some(encoder) = self.encoder.as_mut() else {
            return Err(LoopError::validation("gif sink is already finalized"));
        };
        let rgba = frame
            .to_straight_rgba_image()
            .ok_or_else(|| LoopError::validation("frame buffer does not match its size"))?;
        if let Err(e) = encoder.encode_frame(Frame::from_parts(rgba, 0, 0, self.delay)) {
            self.discard_output();
            return Err(LoopError::encode(format!(
                "failed to encode gif frame {}: {e}",
                idx.0
            )));
        }
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> LoopResult<()> {
        if self.cfg.take().is_none() {
            return Err(LoopError::validation("gif sink not started"));
        }
        if self.frames_written == 0 {
            self.discard_output();
            return Err(LoopError::encode("no frames were written; gif discarded"));
        }
        // Dropping the encoder writes the trailer and flushes the file.
        drop(self.encoder.take());
        tracing::debug!(frames = self.frames_written, "gif finalized");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
