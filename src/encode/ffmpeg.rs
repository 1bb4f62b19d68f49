use crate::encode::sink::{FrameSink, SinkConfig, SinkInterrupt, check_push, ensure_parent_dir};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoopError, LoopResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// One ffmpeg video encoder and the container it is written into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoCodec {
    /// Human-readable name used in status messages.
    pub label: &'static str,
    /// ffmpeg encoder name (`-c:v`).
    pub encoder: &'static str,
    /// Container file extension.
    pub container: &'static str,
    /// Output arguments placed after `-c:v <encoder>`.
    pub args: &'static [&'static str],
}

/// Best-compatibility codec first.
pub const CODEC_PREFERENCE: [VideoCodec; 4] = [
    VideoCodec {
        label: "H.264/MP4",
        encoder: "libx264",
        container: "mp4",
        args: &["-pix_fmt", "yuv420p", "-movflags", "+faststart"],
    },
    VideoCodec {
        label: "VP9/WebM",
        encoder: "libvpx-vp9",
        container: "webm",
        args: &["-pix_fmt", "yuv420p", "-b:v", "0", "-crf", "32"],
    },
    VideoCodec {
        label: "VP8/WebM",
        encoder: "libvpx",
        container: "webm",
        args: &["-pix_fmt", "yuv420p", "-b:v", "2M"],
    },
    VideoCodec {
        label: "MPEG-4/MP4",
        encoder: "mpeg4",
        container: "mp4",
        args: &["-pix_fmt", "yuv420p", "-q:v", "4"],
    },
];

/// Pick the first codec of `preference` listed as a video encoder in `ffmpeg -encoders` output.
pub fn select_codec(encoders_listing: &str, preference: &[VideoCodec]) -> Option<VideoCodec> {
    let available: Vec<&str> = encoders_listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6 && flags.starts_with('V')).then_some(name)
        })
        .collect();
    preference
        .iter()
        .find(|c| available.contains(&c.encoder))
        .copied()
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// List the encoders of the `ffmpeg` on `PATH`.
pub fn probe_encoders() -> LoopResult<String> {
    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| LoopError::unsupported(format!("ffmpeg is not available: {e}")))?;
    if !output.status.success() {
        return Err(LoopError::unsupported(format!(
            "ffmpeg -encoders exited with status {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Requested output path. The extension is replaced by the chosen codec's container.
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
    /// Codecs to try, most preferred first.
    pub preference: Vec<VideoCodec>,
    /// How long `end` waits for ffmpeg to exit before killing it.
    pub finalize_timeout: Duration,
}

impl FfmpegSinkOpts {
    /// Write to `out_path` with the default codec preference.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            preference: CODEC_PREFERENCE.to_vec(),
            finalize_timeout: Duration::from_secs(30),
        }
    }
}

/// Stream-capture sink: spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// When no usable encoder exists `begin` fails with [`LoopError::Unsupported`] before any file is
/// created. A failed or timed-out finalize removes the partial file. The process can be killed
/// from another thread through [`FrameSink::interrupter`], which unblocks a stalled frame write.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    codec: Option<VideoCodec>,
    out_path: Option<PathBuf>,

    child: Arc<Mutex<Option<Child>>>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a sink; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            codec: None,
            out_path: None,
            child: Arc::new(Mutex::new(None)),
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Codec chosen by `begin`.
    pub fn codec(&self) -> Option<VideoCodec> {
        self.codec
    }

    /// Actual output path, known after `begin`.
    pub fn out_path(&self) -> Option<&Path> {
        self.out_path.as_deref()
    }

    fn child_slot(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        let child = self.child_slot().take();
        if let Some(mut child) = child {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(path) = self.out_path.as_ref() {
            let _ = std::fs::remove_file(path);
        }
        self.cfg = None;
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(path = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> LoopResult<()> {
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(LoopError::validation(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        if self.opts.preference.is_empty() {
            return Err(LoopError::unsupported("no video codec candidates configured"));
        }
        if !is_ffmpeg_on_path() {
            return Err(LoopError::unsupported(
                "video export needs ffmpeg, but it was not found on PATH",
            ));
        }
        let codec = select_codec(&probe_encoders()?, &self.opts.preference).ok_or_else(|| {
            LoopError::unsupported("ffmpeg has none of the supported video encoders")
        })?;

        let out_path = self.opts.out_path.with_extension(codec.container);
        ensure_parent_dir(&out_path)?;
        if !self.opts.overwrite && out_path.exists() {
            return Err(LoopError::validation(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.frame_rate.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            codec.encoder,
        ])
        .args(codec.args)
        .arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| {
            LoopError::unsupported(format!("failed to spawn ffmpeg (is it on PATH?): {e}"))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LoopError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LoopError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(codec = codec.label, out = %out_path.display(), "ffmpeg started");
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.codec = Some(codec);
        self.out_path = Some(out_path);
        *self.child_slot() = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LoopResult<()> {
        check_push(self.cfg.as_ref(), self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(LoopError::validation("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            self.abort();
            return Err(LoopError::encode(format!(
                "failed to write frame to ffmpeg stdin: {e}"
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> LoopResult<()> {
        drop(self.stdin.take());
        if self.child_slot().is_none() {
            return Err(LoopError::validation("ffmpeg sink not started"));
        }

        // The child stays in its slot while we wait so an interrupt can still kill it.
        let deadline = Instant::now() + self.opts.finalize_timeout;
        let status = loop {
            let polled = self.child_slot().as_mut().map(Child::try_wait);
            match polled {
                Some(Ok(Some(status))) => break status,
                Some(Ok(None)) if Instant::now() >= deadline => {
                    self.abort();
                    tracing::warn!("ffmpeg did not finish in time and was killed");
                    return Err(LoopError::encode(format!(
                        "ffmpeg did not finish within {:?}",
                        self.opts.finalize_timeout
                    )));
                }
                Some(Ok(None)) => std::thread::sleep(Duration::from_millis(10)),
                Some(Err(e)) => {
                    self.abort();
                    return Err(LoopError::encode(format!(
                        "failed to wait for ffmpeg to finish: {e}"
                    )));
                }
                None => return Err(LoopError::validation("ffmpeg sink not started")),
            }
        };
        drop(self.child_slot().take());

        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LoopError::encode("ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            self.abort();
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(LoopError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }

    fn interrupter(&self) -> Option<SinkInterrupt> {
        let child = Arc::clone(&self.child);
        Some(SinkInterrupt::new(move || {
            let mut slot = child.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(child) = slot.as_mut() {
                tracing::warn!("killing ffmpeg on interrupt");
                let _ = child.kill();
            }
        }))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        let running = self.child_slot().is_some();
        if running {
            self.abort();
        }
    }
}

/// Composite premultiplied RGBA8 over an opaque background.
pub(crate) fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) {
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
