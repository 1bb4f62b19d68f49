use crate::assets::working::WorkingImage;
use crate::effects::preset::RenderParams;
use crate::encode::sink::{FrameSink, SinkConfig, SinkInterrupt};
use crate::eval::phase::PhaseSource;
use crate::foundation::core::{FrameIndex, LoopConfig};
use crate::foundation::error::{LoopError, LoopResult};
use crate::render::frame::FrameRGBA;
use crate::render::scene::{RenderOpts, SceneRenderer};
use crate::session::pacer::Pacer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default time a capture sink gets to start and to finalize.
const DEFAULT_FINALIZE_GRACE: Duration = Duration::from_secs(30);

/// Shared flag to stop an export early.
///
/// A cancelled export still finalizes its sink, producing a shorter but valid output.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Which export backend a job feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Frame-exact sequence, e.g. an animated GIF.
    Frames,
    /// Real-time stream capture, e.g. a video file.
    Capture,
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExportKind::Frames => "frame sequence",
            ExportKind::Capture => "stream capture",
        })
    }
}

/// Outcome of one export run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExportReport {
    /// Frames in one loop.
    pub frames_total: u64,
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Stopped by a [`CancelToken`].
    pub cancelled: bool,
    /// Stopped by the capture deadline.
    pub timed_out: bool,
}

impl ExportReport {
    /// Every frame of the loop was written.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && !self.timed_out && self.frames_written == self.frames_total
    }
}

/// Clears the session's exporting flag when the job is finished or dropped.
#[derive(Debug)]
pub(crate) struct ExportGuard(Arc<AtomicBool>);

impl ExportGuard {
    /// Take the flag, or `None` when another export holds it.
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One export with its own snapshot of image, params and loop settings.
///
/// Later changes to the session (new params, pausing, a new image) do not reach a running job.
#[derive(Debug)]
pub struct ExportJob {
    kind: ExportKind,
    image: WorkingImage,
    params: RenderParams,
    loop_cfg: LoopConfig,
    opts: RenderOpts,
    finalize_grace: Duration,
    _guard: ExportGuard,
}

impl ExportJob {
    pub(crate) fn new(
        kind: ExportKind,
        image: WorkingImage,
        params: RenderParams,
        loop_cfg: LoopConfig,
        opts: RenderOpts,
        guard: ExportGuard,
    ) -> Self {
        Self {
            kind,
            image,
            params,
            loop_cfg,
            opts,
            finalize_grace: DEFAULT_FINALIZE_GRACE,
            _guard: guard,
        }
    }

    /// Time a capture sink may take in `begin`, and in `end` past the capture deadline.
    pub fn with_finalize_grace(mut self, grace: Duration) -> Self {
        self.finalize_grace = grace;
        self
    }

    /// Backend this job was started for.
    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    /// Params captured when the export began.
    pub fn params(&self) -> RenderParams {
        self.params
    }

    /// Loop settings captured when the export began.
    pub fn loop_config(&self) -> LoopConfig {
        self.loop_cfg
    }

    /// Frames in one exported loop.
    pub fn total_frames(&self) -> u64 {
        self.loop_cfg.total_frames()
    }

    fn expect_kind(&self, runner: ExportKind) -> LoopResult<()> {
        if self.kind != runner {
            return Err(LoopError::validation(format!(
                "a {} job cannot run as a {runner} export",
                self.kind
            )));
        }
        Ok(())
    }

    /// Render every frame of the loop in index order into `sink`.
    ///
    /// Frame `i` is rendered at phase `i / total_frames`. Only [`ExportKind::Frames`] jobs run
    /// here.
    #[tracing::instrument(skip_all, fields(preset = %self.params.preset, frames = self.total_frames()))]
    pub fn run_frames(self, sink: &mut dyn FrameSink, cancel: &CancelToken) -> LoopResult<ExportReport> {
        self.expect_kind(ExportKind::Frames)?;
        let total = self.total_frames();
        sink.begin(SinkConfig::new(self.image.canvas(), self.loop_cfg))?;

        let mut renderer = SceneRenderer::new(self.opts);
        let mut report = ExportReport {
            frames_total: total,
            ..ExportReport::default()
        };
        for i in 0..total {
            if cancel.is_cancelled() {
                tracing::warn!(written = report.frames_written, "export cancelled");
                report.cancelled = true;
                break;
            }
            let phase = PhaseSource::Export {
                index: FrameIndex(i),
                total_frames: total,
            }
            .phase();
            let frame = renderer.render(&self.image, phase, &self.params);
            if let Err(e) = sink.push_frame(FrameIndex(i), frame) {
                let _ = sink.end();
                return Err(e);
            }
            report.frames_written += 1;
            tracing::debug!(frame = i, "frame exported");
        }

        sink.end()?;
        tracing::info!(written = report.frames_written, "frame export finished");
        Ok(report)
    }

    /// Capture the live scene into `sink` at the preview cadence.
    ///
    /// Frame `i` is due `i / frame_rate` seconds after the start and rendered at the phase the
    /// preview shows at that moment. The run stops after `total_frames` frames, on cancellation,
    /// or at the hard deadline of one loop duration on the pacer's clock.
    ///
    /// The sink runs on its own thread and every wait on it is bounded: a frame still unwritten
    /// at the deadline stops the run as timed out, and `end` gets what is left of the deadline
    /// plus the finalize grace. An overrunning sink is interrupted through
    /// [`FrameSink::interrupter`] and abandoned, so it is only handed back when it finished in
    /// time. Only [`ExportKind::Capture`] jobs run here.
    #[tracing::instrument(skip_all, fields(preset = %self.params.preset, frames = self.total_frames()))]
    pub fn run_capture<S>(
        self,
        sink: S,
        pacer: &mut dyn Pacer,
        cancel: &CancelToken,
    ) -> (Option<S>, LoopResult<ExportReport>)
    where
        S: FrameSink + 'static,
    {
        if let Err(e) = self.expect_kind(ExportKind::Capture) {
            return (Some(sink), Err(e));
        }
        let total = self.total_frames();
        let fps = f64::from(self.loop_cfg.frame_rate.max(1));
        let grace = self.finalize_grace;
        let interrupt = sink.interrupter();

        let (frame_tx, frame_rx) = mpsc::sync_channel(1);
        let (event_tx, event_rx) = mpsc::channel();
        let cfg = SinkConfig::new(self.image.canvas(), self.loop_cfg);
        let spawned = std::thread::Builder::new()
            .name("loopcanvas-capture".to_owned())
            .spawn(move || capture_writer(sink, cfg, frame_rx, event_tx));
        if let Err(e) = spawned {
            return (
                None,
                Err(LoopError::Other(anyhow::anyhow!(
                    "failed to spawn capture thread: {e}"
                ))),
            );
        }

        match event_rx.recv_timeout(grace) {
            Ok(WriterEvent::Began(Ok(()))) => {}
            Ok(WriterEvent::Began(Err(e))) => {
                let (sink, _) = await_finish(&event_rx, grace, interrupt.as_ref());
                return (sink, Err(e));
            }
            Ok(_) | Err(_) => {
                fire(interrupt.as_ref());
                return (
                    None,
                    Err(LoopError::encode(format!(
                        "capture sink did not start within {grace:?}"
                    ))),
                );
            }
        }

        let start = pacer.now();
        let deadline = start + self.loop_cfg.duration();
        let mut renderer = SceneRenderer::new(self.opts);
        let mut report = ExportReport {
            frames_total: total,
            ..ExportReport::default()
        };
        for i in 0..total {
            if cancel.is_cancelled() {
                tracing::warn!(written = report.frames_written, "capture cancelled");
                report.cancelled = true;
                break;
            }
            pacer.sleep_until(start + Duration::from_secs_f64(i as f64 / fps));
            let now = pacer.now();
            if now >= deadline {
                tracing::warn!(written = report.frames_written, "capture hit its deadline");
                report.timed_out = true;
                break;
            }

            let phase = PhaseSource::Preview {
                elapsed_secs: now.saturating_duration_since(start).as_secs_f64(),
                loop_duration_secs: self.loop_cfg.duration_secs,
            }
            .phase();
            let frame = renderer.render(&self.image, phase, &self.params).clone();
            if frame_tx.send((FrameIndex(i), frame)).is_err() {
                fire(interrupt.as_ref());
                return (None, Err(LoopError::encode("capture thread stopped unexpectedly")));
            }

            let budget = deadline.saturating_duration_since(pacer.now());
            match event_rx.recv_timeout(budget) {
                Ok(WriterEvent::Pushed(Ok(()))) => report.frames_written += 1,
                Ok(WriterEvent::Pushed(Err(e))) => {
                    drop(frame_tx);
                    let (sink, _) = await_finish(&event_rx, grace, interrupt.as_ref());
                    return (sink, Err(e));
                }
                Ok(WriterEvent::Finished(sink, _)) => {
                    return (
                        Some(sink),
                        Err(LoopError::encode("capture sink finished before the last frame")),
                    );
                }
                Ok(WriterEvent::Began(_)) | Err(_) => {
                    tracing::warn!(
                        frame = i,
                        written = report.frames_written,
                        "capture sink stalled past the deadline; interrupting it"
                    );
                    fire(interrupt.as_ref());
                    report.timed_out = true;
                    return (None, Ok(report));
                }
            }
        }

        drop(frame_tx);
        let wait = deadline.saturating_duration_since(pacer.now()) + grace;
        let (sink, ended) = await_finish(&event_rx, wait, interrupt.as_ref());
        match ended {
            Ok(()) => {
                tracing::info!(written = report.frames_written, "stream capture finished");
                (sink, Ok(report))
            }
            Err(e) => (sink, Err(e)),
        }
    }

    /// Run [`ExportJob::run_frames`] on a background thread. The sink is handed back on join.
    pub fn spawn_frames<S>(
        self,
        mut sink: S,
        cancel: CancelToken,
    ) -> LoopResult<JoinHandle<(S, LoopResult<ExportReport>)>>
    where
        S: FrameSink + 'static,
    {
        std::thread::Builder::new()
            .name("loopcanvas-export".to_owned())
            .spawn(move || {
                let report = self.run_frames(&mut sink, &cancel);
                (sink, report)
            })
            .map_err(|e| LoopError::Other(anyhow::anyhow!("failed to spawn export thread: {e}")))
    }
}

/// Progress reported by the capture thread.
enum WriterEvent<S> {
    Began(LoopResult<()>),
    Pushed(LoopResult<()>),
    Finished(S, LoopResult<()>),
}

/// Owns the sink for one capture: `begin`, one `push_frame` per received frame, then `end` once
/// the frame channel closes or a push fails. The sink goes back with the final event.
fn capture_writer<S: FrameSink>(
    mut sink: S,
    cfg: SinkConfig,
    frames: Receiver<(FrameIndex, FrameRGBA)>,
    events: Sender<WriterEvent<S>>,
) {
    let began = sink.begin(cfg);
    let started = began.is_ok();
    let _ = events.send(WriterEvent::Began(began));
    if started {
        for (idx, frame) in frames.iter() {
            let pushed = sink.push_frame(idx, &frame);
            let failed = pushed.is_err();
            let _ = events.send(WriterEvent::Pushed(pushed));
            if failed {
                break;
            }
        }
    }
    let ended = if started { sink.end() } else { Ok(()) };
    let _ = events.send(WriterEvent::Finished(sink, ended));
}

/// Wait up to `wait` for the capture thread to hand the sink back.
fn await_finish<S>(
    events: &Receiver<WriterEvent<S>>,
    wait: Duration,
    interrupt: Option<&SinkInterrupt>,
) -> (Option<S>, LoopResult<()>) {
    let deadline = std::time::Instant::now() + wait;
    loop {
        let left = deadline.saturating_duration_since(std::time::Instant::now());
        match events.recv_timeout(left) {
            Ok(WriterEvent::Finished(sink, ended)) => return (Some(sink), ended),
            Ok(_) => continue,
            Err(_) => {
                tracing::warn!("capture sink did not finalize in time; interrupting it");
                fire(interrupt);
                return (
                    None,
                    Err(LoopError::encode(format!(
                        "capture sink did not finalize within {wait:?}"
                    ))),
                );
            }
        }
    }
}

fn fire(interrupt: Option<&SinkInterrupt>) {
    if let Some(i) = interrupt {
        i.interrupt();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
