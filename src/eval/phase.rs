use crate::foundation::core::{FrameIndex, LoopConfig};
use std::time::{Duration, Instant};

/// Normalized position within one loop, always in `[0, 1)`.
///
/// Phase is the only time input a preset sees. Preview derives it from wall-clock time and
/// export derives it from the frame index; equal phases render equal frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Phase(f64);

impl Phase {
    /// Start of the loop.
    pub const ZERO: Phase = Phase(0.0);

    /// Wrap any value into `[0, 1)`. Non-finite input maps to zero.
    pub fn new(v: f64) -> Self {
        if !v.is_finite() {
            return Self::ZERO;
        }
        let w = v.rem_euclid(1.0);
        // rem_euclid of a tiny negative value rounds up to exactly 1.0.
        if w >= 1.0 { Self::ZERO } else { Self(w) }
    }

    /// Preview-mode phase: `(elapsed / loop_duration) mod 1`.
    ///
    /// Negative elapsed values (clock adjustments) wrap backwards into the previous loop.
    pub fn from_elapsed(elapsed_secs: f64, loop_duration_secs: f64) -> Self {
        if !loop_duration_secs.is_finite() || loop_duration_secs <= 0.0 {
            return Self::ZERO;
        }
        Self::new(elapsed_secs / loop_duration_secs)
    }

    /// Export-mode phase: `index / total`. `index == total` is never rendered; it would equal zero.
    pub fn from_frame(index: FrameIndex, total_frames: u64) -> Self {
        if total_frames == 0 {
            return Self::ZERO;
        }
        Self::new(index.0 as f64 / total_frames as f64)
    }

    /// The raw value in `[0, 1)`.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Phase as an angle in radians, `[0, 2π)`.
    pub fn radians(self) -> f32 {
        crate::foundation::math::radians(self.0)
    }
}

/// Where a frame's phase comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaseSource {
    /// Live preview: seconds since the loop epoch.
    Preview {
        /// Wall-clock seconds since the loop started.
        elapsed_secs: f64,
        /// Loop length in seconds.
        loop_duration_secs: f64,
    },
    /// Frame-exact export.
    Export {
        /// Frame being rendered, `< total_frames`.
        index: FrameIndex,
        /// Frames in the loop.
        total_frames: u64,
    },
}

impl PhaseSource {
    /// Resolve to a [`Phase`].
    pub fn phase(self) -> Phase {
        match self {
            PhaseSource::Preview {
                elapsed_secs,
                loop_duration_secs,
            } => Phase::from_elapsed(elapsed_secs, loop_duration_secs),
            PhaseSource::Export {
                index,
                total_frames,
            } => Phase::from_frame(index, total_frames),
        }
    }
}

/// Wall-clock phase source for live preview, with pause/resume.
///
/// Pausing freezes the phase; resuming shifts the epoch so playback continues from the frozen
/// phase.
#[derive(Clone, Debug)]
pub struct PreviewClock {
    epoch: Instant,
    paused_at: Option<Duration>,
    loop_cfg: LoopConfig,
}

impl PreviewClock {
    /// Start playing at `now`.
    pub fn new(loop_cfg: LoopConfig, now: Instant) -> Self {
        Self {
            epoch: now,
            paused_at: None,
            loop_cfg,
        }
    }

    /// Return `true` unless paused.
    pub fn is_playing(&self) -> bool {
        self.paused_at.is_none()
    }

    /// Stop phase advancement. No-op when already paused.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now.saturating_duration_since(self.epoch));
        }
    }

    /// Continue from the paused phase. No-op when playing.
    pub fn resume(&mut self, now: Instant) {
        if let Some(elapsed) = self.paused_at.take() {
            self.epoch = now.checked_sub(elapsed).unwrap_or(now);
        }
    }

    /// Restart the loop at `now` (used when a new image is installed).
    pub fn restart(&mut self, now: Instant) {
        self.epoch = now;
        if self.paused_at.is_some() {
            self.paused_at = Some(Duration::ZERO);
        }
    }

    /// Seconds of loop time elapsed at `now`.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.paused_at
            .unwrap_or_else(|| now.saturating_duration_since(self.epoch))
            .as_secs_f64()
    }

    /// Phase at `now`.
    pub fn phase_at(&self, now: Instant) -> Phase {
        PhaseSource::Preview {
            elapsed_secs: self.elapsed_secs(now),
            loop_duration_secs: self.loop_cfg.duration_secs,
        }
        .phase()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/phase.rs"]
mod tests;
