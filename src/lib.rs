//! loopcanvas renders seamless 9:16 animation loops from a single still image.
//!
//! A [`WorkingImage`] is cropped to the canvas once, then every frame is a pure function of
//! (image, [`Phase`], [`RenderParams`]). All motion is built from integer harmonics of the phase,
//! so the frame at phase 1 is the frame at phase 0 and the loop closes without a seam.
//!
//! - Render one frame with [`render_scene`] or repeatedly with a [`SceneRenderer`]
//! - Drive an interactive preview and exports through a [`RenderSession`]
//! - Export into a [`FrameSink`]: [`GifSink`] for frame sequences, [`FfmpegSink`] for video
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod effects;
mod encode;
mod eval;
mod foundation;
mod render;
mod session;

pub use crate::assets::crop::{CropRect, crop_rect_for_aspect, crop_to_canvas};
pub use crate::assets::decode::{decode_working_image, load_working_image, spawn_decode, spawn_load};
pub use crate::assets::working::WorkingImage;
pub use crate::config::LoopSettings;
pub use crate::effects::composite::{
    BlendMode, Paint, PremulRgba8, Region, add, blit, draw_image, fill_row, over, tint,
};
pub use crate::effects::preset::{Preset, RenderParams};
pub use crate::effects::vignette::Vignette;
pub use crate::encode::ffmpeg::{
    CODEC_PREFERENCE, FfmpegSink, FfmpegSinkOpts, VideoCodec, is_ffmpeg_on_path, probe_encoders,
    select_codec,
};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, SinkInterrupt, ensure_parent_dir};
pub use crate::eval::phase::{Phase, PhaseSource, PreviewClock};
pub use crate::foundation::core::{Canvas, FrameIndex, LoopConfig};
pub use crate::foundation::error::{LoopError, LoopResult};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::scene::{
    PLACEHOLDER_RGBA, RenderOpts, SceneRenderer, placeholder_frame, render_preset, render_scene,
};
pub use crate::session::export::{CancelToken, ExportJob, ExportKind, ExportReport};
pub use crate::session::pacer::{ManualPacer, Pacer, WallClockPacer};
pub use crate::session::render_session::RenderSession;
