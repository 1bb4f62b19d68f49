//! Export backends.
//!
//! Sinks consume rendered frames in loop order. [`gif::GifSink`] writes the frame-sequence export,
//! [`ffmpeg::FfmpegSink`] the stream-capture video.

pub(crate) mod ffmpeg;
pub(crate) mod gif;
pub(crate) mod sink;
