use super::*;
use crate::foundation::core::{Canvas, LoopConfig};

const LISTING: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libvpx               libvpx VP8 (codec vp8)
 V....D mpeg4                MPEG-4 part 2
 A....D aac                  AAC (Advanced Audio Coding)
";

#[test]
fn picks_the_most_preferred_available_codec() {
    let c = select_codec(LISTING, &CODEC_PREFERENCE).unwrap();
    assert_eq!(c.encoder, "libvpx");
    assert_eq!(c.container, "webm");

    let with_x264 = format!("{LISTING} V....D libx264              H.264\n");
    assert_eq!(
        select_codec(&with_x264, &CODEC_PREFERENCE).unwrap().encoder,
        "libx264"
    );
}

#[test]
fn legend_and_audio_lines_are_not_encoders() {
    assert_eq!(select_codec(" V..... = Video\n", &CODEC_PREFERENCE), None);
    assert_eq!(select_codec(" A....D mpeg4 fake\n", &CODEC_PREFERENCE), None);
    assert_eq!(select_codec("", &CODEC_PREFERENCE), None);
}

#[test]
fn empty_preference_is_unsupported_and_creates_nothing() {
    let path = Path::new("target").join("ffmpeg-sink-tests").join("none.mp4");
    let _ = std::fs::remove_file(&path);
    let mut opts = FfmpegSinkOpts::new(&path);
    opts.preference.clear();
    let mut sink = FfmpegSink::new(opts);
    let cfg = SinkConfig::new(Canvas::new(18, 32).unwrap(), LoopConfig::default());
    let err = sink.begin(cfg).unwrap_err();
    assert!(matches!(err, LoopError::Unsupported(_)), "{err}");
    assert!(!path.exists());
    assert!(sink.out_path().is_none());
}

#[test]
fn odd_dimensions_are_rejected() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg-sink-tests/odd.mp4"));
    let cfg = SinkConfig::new(Canvas::new(9, 16).unwrap(), LoopConfig::default());
    assert!(matches!(sink.begin(cfg), Err(LoopError::Validation(_))));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg-sink-tests/x.mp4"));
    let f = FrameRGBA::black(Canvas::new(18, 32).unwrap());
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[0, 0, 0, 0], [10, 20, 30, 255]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[1, 2, 3, 255], [10, 20, 30, 255]);
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn encodes_a_short_clip_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg-sink-tests/clip.mp4"));
    let canvas = Canvas::new(18, 32).unwrap();
    let cfg = SinkConfig::new(canvas, LoopConfig::new(0.25, 16).unwrap());
    match sink.begin(cfg) {
        Ok(()) => {}
        Err(LoopError::Unsupported(_)) => return,
        Err(e) => panic!("{e}"),
    }
    for i in 0..4u64 {
        let shade = (i * 60) as u8;
        let f = FrameRGBA::filled(canvas, [shade, shade, shade, 255]);
        sink.push_frame(FrameIndex(i), &f).unwrap();
    }
    sink.end().unwrap();
    let path = sink.out_path().unwrap();
    assert!(std::fs::metadata(path).unwrap().len() > 0);
}

#[test]
fn interrupt_before_begin_is_harmless() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg-sink-tests/idle.mp4"));
    let interrupt = sink.interrupter().unwrap();
    interrupt.interrupt();
    assert!(sink.end().is_err());
}

#[test]
fn interrupt_kills_a_running_encoder() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg-sink-tests/killed.mp4"));
    let canvas = Canvas::new(18, 32).unwrap();
    match sink.begin(SinkConfig::new(canvas, LoopConfig::new(1.0, 8).unwrap())) {
        Ok(()) => {}
        Err(LoopError::Unsupported(_)) => return,
        Err(e) => panic!("{e}"),
    }
    sink.push_frame(FrameIndex(0), &FrameRGBA::black(canvas)).unwrap();
    sink.interrupter().unwrap().interrupt();

    let path = sink.out_path().unwrap().to_path_buf();
    assert!(sink.end().is_err());
    assert!(!path.exists());
}
