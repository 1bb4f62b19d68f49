use super::*;
use crate::effects::preset::Preset;
use crate::encode::sink::InMemorySink;
use crate::render::scene::PLACEHOLDER_RGBA;
use crate::session::export::CancelToken;
use std::time::Duration;

fn canvas() -> Canvas {
    Canvas::new(18, 32).unwrap()
}

fn session(now: Instant) -> RenderSession {
    RenderSession::new(
        canvas(),
        LoopConfig::new(4.0, 16).unwrap(),
        RenderOpts::default(),
        now,
    )
    .unwrap()
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([(x * 9) as u8, (y * 5) as u8, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn rejects_invalid_settings() {
    let now = Instant::now();
    let bad_canvas = Canvas {
        width: 100,
        height: 100,
    };
    assert!(RenderSession::new(bad_canvas, LoopConfig::default(), RenderOpts::default(), now).is_err());
    let bad_loop = LoopConfig {
        duration_secs: 0.0,
        frame_rate: 16,
    };
    assert!(RenderSession::new(canvas(), bad_loop, RenderOpts::default(), now).is_err());
}

#[test]
fn shows_placeholder_until_an_image_is_loaded() {
    let t0 = Instant::now();
    let mut s = session(t0);
    assert_eq!(s.status(), "Upload an image to begin.");
    let f = s.preview_frame(t0);
    assert_eq!(f.pixel(0, 0), Some(PLACEHOLDER_RGBA));

    s.load_image_bytes(&png_bytes(100, 100), t0).unwrap();
    assert!(s.status().starts_with("Image loaded"));
    assert_eq!(s.image().unwrap().canvas(), canvas());
    let f = s.preview_frame(t0);
    assert_ne!(f.pixel(9, 16), Some(PLACEHOLDER_RGBA));
}

#[test]
fn failed_load_keeps_the_previous_image() {
    let t0 = Instant::now();
    let mut s = session(t0);
    s.load_image_bytes(&png_bytes(40, 40), t0).unwrap();
    let before = s.image().cloned();
    let err = s.load_image_bytes(b"nope", t0).unwrap_err();
    assert!(matches!(err, LoopError::Input(_)));
    assert!(s.status().starts_with("Could not load image"));
    assert_eq!(s.image().cloned(), before);
}

#[test]
fn install_rejects_mismatched_images() {
    let t0 = Instant::now();
    let mut s = session(t0);
    let err = s
        .install_image(WorkingImage::solid(9, 16, [1, 2, 3, 255]), t0)
        .unwrap_err();
    assert!(matches!(err, LoopError::Validation(_)));
    assert!(s.image().is_none());
}

#[test]
fn pause_freezes_the_preview() {
    let t0 = Instant::now();
    let mut s = session(t0);
    s.install_image(WorkingImage::solid(18, 32, [200, 10, 10, 255]), t0)
        .unwrap();
    s.set_params(RenderParams::new(Preset::Warp, 1.0));

    let t1 = t0 + Duration::from_millis(700);
    assert!(!s.toggle_play(t1));
    let frozen = s.preview_frame(t1).clone();
    let later = t1 + Duration::from_secs(3);
    assert_eq!(s.phase_at(later), s.phase_at(t1));
    assert_eq!(s.preview_frame(later), &frozen);

    assert!(s.toggle_play(later));
    assert_eq!(s.phase_at(later), s.phase_at(t1));
}

#[test]
fn export_without_an_image_is_refused() {
    let t0 = Instant::now();
    let mut s = session(t0);
    assert!(s.begin_export(ExportKind::Frames).is_err());
    assert_eq!(s.exports_started(), 0);
    assert!(!s.is_exporting());
}

#[test]
fn second_export_is_rejected_without_side_effects() {
    let t0 = Instant::now();
    let mut s = session(t0);
    s.install_image(WorkingImage::solid(18, 32, [200, 10, 10, 255]), t0)
        .unwrap();

    let job = s.begin_export(ExportKind::Frames).unwrap();
    assert!(s.is_exporting());
    assert_eq!(s.exports_started(), 1);

    let err = s.begin_export(ExportKind::Capture).unwrap_err();
    assert!(matches!(err, LoopError::ExportBusy));
    assert_eq!(s.exports_started(), 1);
    assert_eq!(s.status(), "Export already in progress.");

    let mut sink = InMemorySink::new();
    let outcome = job.run_frames(&mut sink, &CancelToken::new());
    s.record_export_outcome(&outcome);
    assert!(!s.is_exporting());
    assert_eq!(s.status(), "Export finished: 64 frames.");
    assert!(s.begin_export(ExportKind::Frames).is_ok());
}

#[test]
fn export_uses_the_snapshot_taken_at_begin() {
    let t0 = Instant::now();
    let mut s = session(t0);
    s.install_image(WorkingImage::solid(18, 32, [200, 10, 10, 255]), t0)
        .unwrap();
    s.set_params(RenderParams::new(Preset::SliceSplit, 0.9));
    let job = s.begin_export(ExportKind::Frames).unwrap();

    s.set_params(RenderParams::new(Preset::None, 0.0));
    s.toggle_play(t0);
    s.install_image(WorkingImage::solid(18, 32, [0, 0, 255, 255]), t0)
        .unwrap();

    assert_eq!(job.params(), RenderParams::new(Preset::SliceSplit, 0.9));
    let mut sink = InMemorySink::new();
    let report = job.run_frames(&mut sink, &CancelToken::new()).unwrap();
    assert!(report.is_complete());
    // The red source survives in the export even though the session now shows blue.
    let px = sink.frames()[0].1.pixel(9, 16).unwrap();
    assert!(px[0] > px[2], "{px:?}");
}

#[test]
fn outcome_messages() {
    let t0 = Instant::now();
    let mut s = session(t0);
    let cancelled = ExportReport {
        frames_total: 64,
        frames_written: 10,
        cancelled: true,
        timed_out: false,
    };
    s.record_export_outcome(&Ok(cancelled));
    assert_eq!(s.status(), "Export cancelled after 10 of 64 frames.");
    let timed_out = ExportReport {
        cancelled: false,
        timed_out: true,
        ..cancelled
    };
    s.record_export_outcome(&Ok(timed_out));
    assert!(s.status().starts_with("Export stopped at the time limit"));
    s.record_export_outcome(&Err(LoopError::unsupported("no codec")));
    assert_eq!(s.status(), "Export failed: unsupported capability: no codec");
}
