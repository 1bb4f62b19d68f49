use super::*;
use crate::effects::preset::{Preset, RenderParams};
use crate::eval::phase::Phase;
use crate::foundation::core::Canvas;

fn setup(intensity: f32, phase: f64) -> (WorkingImage, FrameRGBA, Motion) {
    let canvas = Canvas::new(36, 64).unwrap();
    let src = WorkingImage::solid(canvas.width, canvas.height, [255, 255, 255, 255]);
    let dst = FrameRGBA::black(canvas);
    let m = Motion::new(
        Phase::new(phase),
        &RenderParams::new(Preset::SliceSplit, intensity),
        canvas,
    );
    (src, dst, m)
}

#[test]
fn zero_intensity_keeps_the_image_in_place() {
    let (src, mut dst, m) = setup(0.0, 0.3);
    render(&mut dst, &src, &m);
    assert!(dst.data.iter().all(|&v| v == 255));
}

#[test]
fn first_strip_moves_right_at_quarter_wave() {
    // phase 1/8 puts the second harmonic at its peak for strip 0.
    let (src, mut dst, m) = setup(1.0, 0.125);
    render(&mut dst, &src, &m);
    let uncovered = dst.pixel(0, 0).unwrap();
    assert!(uncovered[0] < 40, "{uncovered:?}");
    assert_eq!(dst.pixel(20, 0).unwrap()[0], 255);
}

#[test]
fn negative_intensity_mirrors_the_shift() {
    let (src, mut dst, m) = setup(-1.0, 0.125);
    render(&mut dst, &src, &m);
    assert!(dst.pixel(35, 0).unwrap()[0] < 40);
    assert_eq!(dst.pixel(0, 0).unwrap()[0], 255);
}

#[test]
fn extreme_intensity_does_not_panic() {
    let (src, mut dst, m) = setup(1e30, 0.4);
    render(&mut dst, &src, &m);
    assert_eq!(dst.data.len(), 36 * 64 * 4);
}
