use super::*;
use crate::effects::preset::{Preset, RenderParams};
use crate::eval::phase::Phase;
use crate::foundation::core::Canvas;

fn motion(intensity: f32, phase: f64, canvas: Canvas) -> Motion {
    Motion::new(
        Phase::new(phase),
        &RenderParams::new(Preset::Orbital, intensity),
        canvas,
    )
}

#[test]
fn centered_transform_maps_image_center_to_target() {
    let src = WorkingImage::solid(10, 20, [255, 255, 255, 255]);
    let a = centered(&src, Point::new(50.0, 60.0), 2.0, 0.3);
    let c = a * Point::new(5.0, 10.0);
    assert!((c.x - 50.0).abs() < 1e-9 && (c.y - 60.0).abs() < 1e-9);
}

#[test]
fn opaque_image_covers_the_whole_canvas_at_rest() {
    let canvas = Canvas::new(36, 64).unwrap();
    let src = WorkingImage::solid(canvas.width, canvas.height, [90, 120, 150, 255]);
    let mut dst = FrameRGBA::black(canvas);
    render(&mut dst, &src, &motion(0.0, 0.0, canvas));
    // Zoom 1.05 with no offset: the main layer covers everything.
    for px in dst.data.chunks_exact(4) {
        assert!(px[0] >= 85 && px[3] == 255, "{px:?}");
    }
}

#[test]
fn large_intensity_degrades_instead_of_panicking() {
    let canvas = Canvas::new(36, 64).unwrap();
    let src = WorkingImage::solid(canvas.width, canvas.height, [90, 120, 150, 255]);
    for intensity in [-50.0, 50.0, 1e20, -1e38] {
        let mut dst = FrameRGBA::black(canvas);
        render(&mut dst, &src, &motion(intensity, 0.37, canvas));
        assert_eq!(dst.data.len(), canvas.rgba_len());
    }
}
