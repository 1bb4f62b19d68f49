use super::*;
use crate::effects::preset::{Preset, RenderParams};
use crate::eval::phase::Phase;
use crate::foundation::core::Canvas;

fn pattern(canvas: Canvas) -> WorkingImage {
    let mut data = Vec::with_capacity(canvas.rgba_len());
    for y in 0..canvas.height {
        for x in 0..canvas.width {
            data.extend_from_slice(&[(x * 7) as u8, (y * 3) as u8, ((x ^ y) * 5) as u8, 255]);
        }
    }
    WorkingImage::from_premul(canvas.width, canvas.height, data).unwrap()
}

fn motion(intensity: f32, phase: f64, canvas: Canvas) -> Motion {
    Motion::new(
        Phase::new(phase),
        &RenderParams::new(Preset::Warp, intensity),
        canvas,
    )
}

#[test]
fn zero_intensity_is_identity() {
    let canvas = Canvas::new(36, 64).unwrap();
    let src = pattern(canvas);
    let mut dst = FrameRGBA::black(canvas);
    render(&mut dst, &src, &motion(0.0, 0.3, canvas), false);
    assert_eq!(dst.data.as_slice(), src.data());
}

#[test]
fn serial_and_parallel_agree() {
    let canvas = Canvas::new(54, 96).unwrap();
    let src = pattern(canvas);
    let m = motion(0.8, 0.41, canvas);
    let mut a = FrameRGBA::black(canvas);
    let mut b = FrameRGBA::black(canvas);
    render(&mut a, &src, &m, false);
    render(&mut b, &src, &m, true);
    assert_eq!(a, b);
}

#[test]
fn every_pixel_is_covered_across_intensities() {
    let canvas = Canvas::new(36, 64).unwrap();
    let src = pattern(canvas);
    for intensity in [-2.0, -1.0, -0.3, 0.0, 0.5, 1.0, 2.0] {
        for phase in [0.0, 0.17, 0.5, 0.93] {
            let mut dst = FrameRGBA::filled(canvas, [0, 0, 0, 0]);
            render(&mut dst, &src, &motion(intensity, phase, canvas), true);
            assert!(
                dst.data.chunks_exact(4).all(|px| px[3] == 255),
                "hole at intensity={intensity} phase={phase}"
            );
        }
    }
}

#[test]
fn displacement_is_finite_for_extreme_intensity() {
    let canvas = Canvas::new(36, 64).unwrap();
    let field = WarpField::new(&motion(1e38, 0.3, canvas), 36, 64);
    let (dx, dy) = field.displacement(3.0, 50.0);
    assert!(dx.is_finite() && dy.is_finite());
}

#[test]
fn twist_is_damped() {
    let canvas = Canvas::new(36, 64).unwrap();
    let field = WarpField::new(&motion(1.0, 0.25, canvas), 36, 64);
    assert!(field.twist > 0.5, "twist {}", field.twist);
    let untwisted = WarpField { twist: 0.0, ..field };

    for (x, y) in [(26.0, 20.0), (8.0, 50.0), (30.0, 40.0)] {
        let (dx, dy) = field.displacement(x, y);
        let (ux, uy) = untwisted.displacement(x, y);
        let part = ((dx - ux).powi(2) + (dy - uy).powi(2)).sqrt();

        let (vx, vy) = (x - field.cx, y - field.cy);
        let r = (vx * vx + vy * vy).sqrt();
        let falloff = 1.0 - r * field.inv_max_r;
        let theta = field.twist * falloff * falloff;
        let chord = 2.0 * r * (theta / 2.0).sin().abs();

        assert!(part > 0.0, "no twist at ({x}, {y})");
        assert!(part < chord, "({x}, {y}): {part} vs chord {chord}");
        assert!(
            (part - TWIST_DAMPING * chord).abs() < 1e-3,
            "({x}, {y}): {part} vs {}",
            TWIST_DAMPING * chord
        );
    }
}
