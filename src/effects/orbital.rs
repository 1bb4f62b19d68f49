//! Drift orbit: the image breathes (zoom) and circles around the canvas center, trailed by a
//! dim counter-moving echo, two tinted additive echoes on higher harmonics, and thin jittering
//! streak bands.

use crate::assets::working::WorkingImage;
use crate::effects::composite::{Paint, Region, blit, draw_image};
use crate::effects::preset::Motion;
use crate::foundation::math::px_offset;
use crate::render::frame::FrameRGBA;
use kurbo::{Affine, Point, Vec2};

const BASE_ZOOM: f32 = 1.05;
const ZOOM_SWING: f32 = 0.08;
const ZOOM_RIPPLE: f32 = 0.02;
const MIN_ZOOM: f64 = 0.05;

const ORBIT_X_PX: f32 = 30.0;
const ORBIT_Y_PX: f32 = 40.0;
const WOBBLE_X_PX: f32 = 6.0;
const WOBBLE_Y_PX: f32 = 5.0;

const SHADOW_ALPHA: f32 = 40.0 / 255.0;
const SHADOW_ZOOM: f64 = 0.95;

struct Echo {
    harmonic: u32,
    phase_offset: f32,
    /// Peak rotation in radians at intensity 1.
    spin: f32,
    /// Peak extra zoom at intensity 1.
    swell: f32,
    /// How far the echo follows the orbit offset.
    follow: f64,
    tint: [u8; 3],
    alpha: f32,
}

const ECHOES: [Echo; 2] = [
    Echo {
        harmonic: 2,
        phase_offset: 0.5,
        spin: 0.035,
        swell: 0.03,
        follow: 0.8,
        tint: [255, 80, 200],
        alpha: 0.14,
    },
    Echo {
        harmonic: 3,
        phase_offset: 1.1,
        spin: -0.05,
        swell: 0.02,
        follow: 1.2,
        tint: [80, 220, 255],
        alpha: 0.10,
    },
];

const STREAK_BANDS: u32 = 7;
const STREAK_HEIGHT_PX: f32 = 3.0;
const STREAK_DRIFT_PX: f32 = 12.0;
const STREAK_JITTER_PX: f32 = 14.0;
const STREAK_ALPHA: f32 = 0.35;

/// Place `src` centered on `center`, rotated by `angle` and scaled by `zoom`.
fn centered(src: &WorkingImage, center: Point, zoom: f64, angle: f64) -> Affine {
    Affine::translate((-f64::from(src.width) / 2.0, -f64::from(src.height) / 2.0))
        .then_rotate(angle)
        .then_scale(zoom)
        .then_translate(center.to_vec2())
}

pub(crate) fn render(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion) {
    let i = m.intensity;
    let zoom = f64::from(BASE_ZOOM + i * (ZOOM_SWING * m.sin(1, 0.0) + ZOOM_RIPPLE * m.sin(2, 0.7)))
        .max(MIN_ZOOM);
    let offset = Vec2::new(
        f64::from(m.px(ORBIT_X_PX) * m.sin(1, 0.0) + m.px(WOBBLE_X_PX) * m.sin(3, 1.3)),
        f64::from(m.px(ORBIT_Y_PX) * m.cos(1, 0.0) + m.px(WOBBLE_Y_PX) * m.sin(2, 0.4)),
    );
    let center = Point::new(f64::from(dst.width) / 2.0, f64::from(dst.height) / 2.0);

    draw_image(dst, src, centered(src, center + offset, zoom, 0.0), Paint::normal());

    draw_image(
        dst,
        src,
        centered(src, center - offset * 0.5, zoom * SHADOW_ZOOM, 0.0),
        Paint::normal().with_opacity(SHADOW_ALPHA),
    );

    for echo in &ECHOES {
        let angle = f64::from(echo.spin * i * m.sin(echo.harmonic, echo.phase_offset));
        let swell = f64::from(1.0 + echo.swell * i * m.sin(echo.harmonic, 0.0));
        draw_image(
            dst,
            src,
            centered(
                src,
                center + offset * echo.follow,
                (zoom * swell).max(MIN_ZOOM),
                angle,
            ),
            Paint::normal()
                .with_opacity(echo.alpha)
                .with_tint(echo.tint)
                .additive(),
        );
    }

    draw_streaks(dst, src, m);
}

fn draw_streaks(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion) {
    let band_h = (STREAK_HEIGHT_PX * m.scale).round().max(1.0) as u32;
    if src.height < band_h {
        return;
    }
    let max_y = i64::from(src.height - band_h);
    for j in 0..STREAK_BANDS {
        let jf = j as f32;
        let rest = (jf + 0.5) / STREAK_BANDS as f32 * src.height as f32;
        let y = px_offset(rest + m.px(STREAK_DRIFT_PX) * m.sin(1, jf * 0.9)).clamp(0, max_y);
        let jitter = px_offset(m.px(STREAK_JITTER_PX) * m.sin(4, jf * 1.7));
        blit(
            dst,
            src,
            Region::rows(src, y as u32, band_h),
            jitter,
            0,
            Paint::normal().with_opacity(STREAK_ALPHA),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/orbital.rs"]
mod tests;
