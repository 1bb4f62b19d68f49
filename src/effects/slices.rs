//! Glitch slices: the frame is cut into horizontal strips, each pushed sideways by its own
//! phase-shifted sine.

use crate::assets::working::WorkingImage;
use crate::effects::composite::{Paint, Region, blit};
use crate::effects::preset::{Motion, band_bounds};
use crate::foundation::math::px_offset;
use crate::render::frame::FrameRGBA;

const STRIPS: u32 = 28;
const MAX_SHIFT_PX: f32 = 80.0;
/// Phase offset between neighbouring strips.
const STRIP_SPREAD: f32 = 0.4;
const RECOMPOSE_ALPHA: f32 = 30.0 / 255.0;

pub(crate) fn render(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion) {
    for i in 0..STRIPS {
        let (y0, y1) = band_bounds(i, STRIPS, src.height);
        if y0 >= y1 {
            continue;
        }
        let shift = px_offset(m.sin(2, i as f32 * STRIP_SPREAD) * m.px(MAX_SHIFT_PX));
        blit(
            dst,
            src,
            Region::rows(src, y0, y1 - y0),
            shift,
            0,
            Paint::normal(),
        );
    }

    // Low-alpha copy of the untouched image softens the strip edges.
    blit(
        dst,
        src,
        Region::full(src),
        0,
        0,
        Paint::normal().with_opacity(RECOMPOSE_ALPHA),
    );
}

#[cfg(test)]
#[path = "../../tests/unit/effects/slices.rs"]
mod tests;
