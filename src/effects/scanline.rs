//! Scanline glitch: bands of rows slide vertically, every row jitters sideways, a red/cyan
//! channel split drifts over the top and odd rows are darkened like a CRT raster.

use crate::assets::working::WorkingImage;
use crate::effects::composite::{Paint, Region, blit, fill_row};
use crate::effects::preset::Motion;
use crate::foundation::math::px_offset;
use crate::render::frame::FrameRGBA;

const BAND_PX: f32 = 12.0;
const BAND_SHIFT_PX: f32 = 14.0;
const BAND_SPREAD: f32 = 0.35;
const ROW_JITTER_PX: f32 = 4.0;
const ROW_SPREAD: f32 = 0.9;

const SPLIT_X_PX: f32 = 6.0;
const SPLIT_Y_PX: f32 = 2.0;
const SPLIT_ALPHA: f32 = 0.22;
const SPLIT_RED: [u8; 3] = [255, 40, 40];
const SPLIT_CYAN: [u8; 3] = [40, 255, 255];

const RASTER_ALPHA: f32 = 0.28;
const RASTER: [u8; 4] = [0, 0, 0, 255];

/// Height of one displaced band in rows; never zero.
pub(crate) fn band_height(scale: f32) -> u32 {
    let h = (BAND_PX * scale).round();
    if h.is_finite() && h >= 1.0 { h as u32 } else { 1 }
}

pub(crate) fn render(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion) {
    let band_h = band_height(m.scale);
    for y in 0..src.height {
        let band = y / band_h;
        let dy = px_offset(m.sin(2, band as f32 * BAND_SPREAD) * m.px(BAND_SHIFT_PX));
        let dx = px_offset(m.sin(3, y as f32 * ROW_SPREAD) * m.px(ROW_JITTER_PX));
        blit(dst, src, Region::rows(src, y, 1), dx, dy, Paint::normal());
    }

    let sx = px_offset(m.px(SPLIT_X_PX) * m.sin(1, 0.0));
    let sy = px_offset(m.px(SPLIT_Y_PX) * m.cos(2, 0.0));
    let split = Paint::normal().with_opacity(SPLIT_ALPHA).additive();
    blit(dst, src, Region::full(src), sx, sy, split.with_tint(SPLIT_RED));
    blit(
        dst,
        src,
        Region::full(src),
        sx.saturating_neg(),
        sy.saturating_neg(),
        split.with_tint(SPLIT_CYAN),
    );

    let raster = Paint::normal().with_opacity(RASTER_ALPHA);
    for y in (1..dst.height).step_by(2) {
        fill_row(dst, y, RASTER, raster);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/scanline.rs"]
mod tests;
