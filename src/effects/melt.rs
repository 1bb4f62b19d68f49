//! Wave melt: narrow columns slide up and down on a travelling sine, then a warm additive copy
//! of the image adds glow.

use crate::assets::working::WorkingImage;
use crate::effects::composite::{Paint, Region, blit};
use crate::effects::preset::{Motion, band_bounds};
use crate::foundation::math::px_offset;
use crate::render::frame::FrameRGBA;

const COLUMNS: u32 = 90;
const MAX_OFFSET_PX: f32 = 60.0;
const COLUMN_SPREAD: f32 = 0.25;
const GLOW_ALPHA: f32 = 40.0 / 255.0;
const GLOW_TINT: [u8; 3] = [255, 236, 220];

pub(crate) fn render(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion) {
    for i in 0..COLUMNS {
        let (x0, x1) = band_bounds(i, COLUMNS, src.width);
        if x0 >= x1 {
            continue;
        }
        let offset = px_offset(m.sin(2, i as f32 * COLUMN_SPREAD) * m.px(MAX_OFFSET_PX));
        blit(
            dst,
            src,
            Region::cols(src, x0, x1 - x0),
            0,
            offset,
            Paint::normal(),
        );
    }

    blit(
        dst,
        src,
        Region::full(src),
        0,
        0,
        Paint::normal()
            .with_opacity(GLOW_ALPHA)
            .with_tint(GLOW_TINT)
            .additive(),
    );
}

#[cfg(test)]
#[path = "../../tests/unit/effects/melt.rs"]
mod tests;
