//! Premultiplied RGBA8 compositing primitives.
//!
//! Every draw call takes its transform and [`Paint`] as arguments; there is no shared drawing
//! state between calls.

use crate::assets::working::WorkingImage;
use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::render::frame::FrameRGBA;
use kurbo::{Affine, Point, Rect};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a source pixel combines with the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Additive color, source-over alpha.
    Add,
}

/// Per-draw compositing description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Global opacity in `[0, 1]`.
    pub opacity: f32,
    /// Multiplicative color tint (255 = unchanged).
    pub tint: [u8; 3],
    /// Blend mode.
    pub blend: BlendMode,
}

impl Paint {
    /// Opaque, untinted source-over.
    pub const fn normal() -> Self {
        Self {
            opacity: 1.0,
            tint: [255, 255, 255],
            blend: BlendMode::Normal,
        }
    }

    /// Replace the opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Replace the tint.
    pub fn with_tint(mut self, tint: [u8; 3]) -> Self {
        self.tint = tint;
        self
    }

    /// Switch to [`BlendMode::Add`].
    pub fn additive(mut self) -> Self {
        self.blend = BlendMode::Add;
        self
    }

    fn resolve(self) -> ResolvedPaint {
        ResolvedPaint {
            op: unit_to_u8(self.opacity),
            tint: self.tint,
            tinted: self.tint != [255, 255, 255],
            blend: self.blend,
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Clone, Copy, Debug)]
struct ResolvedPaint {
    op: u16,
    tint: [u8; 3],
    tinted: bool,
    blend: BlendMode,
}

impl ResolvedPaint {
    #[inline]
    fn apply(&self, dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
        let src = if self.tinted { tint(src, self.tint) } else { src };
        match self.blend {
            BlendMode::Normal => over_op(dst, src, self.op),
            BlendMode::Add => add_op(dst, src, self.op),
        }
    }
}

/// Source-over with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    over_op(dst, src, unit_to_u8(opacity))
}

/// Additive blend: color channels add (saturating), alpha composes like source-over.
pub fn add(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    add_op(dst, src, unit_to_u8(opacity))
}

/// Multiply color channels by `tint / 255`. Alpha is unchanged, so premultiplication holds.
pub fn tint(src: PremulRgba8, tint: [u8; 3]) -> PremulRgba8 {
    [
        mul_div255_u8(u16::from(src[0]), u16::from(tint[0])),
        mul_div255_u8(u16::from(src[1]), u16::from(tint[1])),
        mul_div255_u8(u16::from(src[2]), u16::from(tint[2])),
        src[3],
    ]
}

#[inline]
fn over_op(dst: PremulRgba8, src: PremulRgba8, op: u16) -> PremulRgba8 {
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

#[inline]
fn add_op(dst: PremulRgba8, src: PremulRgba8, op: u16) -> PremulRgba8 {
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u8(u16::from(src[3]), op);
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        out[i] = dst[i].saturating_add(mul_div255_u8(u16::from(src[i]), op));
    }
    out
}

/// Bilinear sample at continuous pixel-space coordinates; `None` outside the image.
///
/// Pixel centers sit at `i + 0.5`. Neighbours past the border clamp to the edge.
pub(crate) fn sample_bilinear(img: &WorkingImage, u: f64, v: f64) -> Option<PremulRgba8> {
    let (w, h) = (f64::from(img.width), f64::from(img.height));
    if !(u >= 0.0 && v >= 0.0 && u < w && v < h) {
        return None;
    }
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0f = fx.floor();
    let y0f = fy.floor();
    let wx = ((fx - x0f) * 256.0).round() as u32;
    let wy = ((fy - y0f) * 256.0).round() as u32;

    let max_x = img.width as i64 - 1;
    let max_y = img.height as i64 - 1;
    let x0 = (x0f as i64).clamp(0, max_x) as usize;
    let y0 = (y0f as i64).clamp(0, max_y) as usize;
    let x1 = (x0f as i64 + 1).clamp(0, max_x) as usize;
    let y1 = (y0f as i64 + 1).clamp(0, max_y) as usize;

    let p00 = img.px(x0, y0);
    let p10 = img.px(x1, y0);
    let p01 = img.px(x0, y1);
    let p11 = img.px(x1, y1);

    let w00 = (256 - wx) * (256 - wy);
    let w10 = wx * (256 - wy);
    let w01 = (256 - wx) * wy;
    let w11 = wx * wy;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let acc = u32::from(p00[i]) * w00
            + u32::from(p10[i]) * w10
            + u32::from(p01[i]) * w01
            + u32::from(p11[i]) * w11;
        out[i] = ((acc + 32768) >> 16).min(255) as u8;
    }
    Some(out)
}

/// Draw `src` through `transform` (source pixel space -> frame space).
///
/// Degenerate or non-finite transforms draw nothing.
pub fn draw_image(dst: &mut FrameRGBA, src: &WorkingImage, transform: Affine, paint: Paint) {
    if src.is_empty() || dst.width == 0 || dst.height == 0 {
        return;
    }
    let det = transform.determinant();
    if !det.is_finite() || det.abs() < 1e-9 {
        return;
    }
    let inv = transform.inverse();
    let bbox = transform.transform_rect_bbox(Rect::new(
        0.0,
        0.0,
        f64::from(src.width),
        f64::from(src.height),
    ));
    if ![bbox.x0, bbox.y0, bbox.x1, bbox.y1]
        .iter()
        .all(|v| v.is_finite())
    {
        return;
    }

    let x0 = bbox.x0.floor().clamp(0.0, f64::from(dst.width)) as u32;
    let x1 = bbox.x1.ceil().clamp(0.0, f64::from(dst.width)) as u32;
    let y0 = bbox.y0.floor().clamp(0.0, f64::from(dst.height)) as u32;
    let y1 = bbox.y1.ceil().clamp(0.0, f64::from(dst.height)) as u32;

    let paint = paint.resolve();
    if paint.op == 0 {
        return;
    }
    let stride = dst.width as usize * 4;
    for y in y0..y1 {
        let row = &mut dst.data[y as usize * stride..(y as usize + 1) * stride];
        for x in x0..x1 {
            let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let Some(s) = sample_bilinear(src, p.x, p.y) else {
                continue;
            };
            let i = x as usize * 4;
            let d = [row[i], row[i + 1], row[i + 2], row[i + 3]];
            row[i..i + 4].copy_from_slice(&paint.apply(d, s));
        }
    }
}

/// Axis-aligned rectangle in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// The whole image.
    pub fn full(img: &WorkingImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: img.width,
            height: img.height,
        }
    }

    /// Full-width band of `height` rows starting at `y`.
    pub fn rows(img: &WorkingImage, y: u32, height: u32) -> Self {
        Self {
            x: 0,
            y,
            width: img.width,
            height,
        }
    }

    /// Full-height band of `width` columns starting at `x`.
    pub fn cols(img: &WorkingImage, x: u32, width: u32) -> Self {
        Self {
            x,
            y: 0,
            width,
            height: img.height,
        }
    }
}

/// Copy `region` of `src` into `dst` displaced by `(dx, dy)` whole pixels, clipped to both.
pub fn blit(dst: &mut FrameRGBA, src: &WorkingImage, region: Region, dx: i64, dy: i64, paint: Paint) {
    let paint = paint.resolve();
    if paint.op == 0 || src.is_empty() {
        return;
    }
    // Clip the region to the source.
    let rx0 = i64::from(region.x.min(src.width));
    let ry0 = i64::from(region.y.min(src.height));
    let rx1 = (i64::from(region.x) + i64::from(region.width)).min(i64::from(src.width));
    let ry1 = (i64::from(region.y) + i64::from(region.height)).min(i64::from(src.height));

    // Then to the destination.
    let (dw, dh) = (i64::from(dst.width), i64::from(dst.height));
    let sx0 = rx0.max(0i64.saturating_sub(dx));
    let sx1 = rx1.min(dw.saturating_sub(dx));
    let sy0 = ry0.max(0i64.saturating_sub(dy));
    let sy1 = ry1.min(dh.saturating_sub(dy));
    if sx0 >= sx1 || sy0 >= sy1 {
        return;
    }

    let stride = dst.width as usize * 4;
    for sy in sy0..sy1 {
        let ty = (sy + dy) as usize;
        let row = &mut dst.data[ty * stride..(ty + 1) * stride];
        for sx in sx0..sx1 {
            let tx = (sx + dx) as usize;
            let s = src.px(sx as usize, sy as usize);
            let i = tx * 4;
            let d = [row[i], row[i + 1], row[i + 2], row[i + 3]];
            row[i..i + 4].copy_from_slice(&paint.apply(d, s));
        }
    }
}

/// Composite a solid premultiplied color over row `y`.
pub fn fill_row(dst: &mut FrameRGBA, y: u32, color: PremulRgba8, paint: Paint) {
    if y >= dst.height {
        return;
    }
    let paint = paint.resolve();
    let stride = dst.width as usize * 4;
    let row = &mut dst.data[y as usize * stride..(y as usize + 1) * stride];
    for d in row.chunks_exact_mut(4) {
        let out = paint.apply([d[0], d[1], d[2], d[3]], color);
        d.copy_from_slice(&out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
