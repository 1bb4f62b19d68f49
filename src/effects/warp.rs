//! Dense radial/twist warp.
//!
//! Every destination pixel `(x, y)` is displaced by the sum of
//!
//! 1. two sinusoidal ripples over `x`, `y` and phase,
//! 2. a radial ring term that pushes pixels along their direction from the canvas center,
//! 3. a twist that rotates the pixel's polar angle around the center, damped by
//!    [`TWIST_DAMPING`] toward the undisplaced position,
//!
//! and then sampled from the source with toroidal wraparound, so every destination pixel is
//! written. Rows are independent; with `parallel` they are processed on the rayon pool, each
//! worker owning a disjoint row of the destination.

use crate::assets::working::WorkingImage;
use crate::effects::preset::Motion;
use crate::foundation::math::wrap_coord;
use crate::render::frame::FrameRGBA;
use rayon::prelude::*;
use std::f32::consts::TAU;

const RIPPLE_PX: f32 = 18.0;
const RING_PX: f32 = 14.0;
const RING_COUNT: f32 = 4.0;
const TWIST_RADIANS: f32 = 0.9;
pub(crate) const TWIST_DAMPING: f32 = 0.3;

/// Per-frame constants of the displacement field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WarpField {
    w: f32,
    h: f32,
    cx: f32,
    cy: f32,
    inv_max_r: f32,
    t: f32,
    ripple: f32,
    ring: f32,
    twist: f32,
}

impl WarpField {
    pub(crate) fn new(m: &Motion, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let (cx, cy) = (w / 2.0, h / 2.0);
        Self {
            w,
            h,
            cx,
            cy,
            inv_max_r: 1.0 / (cx * cx + cy * cy).sqrt().max(1.0),
            t: m.t,
            ripple: m.px(RIPPLE_PX),
            ring: m.px(RING_PX),
            twist: TWIST_RADIANS * m.intensity * m.sin(1, 0.0),
        }
    }

    /// Displacement `(dx, dy)` for the destination pixel at `(x, y)`. Always finite.
    #[inline]
    pub(crate) fn displacement(&self, x: f32, y: f32) -> (f32, f32) {
        let t = self.t;
        let nx = x / self.w;
        let ny = y / self.h;

        let mut dx = self.ripple
            * ((ny * TAU * 3.0 + t).sin() + 0.5 * ((nx + ny) * TAU * 2.0 - 2.0 * t).sin());
        let mut dy = self.ripple
            * ((nx * TAU * 2.0 + t).cos() + 0.5 * ((nx - ny) * TAU * 3.0 + 3.0 * t).sin());

        let vx = x - self.cx;
        let vy = y - self.cy;
        let r = (vx * vx + vy * vy).sqrt();
        let rn = r * self.inv_max_r;
        if r > 1e-3 {
            let ring = self.ring * (rn * TAU * RING_COUNT - 2.0 * t).sin();
            dx += ring * vx / r;
            dy += ring * vy / r;
        }

        let falloff = (1.0 - rn).max(0.0);
        let (s, c) = (self.twist * falloff * falloff).sin_cos();
        dx += TWIST_DAMPING * (vx * c - vy * s - vx);
        dy += TWIST_DAMPING * (vx * s + vy * c - vy);

        (
            if dx.is_finite() { dx } else { 0.0 },
            if dy.is_finite() { dy } else { 0.0 },
        )
    }
}

pub(crate) fn render(dst: &mut FrameRGBA, src: &WorkingImage, m: &Motion, parallel: bool) {
    if src.is_empty() || dst.width != src.width || dst.height != src.height {
        return;
    }
    let field = WarpField::new(m, src.width, src.height);
    let stride = src.width as usize * 4;

    if parallel {
        dst.data
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| warp_row(&field, src, y, row));
    } else {
        dst.data
            .chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| warp_row(&field, src, y, row));
    }
}

fn warp_row(field: &WarpField, src: &WorkingImage, y: usize, row: &mut [u8]) {
    let yf = y as f32;
    for (x, out) in row.chunks_exact_mut(4).enumerate() {
        let xf = x as f32;
        let (dx, dy) = field.displacement(xf, yf);
        let sx = wrap_coord(xf + dx, src.width);
        let sy = wrap_coord(yf + dy, src.height);
        out.copy_from_slice(&src.px(sx, sy));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/warp.rs"]
mod tests;
