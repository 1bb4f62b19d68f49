//! Edge darkening shared by every preset.
//!
//! Twenty concentric rounded-rectangle strokes, each a little wider and fainter than the one
//! before, are stroked in black around a rectangle slightly larger than the canvas. The strokes
//! never change for a given canvas, so their combined coverage is baked once into a per-pixel
//! `keep` mask and applied with two multiplies per pixel.

use crate::foundation::core::Canvas;
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;
use rayon::prelude::*;

const STROKES: u32 = 20;
const START_ALPHA: f32 = 120.0 / 255.0;
const BASE_WIDTH_PX: f32 = 40.0;
const WIDTH_STEP_PX: f32 = 4.0;
const RECT_SCALE: f32 = 1.1;
const CORNER_RADIUS_PX: f32 = 80.0;

#[derive(Clone, Copy, Debug)]
struct Stroke {
    alpha: f32,
    half_width: f32,
}

/// Opacity of stroke `i`, fading linearly from `START_ALPHA` on the first stroke to zero on the
/// last.
fn stroke_alpha(i: u32) -> f32 {
    START_ALPHA * (1.0 - i as f32 / (STROKES - 1) as f32)
}

/// Baked vignette for one canvas size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vignette {
    canvas: Canvas,
    keep: Vec<u8>,
}

impl Vignette {
    /// Bake the mask for `canvas`.
    #[tracing::instrument(level = "debug")]
    pub fn new(canvas: Canvas) -> Self {
        let scale = canvas.scale();
        let strokes: Vec<Stroke> = (0..STROKES)
            .map(|i| {
                Stroke {
                    alpha: stroke_alpha(i),
                    half_width: (BASE_WIDTH_PX + WIDTH_STEP_PX * i as f32) * scale / 2.0,
                }
            })
            .collect();

        let (w, h) = (canvas.width as f32, canvas.height as f32);
        let shape = RoundedRect {
            cx: w / 2.0,
            cy: h / 2.0,
            half_w: w * RECT_SCALE / 2.0,
            half_h: h * RECT_SCALE / 2.0,
            radius: CORNER_RADIUS_PX * scale,
        };

        let mut keep = vec![255u8; (canvas.width as usize) * (canvas.height as usize)];
        let stride = canvas.width.max(1) as usize;
        keep.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for (x, k) in row.iter_mut().enumerate() {
                let d = shape.distance(x as f32 + 0.5, py).abs();
                let mut remain = 1.0f32;
                for s in &strokes {
                    let cov = (s.half_width - d + 0.5).clamp(0.0, 1.0);
                    remain *= 1.0 - s.alpha * cov;
                }
                *k = (remain * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        });

        Self { canvas, keep }
    }

    /// Canvas the mask was baked for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Remaining light at `(x, y)`, 255 meaning untouched.
    pub fn keep_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        self.keep
            .get(y as usize * self.canvas.width as usize + x as usize)
            .copied()
    }

    /// Darken `frame` in place. Frames of another size are left untouched.
    pub fn apply(&self, frame: &mut FrameRGBA) {
        if frame.canvas() != self.canvas {
            return;
        }
        for (px, &k) in frame.data.chunks_exact_mut(4).zip(&self.keep) {
            if k == 255 {
                continue;
            }
            let k = u16::from(k);
            px[0] = mul_div255_u8(u16::from(px[0]), k);
            px[1] = mul_div255_u8(u16::from(px[1]), k);
            px[2] = mul_div255_u8(u16::from(px[2]), k);
            px[3] = 255 - mul_div255_u8(u16::from(255 - px[3]), k);
        }
    }
}

/// Signed distance to a centered rounded rectangle; negative inside.
#[derive(Clone, Copy, Debug)]
struct RoundedRect {
    cx: f32,
    cy: f32,
    half_w: f32,
    half_h: f32,
    radius: f32,
}

impl RoundedRect {
    fn distance(&self, x: f32, y: f32) -> f32 {
        let r = self.radius.min(self.half_w).min(self.half_h).max(0.0);
        let qx = (x - self.cx).abs() - (self.half_w - r);
        let qy = (y - self.cy).abs() - (self.half_h - r);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        outside + qx.max(qy).min(0.0) - r
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/vignette.rs"]
mod tests;
