use crate::assets::working::{WorkingImage, premultiply_rgba8_in_place};
use crate::foundation::core::Canvas;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Source-space rectangle selected by the aspect-fit crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Width in source pixels.
    pub width: u32,
    /// Height in source pixels.
    pub height: u32,
}

/// Center-crop `src_w x src_h` to the canvas aspect ratio.
///
/// Only the longer dimension (relative to the target ratio) is trimmed, symmetrically; the
/// rectangle never exceeds the source. An image already at the target ratio yields the full
/// source rectangle.
pub fn crop_rect_for_aspect(src_w: u32, src_h: u32, canvas: Canvas) -> CropRect {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (cw, ch) = (u64::from(canvas.width.max(1)), u64::from(canvas.height.max(1)));

    if sw * ch > sh * cw {
        // Too wide: keep full height, trim the sides.
        let width = ((sh * cw + ch / 2) / ch).clamp(1, sw.max(1)) as u32;
        CropRect {
            x: (src_w - width.min(src_w)) / 2,
            y: 0,
            width,
            height: src_h,
        }
    } else {
        // Too tall (or exact): keep full width, trim top/bottom.
        let height = ((sw * ch + cw / 2) / cw).clamp(1, sh.max(1)) as u32;
        CropRect {
            x: 0,
            y: (src_h - height.min(src_h)) / 2,
            width: src_w,
            height,
        }
    }
}

/// Crop `src` to the canvas aspect ratio and resample it to exactly the canvas size.
///
/// When the crop already has the canvas dimensions no resampling happens, so an image that
/// matches the canvas passes through unchanged.
pub fn crop_to_canvas(src: &RgbaImage, canvas: Canvas) -> WorkingImage {
    let (src_w, src_h) = src.dimensions();
    let rect = crop_rect_for_aspect(src_w, src_h, canvas);

    let cropped = if rect.x == 0 && rect.y == 0 && rect.width == src_w && rect.height == src_h {
        src.clone()
    } else {
        imageops::crop_imm(src, rect.x, rect.y, rect.width, rect.height).to_image()
    };

    let fitted = if cropped.dimensions() == (canvas.width, canvas.height) {
        cropped
    } else {
        imageops::resize(&cropped, canvas.width, canvas.height, FilterType::Triangle)
    };

    let mut data = fitted.into_raw();
    premultiply_rgba8_in_place(&mut data);
    WorkingImage {
        width: canvas.width,
        height: canvas.height,
        rgba8_premul: std::sync::Arc::new(data),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/crop.rs"]
mod tests;
