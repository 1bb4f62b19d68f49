use super::*;
use crate::foundation::core::Canvas;

fn gradient(w: u32, h: u32) -> WorkingImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 77, 255]);
        }
    }
    WorkingImage::from_premul(w, h, data).unwrap()
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn add_saturates_and_keeps_alpha_opaque() {
    let dst = [200, 10, 0, 255];
    let src = [100, 100, 100, 255];
    assert_eq!(add(dst, src, 1.0), [255, 110, 100, 255]);
    assert_eq!(add(dst, src, 0.0), dst);
}

#[test]
fn tint_scales_color_only() {
    assert_eq!(tint([200, 100, 50, 200], [255, 0, 128]), [200, 0, 25, 200]);
}

#[test]
fn identity_draw_reproduces_source() {
    let src = gradient(6, 4);
    let mut dst = FrameRGBA::black(Canvas {
        width: 6,
        height: 4,
    });
    draw_image(&mut dst, &src, Affine::IDENTITY, Paint::normal());
    assert_eq!(dst.data.as_slice(), src.data());
}

#[test]
fn degenerate_transform_draws_nothing() {
    let src = gradient(6, 4);
    let canvas = Canvas {
        width: 6,
        height: 4,
    };
    let mut dst = FrameRGBA::black(canvas);
    draw_image(&mut dst, &src, Affine::scale(0.0), Paint::normal());
    assert_eq!(dst, FrameRGBA::black(canvas));
}

#[test]
fn translated_draw_leaves_uncovered_pixels() {
    let src = gradient(6, 4);
    let mut dst = FrameRGBA::black(Canvas {
        width: 6,
        height: 4,
    });
    draw_image(
        &mut dst,
        &src,
        Affine::translate((2.0, 0.0)),
        Paint::normal(),
    );
    assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(dst.pixel(2, 1), Some(src.px(0, 1)));
}

#[test]
fn blit_clips_huge_offsets_without_panicking() {
    let src = gradient(6, 4);
    let canvas = Canvas {
        width: 6,
        height: 4,
    };
    let mut dst = FrameRGBA::black(canvas);
    blit(&mut dst, &src, Region::full(&src), i64::MAX, 0, Paint::normal());
    blit(&mut dst, &src, Region::full(&src), 0, i64::MIN, Paint::normal());
    assert_eq!(dst, FrameRGBA::black(canvas));
}

#[test]
fn blit_shifts_a_row_band() {
    let src = gradient(6, 4);
    let mut dst = FrameRGBA::black(Canvas {
        width: 6,
        height: 4,
    });
    blit(&mut dst, &src, Region::rows(&src, 1, 1), -2, 0, Paint::normal());
    assert_eq!(dst.pixel(0, 1), Some(src.px(2, 1)));
    assert_eq!(dst.pixel(5, 1), Some([0, 0, 0, 255]));
    assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn fill_row_darkens_with_opacity() {
    let mut dst = FrameRGBA::filled(
        Canvas {
            width: 2,
            height: 2,
        },
        [200, 200, 200, 255],
    );
    fill_row(&mut dst, 1, [0, 0, 0, 255], Paint::normal().with_opacity(0.5));
    assert_eq!(dst.pixel(0, 0), Some([200, 200, 200, 255]));
    assert_eq!(dst.pixel(0, 1), Some([100, 100, 100, 255]));
}
