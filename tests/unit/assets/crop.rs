use super::*;

fn canvas() -> Canvas {
    Canvas::CANONICAL
}

#[test]
fn wide_source_trims_sides_symmetrically() {
    let r = crop_rect_for_aspect(1600, 1600, canvas());
    assert_eq!(r.height, 1600);
    assert_eq!(r.width, 900);
    assert_eq!(r.x, (1600 - 900) / 2);
    assert_eq!(r.y, 0);
}

#[test]
fn tall_source_trims_top_and_bottom() {
    let r = crop_rect_for_aspect(900, 2000, canvas());
    assert_eq!(r.width, 900);
    assert_eq!(r.height, 1600);
    assert_eq!(r.x, 0);
    assert_eq!(r.y, 200);
}

#[test]
fn matching_aspect_is_full_rect() {
    let r = crop_rect_for_aspect(1080, 1920, canvas());
    assert_eq!(
        r,
        CropRect {
            x: 0,
            y: 0,
            width: 1080,
            height: 1920
        }
    );
}

#[test]
fn tiny_sources_never_produce_empty_rects() {
    let r = crop_rect_for_aspect(1, 1, canvas());
    assert!(r.width >= 1 && r.height >= 1);
    assert!(r.width <= 1 && r.height <= 1);
}

#[test]
fn crop_to_canvas_outputs_canvas_size() {
    let src = RgbaImage::from_pixel(300, 100, image::Rgba([10, 20, 30, 255]));
    let out = crop_to_canvas(&src, Canvas::new(36, 64).unwrap());
    assert_eq!((out.width, out.height), (36, 64));
    assert_eq!(out.rgba8_premul.len(), 36 * 64 * 4);
    assert_eq!(out.px(5, 5), [10, 20, 30, 255]);
}

#[test]
fn crop_is_identity_for_canvas_sized_input() {
    let c = Canvas::new(36, 64).unwrap();
    let src = RgbaImage::from_fn(c.width, c.height, |x, y| {
        image::Rgba([(x * 7) as u8, (y * 3) as u8, ((x + y) * 2) as u8, 255])
    });
    let out = crop_to_canvas(&src, c);
    assert_eq!(out.rgba8_premul.as_slice(), src.as_raw().as_slice());
}
