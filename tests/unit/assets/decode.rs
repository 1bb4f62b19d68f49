use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decodes_and_fits_png() {
    let bytes = png_bytes(90, 40, [200, 100, 50, 255]);
    let img = decode_working_image(&bytes, Canvas::new(36, 64).unwrap()).unwrap();
    assert_eq!((img.width, img.height), (36, 64));
    assert_eq!(img.px(0, 0), [200, 100, 50, 255]);
}

#[test]
fn premultiplies_translucent_pixels() {
    let bytes = png_bytes(36, 64, [255, 0, 0, 128]);
    let img = decode_working_image(&bytes, Canvas::new(36, 64).unwrap()).unwrap();
    assert_eq!(img.px(3, 3), [128, 0, 0, 128]);
}

#[test]
fn garbage_is_an_input_error() {
    let err = decode_working_image(b"definitely not an image", Canvas::CANONICAL).unwrap_err();
    assert!(matches!(err, LoopError::Input(_)));
}

#[test]
fn spawn_decode_reports_errors_through_the_handle() {
    let handle = spawn_decode(vec![0, 1, 2, 3], Canvas::CANONICAL);
    let res = handle.join().unwrap();
    assert!(matches!(res, Err(LoopError::Input(_))));
}

#[test]
fn spawn_load_reads_and_fits_a_file() {
    let dir = Path::new("target").join("decode-tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("wide.png");
    std::fs::write(&path, png_bytes(90, 40, [10, 220, 30, 255])).unwrap();

    let img = spawn_load(path, Canvas::new(36, 64).unwrap()).join().unwrap().unwrap();
    assert_eq!((img.width, img.height), (36, 64));
    assert_eq!(img.px(35, 63), [10, 220, 30, 255]);
}

#[test]
fn spawn_load_reports_a_missing_file_as_input_error() {
    let path = Path::new("target").join("decode-tests").join("missing.png");
    let res = spawn_load(path, Canvas::CANONICAL).join().unwrap();
    match res {
        Err(LoopError::Input(msg)) => assert!(msg.contains("missing.png"), "{msg}"),
        other => panic!("expected input error, got {other:?}"),
    }
}
