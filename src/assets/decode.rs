use crate::assets::crop::crop_to_canvas;
use crate::assets::working::WorkingImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LoopError, LoopResult};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// Decode encoded image bytes and aspect-fit them to `canvas`.
///
/// Any decode failure (or a zero-sized image) is reported as [`LoopError::Input`].
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_working_image(bytes: &[u8], canvas: Canvas) -> LoopResult<WorkingImage> {
    canvas.validate()?;
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| LoopError::input(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(LoopError::input("image has zero width or height"));
    }
    Ok(crop_to_canvas(&rgba, canvas))
}

/// Read an image file and aspect-fit it to `canvas`.
pub fn load_working_image(path: &Path, canvas: Canvas) -> LoopResult<WorkingImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| LoopError::input(format!("read image '{}': {e}", path.display())))?;
    decode_working_image(&bytes, canvas)
}

/// Decode on a background thread; join the handle to receive the image or the input error.
pub fn spawn_decode(bytes: Vec<u8>, canvas: Canvas) -> JoinHandle<LoopResult<WorkingImage>> {
    std::thread::spawn(move || decode_working_image(&bytes, canvas))
}

/// Background counterpart of [`load_working_image`].
pub fn spawn_load(path: PathBuf, canvas: Canvas) -> JoinHandle<LoopResult<WorkingImage>> {
    std::thread::spawn(move || load_working_image(&path, canvas))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
