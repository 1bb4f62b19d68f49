use crate::assets::working::WorkingImage;
use crate::effects::preset::{Motion, Preset, RenderParams};
use crate::effects::vignette::Vignette;
use crate::effects::{melt, orbital, scanline, slices, warp};
use crate::eval::phase::Phase;
use crate::foundation::core::Canvas;
use crate::render::frame::FrameRGBA;

/// Background shown while no working image is loaded.
pub const PLACEHOLDER_RGBA: [u8; 4] = [10, 10, 10, 255];

/// Knobs that change how a frame is computed but never what it looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderOpts {
    /// Spread the per-pixel warp over the rayon pool.
    pub parallel: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// The dark frame shown before an image is loaded.
pub fn placeholder_frame(canvas: Canvas) -> FrameRGBA {
    FrameRGBA::filled(canvas, PLACEHOLDER_RGBA)
}

/// Reusable scene renderer.
///
/// Owns the destination frame and the vignette mask so repeated renders at the same canvas size
/// do not allocate. `render` takes `&mut self`, so one renderer can never produce two frames at
/// once.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    opts: RenderOpts,
    frame: FrameRGBA,
    vignette: Option<Vignette>,
}

impl SceneRenderer {
    /// Create a renderer with `opts`.
    pub fn new(opts: RenderOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Options this renderer was created with.
    pub fn opts(&self) -> RenderOpts {
        self.opts
    }

    /// Render `image` at `phase` with `params` and apply the vignette.
    ///
    /// The returned frame is overwritten by the next call.
    pub fn render(&mut self, image: &WorkingImage, phase: Phase, params: &RenderParams) -> &FrameRGBA {
        draw_preset(&mut self.frame, image, phase, params, self.opts);

        let canvas = self.frame.canvas();
        if canvas.width > 0 && canvas.height > 0 {
            if self.vignette.as_ref().is_none_or(|v| v.canvas() != canvas) {
                self.vignette = Some(Vignette::new(canvas));
            }
            if let Some(v) = &self.vignette {
                v.apply(&mut self.frame);
            }
        }
        &self.frame
    }
}

/// Render the preset alone, without the vignette.
///
/// With [`Preset::None`] the result is the working image byte for byte.
pub fn render_preset(
    image: &WorkingImage,
    phase: Phase,
    params: &RenderParams,
    opts: RenderOpts,
) -> FrameRGBA {
    let mut frame = FrameRGBA::default();
    draw_preset(&mut frame, image, phase, params, opts);
    frame
}

/// One-off full render: preset followed by the vignette.
///
/// Prefer [`SceneRenderer`] when rendering many frames.
pub fn render_scene(
    image: &WorkingImage,
    phase: Phase,
    params: &RenderParams,
    opts: RenderOpts,
) -> FrameRGBA {
    SceneRenderer::new(opts).render(image, phase, params).clone()
}

fn draw_preset(
    dst: &mut FrameRGBA,
    image: &WorkingImage,
    phase: Phase,
    params: &RenderParams,
    opts: RenderOpts,
) {
    let canvas = image.canvas();
    if params.preset == Preset::None {
        dst.width = canvas.width;
        dst.height = canvas.height;
        dst.premultiplied = true;
        dst.data.clear();
        dst.data.extend_from_slice(image.data());
        return;
    }

    dst.reset(canvas, [0, 0, 0, 255]);
    if image.is_empty() {
        return;
    }
    let m = Motion::new(phase, params, canvas);
    match params.preset {
        Preset::None => {}
        Preset::Orbital => orbital::render(dst, image, &m),
        Preset::SliceSplit => slices::render(dst, image, &m),
        Preset::ColumnWave => melt::render(dst, image, &m),
        Preset::Warp => warp::render(dst, image, &m, opts.parallel),
        Preset::Scanline => scanline::render(dst, image, &m),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
