use crate::foundation::core::Canvas;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag is included to make this explicit
/// at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl Default for FrameRGBA {
    /// An empty 0x0 frame.
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            premultiplied: true,
        }
    }
}

impl FrameRGBA {
    /// A frame filled with one premultiplied color.
    pub fn filled(canvas: Canvas, rgba_premul: [u8; 4]) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: rgba_premul.repeat((canvas.width as usize) * (canvas.height as usize)),
            premultiplied: true,
        }
    }

    /// Opaque black, the background every preset draws onto.
    pub fn black(canvas: Canvas) -> Self {
        Self::filled(canvas, [0, 0, 0, 255])
    }

    /// Reset to `rgba_premul` at `canvas` size, reusing the allocation.
    pub(crate) fn reset(&mut self, canvas: Canvas, rgba_premul: [u8; 4]) {
        self.width = canvas.width;
        self.height = canvas.height;
        self.premultiplied = true;
        self.data.clear();
        self.data
            .extend(rgba_premul.repeat((canvas.width as usize) * (canvas.height as usize)));
    }

    /// Canvas with this frame's dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Mean absolute per-channel difference against another frame of the same size.
    pub fn mean_abs_diff(&self, other: &FrameRGBA) -> Option<f64> {
        if self.width != other.width || self.height != other.height || self.data.is_empty() {
            return None;
        }
        let sum: u64 = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| u64::from(a.abs_diff(*b)))
            .sum();
        Some(sum as f64 / self.data.len() as f64)
    }

    /// Convert to a straight-alpha `image` buffer for encoders and PNG output.
    pub fn to_straight_rgba_image(&self) -> Option<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            crate::assets::working::unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
    }
}
