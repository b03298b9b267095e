use crate::foundation::error::{FxError, FxResult};

/// Number of interleaved channels in every [`PixelBuffer`].
pub const CHANNELS: usize = 3;

/// Owned 8-bit, 3-channel frame in **B, G, R** order, tightly packed, row-major.
///
/// `data.len() == width * height * 3` always holds; constructors reject anything else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a black frame.
    pub fn new(width: u32, height: u32) -> FxResult<Self> {
        Self::filled(width, height, [0, 0, 0])
    }

    /// Allocate a frame where every pixel is `bgr`.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> FxResult<Self> {
        let len = checked_len(width, height)?;
        let data = bgr.repeat(len / CHANNELS);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw BGR bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FxResult<Self> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(FxError::validation(format!(
                "pixel buffer of {width}x{height} expects {len} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert from an `image` RGB buffer (channels are swapped to BGR).
    pub fn from_rgb_image(img: &image::RgbImage) -> FxResult<Self> {
        let (width, height) = img.dimensions();
        let mut data = img.as_raw().clone();
        swap_red_blue(&mut data);
        Self::from_raw(width, height, data)
    }

    /// Convert into an `image` RGB buffer (channels are swapped back to RGB).
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut data = self.data.clone();
        swap_red_blue(&mut data);
        image::RgbImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// BGR triple at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&bgr);
    }

    /// Full-frame rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) outside {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

fn checked_len(width: u32, height: u32) -> FxResult<usize> {
    if width == 0 || height == 0 {
        return Err(FxError::validation(format!(
            "pixel buffer dimensions must be > 0, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| FxError::validation("pixel buffer size overflow"))
}

fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
}

/// Integer rectangle in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Floating-point color in B, G, R order; used for block and tile averages.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bgr {
    pub b: f64,
    pub g: f64,
    pub r: f64,
}

impl Bgr {
    pub const fn new(b: f64, g: f64, r: f64) -> Self {
        Self { b, g, r }
    }

    pub fn from_bytes(px: [u8; 3]) -> Self {
        Self::new(f64::from(px[0]), f64::from(px[1]), f64::from(px[2]))
    }

    /// Saturating conversion to bytes, rounding half to even.
    pub fn to_bytes(self) -> [u8; 3] {
        fn to_u8(v: f64) -> u8 {
            v.round_ties_even().clamp(0.0, 255.0) as u8
        }
        [to_u8(self.b), to_u8(self.g), to_u8(self.r)]
    }

    /// Squared Euclidean distance in B, G, R space.
    pub fn distance_sq(self, other: Bgr) -> f64 {
        let db = self.b - other.b;
        let dg = self.g - other.g;
        let dr = self.r - other.r;
        db * db + dg * dg + dr * dr
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
