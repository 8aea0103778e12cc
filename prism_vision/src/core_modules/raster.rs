// THEORY:
// The `Raster` is the unit of image data every operator consumes and produces: a
// fixed-format, interleaved RGBA8 buffer with its width and height. It wraps an
// `image::RgbaImage`, which already guarantees the one invariant we care about
// (buffer length == width * height * 4), and adds the handful of region helpers
// the face and pixelation stages need.
//
// Key architectural principles:
// 1.  **Fresh Output**: Operators never mutate their input. Each builds a new
//     `Raster` (usually through `map_pixels`) and hands ownership to the caller.
// 2.  **Clamped Geometry**: Regions that hang off the edge are clipped to the raster
//     extent, and regions that miss it entirely are skipped. No caller has to
//     bounds-check before cropping or pasting.
// 3.  **Clamped Channels**: Float writes go through `clamp_channel`, so no
//     out-of-range value can reach the buffer.

use crate::core_modules::D1::pixel::pixel::{CHANNELS, Channel, Pixel, clamp_channel};
use crate::error::{Result, VisionError};
use image::{Rgba, RgbaImage};

/// An axis-aligned rectangle in raster coordinates. The origin may be negative or
/// past the far edge; use `Raster::clip` to bring it inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x as i64 && x < self.right() && y >= self.y as i64 && y < self.bottom()
    }
}

/// A fixed-format RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Opaque black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Pixel::opaque(0, 0, 0))
    }

    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(pixel.to_bytes())),
        }
    }

    /// Adopts a raw interleaved RGBA buffer, rejecting it if the length does not
    /// match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        let actual = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|image| Self { image })
            .ok_or(VisionError::DimensionMismatch { width, height, expected, actual })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        self.image.get_pixel_checked(x, y).map(|p| Pixel::from(p.0))
    }

    /// Writes a pixel; coordinates outside the raster are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if let Some(slot) = self.image.get_pixel_mut_checked(x, y) {
            *slot = Rgba(pixel.to_bytes());
        }
    }

    /// Writes four float channels, each rounded and clamped to [0, 255].
    pub fn write_channels(&mut self, x: u32, y: u32, channels: [f64; CHANNELS]) {
        let bytes: [Channel; CHANNELS] = channels.map(clamp_channel);
        self.set_pixel(x, y, Pixel::from(bytes));
    }

    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.image.pixels().map(|p| Pixel::from(p.0))
    }

    /// Builds a new raster of the same size by mapping every pixel.
    pub fn map_pixels<F>(&self, mut f: F) -> Raster
    where
        F: FnMut(Pixel) -> Pixel,
    {
        let mut image = self.image.clone();
        for slot in image.pixels_mut() {
            *slot = Rgba(f(Pixel::from(slot.0)).to_bytes());
        }
        Raster { image }
    }

    /// Intersects a region with the raster extent. `None` when nothing overlaps.
    pub fn clip(&self, region: Region) -> Option<Region> {
        let left = (region.x as i64).max(0);
        let top = (region.y as i64).max(0);
        let right = region.right().min(self.width() as i64);
        let bottom = region.bottom().min(self.height() as i64);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Region::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// Copies out the part of `region` that lies inside the raster.
    pub fn crop(&self, region: Region) -> Option<Raster> {
        let clipped = self.clip(region)?;
        let view = image::imageops::crop_imm(
            &self.image,
            clipped.x as u32,
            clipped.y as u32,
            clipped.width,
            clipped.height,
        );
        Some(Raster { image: view.to_image() })
    }

    /// Overwrites pixels with `patch`, top-left at (x, y). Anything that falls
    /// outside the raster is dropped.
    pub fn paste(&mut self, patch: &Raster, x: i32, y: i32) {
        image::imageops::replace(&mut self.image, &patch.image, x as i64, y as i64);
    }
}
