// THEORY:
// Colour-space converters are pure `Raster -> Raster` maps built on the
// single-pixel decompositions in `D1::pixel`. Each returns a fresh raster of the
// same size and never touches its input.
//
// Two of the outputs are not literal RGBA images. They reuse the four channel
// slots to carry another colour model:
// - CMY(K): R, G, B, A slots hold C, M, Y, K, each scaled to 0..255.
// - HSI:    R holds hue in degrees, G holds saturation * 100, B holds
//           intensity * 255, A is opaque.
//
// Hue is written unscaled, so any hue above 255 degrees (blue-magenta through
// red-magenta) saturates at 255 in the byte slot. That precision loss is part of
// the format; callers that need the exact angle should use `Pixel::hsi`.

use crate::core_modules::D1::pixel::pixel::{OPAQUE, Pixel, clamp_channel};
use crate::core_modules::raster::Raster;

/// Rec. 601 greyscale, scaled by `gain` and clamped to [0, 255].
pub fn to_greyscale_brightened(src: &Raster, gain: f64) -> Raster {
    src.map_pixels(|pixel| Pixel::grey(clamp_channel(pixel.luma() * gain)))
}

/// Plain Rec. 601 greyscale.
pub fn to_greyscale(src: &Raster) -> Raster {
    to_greyscale_brightened(src, 1.0)
}

pub fn to_cmyk(src: &Raster) -> Raster {
    src.map_pixels(|pixel| {
        let cmyk = pixel.cmyk();
        Pixel::new(
            clamp_channel(cmyk.cyan * 255.0),
            clamp_channel(cmyk.magenta * 255.0),
            clamp_channel(cmyk.yellow * 255.0),
            clamp_channel(cmyk.key * 255.0),
        )
    })
}

pub fn to_hsi(src: &Raster) -> Raster {
    src.map_pixels(|pixel| {
        let hsi = pixel.hsi();
        Pixel::new(
            clamp_channel(hsi.hue),
            clamp_channel(hsi.saturation * 100.0),
            clamp_channel(hsi.intensity * 255.0),
            OPAQUE,
        )
    })
}
