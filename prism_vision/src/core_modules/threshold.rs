// THEORY:
// Luma segmentation binarizes any raster against a single threshold: pixels whose
// Rec. 601 luma is strictly above it turn white, everything else turns black. It
// does not care what the channel slots mean, which is what lets it run on the
// repurposed CMY(K) and HSI rasters as well as on plain RGB.
//
// The per-channel segmenter in `channel` uses the opposite comparison at the
// boundary (`value >= threshold` is bright). Both are kept as-is.

use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::raster::Raster;

/// A slider value in [0, 255].
pub type ThresholdParameter = u8;

const WHITE: Pixel = Pixel::grey(255);
const BLACK: Pixel = Pixel::grey(0);

/// One threshold per segmentation axis, owned by the UI and read by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ThresholdSet {
    pub red: ThresholdParameter,
    pub green: ThresholdParameter,
    pub blue: ThresholdParameter,
    /// Applied to the CMY(K) raster.
    pub cmyk: ThresholdParameter,
    /// Applied to the HSI raster.
    pub hsi: ThresholdParameter,
}

/// White where luma > threshold, black elsewhere. Alpha is always opaque.
pub fn segment_by_luma(src: &Raster, threshold: ThresholdParameter) -> Raster {
    let threshold = threshold as f64;
    src.map_pixels(|pixel| if pixel.luma() > threshold { WHITE } else { BLACK })
}
