// THEORY:
// The face-region filter dispatcher applies exactly one face operator, chosen by
// `FilterMode`, to every confidently detected face. The detector is a black box;
// all we see are `FaceBox`es in capture-frame coordinates with a merge-count
// confidence score.
//
// Key architectural principles:
// 1.  **One Mode At A Time**: `FilterMode` is a single enum value, so two filters
//     can never be active together. Mode changes go through `FilterMode::toggled`:
//     - None + toggle(M)  -> M
//     - M    + toggle(M)  -> None
//     - A    + toggle(B)  -> A   (must pass through None to switch)
// 2.  **Confidence Gate**: Faces whose score is not strictly above the configured
//     threshold are treated as false positives and never filtered or drawn.
// 3.  **Crop, Filter, Paste**: Each face box is clipped to the frame, cropped,
//     filtered as an independent raster, and pasted back at the same place on a
//     fresh copy of the frame. Boxes that miss the frame are skipped.

use crate::config::VisionConfig;
use crate::core_modules::D1::pixel::pixel::Pixel;
use crate::core_modules::colour_space::{to_cmyk, to_greyscale};
use crate::core_modules::pixelate::pixelate;
use crate::core_modules::raster::{Raster, Region};
use std::fmt;

/// A detector-reported face in capture-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// How many raw detections the detector merged into this box.
    pub confidence: u32,
}

impl FaceBox {
    pub const fn new(x: i32, y: i32, width: u32, height: u32, confidence: u32) -> Self {
        Self { x, y, width, height, confidence }
    }

    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_confident(&self, threshold: u32) -> bool {
        self.confidence > threshold
    }
}

/// The face operator currently selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMode {
    #[default]
    None,
    Greyscale,
    Blur,
    ColourConvert,
    Pixelate,
}

impl FilterMode {
    pub const ALL: [FilterMode; 5] = [
        FilterMode::None,
        FilterMode::Greyscale,
        FilterMode::Blur,
        FilterMode::ColourConvert,
        FilterMode::Pixelate,
    ];

    /// The mode after a toggle request for `requested`.
    pub fn toggled(self, requested: FilterMode) -> FilterMode {
        match (self, requested) {
            (_, FilterMode::None) => self,
            (FilterMode::None, mode) => mode,
            (current, mode) if current == mode => FilterMode::None,
            (current, _) => current,
        }
    }

    pub fn is_active(self) -> bool {
        self != FilterMode::None
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::None => "none",
            FilterMode::Greyscale => "greyscale",
            FilterMode::Blur => "blur",
            FilterMode::ColourConvert => "cmyk",
            FilterMode::Pixelate => "pixelate",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn confident_faces<'a>(faces: &'a [FaceBox], threshold: u32) -> impl Iterator<Item = &'a FaceBox> + 'a {
    faces.iter().filter(move |face| face.is_confident(threshold))
}

/// Runs the operator for `mode` over one face crop. `None` is an identity copy.
pub fn filter_face(crop: &Raster, mode: FilterMode, config: &VisionConfig) -> Raster {
    match mode {
        FilterMode::None => crop.clone(),
        FilterMode::Greyscale => to_greyscale(crop),
        FilterMode::Blur => Raster::from_image(image::imageops::blur(crop.as_image(), config.face_blur_sigma)),
        FilterMode::ColourConvert => to_cmyk(crop),
        FilterMode::Pixelate => pixelate(crop, config.face_pixel_block_size),
    }
}

/// A copy of `frame` with every confident face run through the current mode.
pub fn apply_face_filters(frame: &Raster, faces: &[FaceBox], mode: FilterMode, config: &VisionConfig) -> Raster {
    let mut composite = frame.clone();
    for face in confident_faces(faces, config.face_confidence_threshold) {
        let Some(region) = frame.clip(face.region()) else {
            tracing::debug!(?face, "face box outside frame, skipped");
            continue;
        };
        if let Some(crop) = frame.crop(region) {
            let filtered = filter_face(&crop, mode, config);
            composite.paste(&filtered, region.x, region.y);
        }
    }
    composite
}

/// Strokes a rectangle outline around every confident face. The stroke is
/// centred on the box edge, `thickness` pixels wide, and clipped to the frame.
pub fn outline_faces(frame: &Raster, faces: &[FaceBox], config: &VisionConfig) -> Raster {
    let mut annotated = frame.clone();
    let thickness = config.face_outline_thickness as i64;
    if thickness == 0 {
        return annotated;
    }
    let [red, green, blue] = config.face_outline_colour;
    let colour = Pixel::opaque(red, green, blue);
    let outside = thickness / 2;
    let inside = thickness - outside;

    for face in confident_faces(faces, config.face_confidence_threshold) {
        let region = face.region();
        let (left, top) = (region.x as i64, region.y as i64);
        let (right, bottom) = (region.right(), region.bottom());

        let outer = (left - outside, top - outside, right + outside, bottom + outside);
        let inner = (left + inside, top + inside, right - inside, bottom - inside);

        let y_range = outer.1.max(0)..outer.3.min(frame.height() as i64);
        for y in y_range {
            for x in outer.0.max(0)..outer.2.min(frame.width() as i64) {
                let in_hole = x >= inner.0 && x < inner.2 && y >= inner.1 && y < inner.3;
                if !in_hole {
                    annotated.set_pixel(x as u32, y as u32, colour);
                }
            }
        }
    }
    annotated
}
