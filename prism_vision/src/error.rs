// THEORY:
// Operators in `core_modules` never fail: degenerate pixels, out-of-range
// geometry and a missing capture are all absorbed locally and produce a safe
// default. The only fallible surface is the boundary with the outside world,
// which is building a `Raster` from foreign bytes and moving images on and off
// disk. Those paths report through this one error type.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// A raw RGBA buffer did not hold exactly `width * height * 4` bytes.
    #[error("Dimension mismatch: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// An external file was offered as an image but is not one we can decode.
    #[error("Unsupported file: {}", path.display())]
    UnsupportedFile { path: PathBuf },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
