pub mod image_helper {
    use crate::core_modules::raster::Raster;
    use crate::error::{Result, VisionError};
    use image::imageops::FilterType;
    use image::{ImageEncoder, ImageFormat};
    use std::path::Path;

    /// Writes a raster to `path` as an RGBA PNG.
    pub fn save_png(path: &Path, raster: &Raster) -> Result<()> {
        let output = std::io::BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    /// Decodes an external image and resizes it to `width x height`.
    ///
    /// The file extension must name a format the `image` crate knows, otherwise the
    /// file is rejected as unsupported before any decoding happens.
    pub fn load_resized(path: &Path, width: u32, height: u32) -> Result<Raster> {
        if ImageFormat::from_path(path).is_err() {
            return Err(VisionError::UnsupportedFile { path: path.to_path_buf() });
        }

        let decoded = Raster::from_image(image::open(path)?.to_rgba8());
        Ok(resize(&decoded, width, height))
    }

    /// Resamples a raster to exactly `width x height`. Same-size input is copied.
    pub fn resize(raster: &Raster, width: u32, height: u32) -> Raster {
        if raster.dimensions() == (width, height) {
            return raster.clone();
        }
        Raster::from_image(image::imageops::resize(
            raster.as_image(),
            width,
            height,
            FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::D1::pixel::pixel::Pixel;
    use crate::core_modules::raster::Raster;
    use crate::error::VisionError;

    #[test]
    fn save_white_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("white_file.png");
        let raster = Raster::filled(160, 120, Pixel::grey(255));

        save_png(&path, &raster).expect("Error Saving File.");
        assert!(path.exists());
    }

    #[test]
    fn saved_gradient_loads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradient_file.png");
        let mut raster = Raster::new(64, 48);
        let mut intensity = 0u8;
        for y in 0..48 {
            for x in 0..64 {
                raster.set_pixel(x, y, Pixel::grey(intensity));
                intensity = intensity.wrapping_add(1);
            }
        }

        save_png(&path, &raster).expect("Error Saving File.");
        let loaded = load_resized(&path, 64, 48).expect("Error Loading File.");
        assert_eq!(loaded, raster);
    }

    #[test]
    fn load_resizes_to_capture_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big.png");
        save_png(&path, &Raster::filled(320, 200, Pixel::opaque(10, 20, 30))).unwrap();

        let loaded = load_resized(&path, 160, 120).unwrap();
        assert_eq!(loaded.dimensions(), (160, 120));
        assert_eq!(loaded.pixel(80, 60), Some(Pixel::opaque(10, 20, 30)));
    }

    #[test]
    fn non_image_files_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not a picture").unwrap();

        let err = load_resized(&path, 160, 120).unwrap_err();
        assert!(matches!(err, VisionError::UnsupportedFile { .. }));
    }

    #[test]
    fn resize_same_size_is_a_copy() {
        let raster = Raster::filled(5, 4, Pixel::grey(77));
        assert_eq!(resize(&raster, 5, 4), raster);
        assert_eq!(resize(&raster, 10, 8).dimensions(), (10, 8));
    }
}
