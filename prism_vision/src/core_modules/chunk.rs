// THEORY:
// The `Chunk` module represents a spatial grouping of pixels: one cell of the
// block grid the pixelator tiles a raster into. Its single job is summarising the
// cell, and the value the pixelator paints back is the cell's mean luma.
//
// Like `Pixel`, `Chunk` is a "dumb" data container. It is sliced out of a raster by
// `Chunk::from_raster`, which clips the cell to the raster extent, so the last
// row and column of a grid can be partial cells without any out-of-range reads.

pub mod chunk {
    use crate::core_modules::D1::pixel::pixel::{Luma, Pixel};
    use crate::core_modules::raster::{Raster, Region};

    /// A "dumb" data container representing a rectangular block of pixels.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Chunk {
        /// Where the cell sits in the source raster, already clipped to it.
        pub region: Region,
        /// Row-major copy of the cell's pixels.
        pub pixels: Vec<Pixel>,
    }

    impl Chunk {
        /// Slices the part of `region` that overlaps `raster`. An empty chunk comes
        /// back when the region misses the raster entirely.
        pub fn from_raster(raster: &Raster, region: Region) -> Self {
            let Some(clipped) = raster.clip(region) else {
                return Self {
                    region: Region::new(region.x, region.y, 0, 0),
                    pixels: Vec::new(),
                };
            };

            let (left, top) = (clipped.x as u32, clipped.y as u32);
            let mut pixels = Vec::with_capacity((clipped.width * clipped.height) as usize);
            for y in top..top + clipped.height {
                for x in left..left + clipped.width {
                    if let Some(pixel) = raster.pixel(x, y) {
                        pixels.push(pixel);
                    }
                }
            }

            Self { region: clipped, pixels }
        }

        pub fn len(&self) -> usize {
            self.pixels.len()
        }

        pub fn is_empty(&self) -> bool {
            self.pixels.is_empty()
        }

        /// Mean Rec. 601 luma of the cell, 0 for an empty cell.
        pub fn average_luma(&self) -> Luma {
            if self.pixels.is_empty() {
                return 0.0;
            }
            let total: f64 = self.pixels.iter().map(Pixel::luma).sum();
            total / self.pixels.len() as f64
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn partial_cells_are_clipped() {
            let raster = Raster::filled(7, 5, Pixel::grey(10));
            let chunk = Chunk::from_raster(&raster, Region::new(5, 3, 5, 5));
            assert_eq!(chunk.region, Region::new(5, 3, 2, 2));
            assert_eq!(chunk.len(), 4);
        }

        #[test]
        fn averages_over_cell() {
            let mut raster = Raster::filled(2, 1, Pixel::grey(100));
            raster.set_pixel(1, 0, Pixel::grey(200));
            let chunk = Chunk::from_raster(&raster, Region::new(0, 0, 2, 1));
            assert!((chunk.average_luma() - 150.0).abs() < 1e-9);
        }

        #[test]
        fn empty_chunk_averages_to_zero() {
            let raster = Raster::new(4, 4);
            let chunk = Chunk::from_raster(&raster, Region::new(9, 9, 2, 2));
            assert!(chunk.is_empty());
            assert_eq!(chunk.average_luma(), 0.0);
        }
    }
}
