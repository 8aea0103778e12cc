// THEORY:
// The block pixelator tiles a raster into `block_size x block_size` cells, reduces
// each cell to its mean luma and paints that grey level over the whole cell. The
// grid is laid from the top-left corner; when the raster is not a multiple of the
// block size, the last column and row are narrower partial cells. Cells never
// overlap, so every pixel is read once and written once.
//
// A block size of 0 or 1 has nothing to average and returns an unchanged copy.

use crate::core_modules::D1::pixel::pixel::{Pixel, clamp_channel};
use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::raster::{Raster, Region};

/// Upper-left corners and clipped sizes of every cell in the block grid.
pub fn block_grid(width: u32, height: u32, block_size: u32) -> impl Iterator<Item = Region> {
    let step = block_size.max(1);
    (0..height).step_by(step as usize).flat_map(move |top| {
        (0..width).step_by(step as usize).map(move |left| {
            Region::new(
                left as i32,
                top as i32,
                step.min(width - left),
                step.min(height - top),
            )
        })
    })
}

pub fn pixelate(src: &Raster, block_size: u32) -> Raster {
    if block_size <= 1 || src.is_empty() {
        return src.clone();
    }

    let mut out = src.clone();
    for cell in block_grid(src.width(), src.height(), block_size) {
        let chunk = Chunk::from_raster(src, cell);
        let level = Pixel::grey(clamp_channel(chunk.average_luma()));

        let (left, top) = (chunk.region.x as u32, chunk.region.y as u32);
        for y in top..top + chunk.region.height {
            for x in left..left + chunk.region.width {
                out.set_pixel(x, y, level);
            }
        }
    }
    out
}
