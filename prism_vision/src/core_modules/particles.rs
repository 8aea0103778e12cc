// THEORY:
// The reactive particle field turns a raster's brightness into a spray of
// coloured dots. It is not a simulation: there is no velocity, no lifetime and no
// state between frames. Every frame the caller asks for a fresh `ParticleField`,
// which lazily yields a fixed number of draw commands and is then spent.
//
// Each command samples a uniformly random pixel, maps its luma linearly from
// [0, 255] onto the hue wheel [0, 360) (luma 255 wraps back to red), and emits a
// full-saturation, full-brightness dot of the configured diameter at the sampled
// position plus the caller's origin.
//
// The random source is injected. Live callers pass `rand::thread_rng()`; tests
// pass a seeded `StdRng` and get a repeatable field.

use crate::core_modules::D1::pixel::pixel::{Hue, Luma, Pixel, hue_to_rgb};
use crate::core_modules::raster::Raster;
use rand::Rng;
use std::iter::FusedIterator;

/// Particle sliders. Read once per frame by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ParticleFieldConfig {
    pub max_particles: u32,
    /// Dot diameter in pixels.
    pub particle_size: u32,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            particle_size: 5,
        }
    }
}

/// One filled circle to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDraw {
    /// Centre, already offset by the field origin.
    pub x: i32,
    pub y: i32,
    pub diameter: u32,
    pub colour: Pixel,
    /// Luma of the sampled source pixel.
    pub luma: Luma,
}

pub fn luma_to_hue(luma: Luma) -> Hue {
    (luma.clamp(0.0, 255.0) / 255.0 * 360.0) % 360.0
}

/// `min(max_particles, width * height)`; 0 for an empty raster.
pub fn particle_count(config: &ParticleFieldConfig, source: &Raster) -> usize {
    let area = source.width() as usize * source.height() as usize;
    (config.max_particles as usize).min(area)
}

/// A finite, single-use stream of particle draw commands over one raster.
pub struct ParticleField<'a, R: Rng> {
    source: &'a Raster,
    rng: &'a mut R,
    origin: (i32, i32),
    diameter: u32,
    remaining: usize,
}

impl<'a, R: Rng> ParticleField<'a, R> {
    pub fn new(source: &'a Raster, config: &ParticleFieldConfig, origin: (i32, i32), rng: &'a mut R) -> Self {
        Self {
            source,
            rng,
            origin,
            diameter: config.particle_size,
            remaining: particle_count(config, source),
        }
    }
}

impl<R: Rng> Iterator for ParticleField<'_, R> {
    type Item = ParticleDraw;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let x = self.rng.gen_range(0..self.source.width());
        let y = self.rng.gen_range(0..self.source.height());
        let luma = self.source.pixel(x, y).map(|p| p.luma()).unwrap_or_default();

        Some(ParticleDraw {
            x: x as i32 + self.origin.0,
            y: y as i32 + self.origin.1,
            diameter: self.diameter,
            colour: hue_to_rgb(luma_to_hue(luma)),
            luma,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng> ExactSizeIterator for ParticleField<'_, R> {}

impl<R: Rng> FusedIterator for ParticleField<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn count_is_capped_by_area() {
        let small = Raster::new(4, 3);
        let config = ParticleFieldConfig { max_particles: 1000, particle_size: 2 };
        assert_eq!(particle_count(&config, &small), 12);

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(ParticleField::new(&small, &config, (0, 0), &mut rng).count(), 12);
    }

    #[test]
    fn empty_raster_yields_nothing() {
        let empty = Raster::new(0, 0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new(&empty, &ParticleFieldConfig::default(), (0, 0), &mut rng);
        assert_eq!(field.len(), 0);
        assert!(field.next().is_none());
    }

    #[test]
    fn seeded_fields_repeat() {
        let mut raster = Raster::new(16, 12);
        for y in 0..12u32 {
            for x in 0..16u32 {
                raster.set_pixel(x, y, Pixel::grey((x * 16) as u8));
            }
        }
        let config = ParticleFieldConfig { max_particles: 50, particle_size: 3 };

        let mut first_rng = StdRng::seed_from_u64(42);
        let first: Vec<_> = ParticleField::new(&raster, &config, (10, 800), &mut first_rng).collect();
        let mut second_rng = StdRng::seed_from_u64(42);
        let second: Vec<_> = ParticleField::new(&raster, &config, (10, 800), &mut second_rng).collect();

        assert_eq!(first.len(), 50);
        assert_eq!(first, second);
    }

    #[test]
    fn draws_are_offset_and_coloured_by_luma() {
        let raster = Raster::filled(8, 8, Pixel::grey(0));
        let config = ParticleFieldConfig { max_particles: 20, particle_size: 4 };
        let mut rng = StdRng::seed_from_u64(3);
        for draw in ParticleField::new(&raster, &config, (10, 800), &mut rng) {
            assert!((10..18).contains(&draw.x));
            assert!((800..808).contains(&draw.y));
            assert_eq!(draw.diameter, 4);
            assert_eq!(draw.colour, Pixel::opaque(255, 0, 0));
        }
    }

    #[test]
    fn luma_maps_linearly_onto_the_wheel() {
        assert_eq!(luma_to_hue(0.0), 0.0);
        assert!((luma_to_hue(127.5) - 180.0).abs() < 1e-9);
        assert_eq!(luma_to_hue(255.0), 0.0);
        assert_eq!(luma_to_hue(400.0), 0.0);
    }
}
