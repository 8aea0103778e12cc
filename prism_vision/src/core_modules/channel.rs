// THEORY:
// Channel operators look at one colour channel at a time.
//
// - `isolate_channel` keeps one channel's raw intensity and zeroes the other two.
// - `segment_channels` binarizes each of R, G, B against its own threshold and
//   returns three rasters, each lit only in its own channel slot.
//
// Polarity: a channel value at or above its threshold is lit (255), anything below
// is suppressed (0). Put the other way round, the pixel is suppressed only when
// the threshold is strictly greater than the value. This is not the same boundary
// as `threshold::segment_by_luma`, which lights only values strictly above the
// threshold. The two disagree exactly at equality.

use crate::core_modules::D1::pixel::pixel::{Channel, OPAQUE, Pixel};
use crate::core_modules::raster::Raster;
use crate::core_modules::threshold::{ThresholdParameter, ThresholdSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColourChannel {
    Red,
    Green,
    Blue,
}

impl ColourChannel {
    pub const ALL: [ColourChannel; 3] = [ColourChannel::Red, ColourChannel::Green, ColourChannel::Blue];

    pub fn value_of(self, pixel: &Pixel) -> Channel {
        match self {
            ColourChannel::Red => pixel.red,
            ColourChannel::Green => pixel.green,
            ColourChannel::Blue => pixel.blue,
        }
    }

    /// An opaque pixel carrying `value` in this channel and 0 in the other two.
    pub fn solo(self, value: Channel) -> Pixel {
        match self {
            ColourChannel::Red => Pixel::new(value, 0, 0, OPAQUE),
            ColourChannel::Green => Pixel::new(0, value, 0, OPAQUE),
            ColourChannel::Blue => Pixel::new(0, 0, value, OPAQUE),
        }
    }

    pub fn threshold_in(self, thresholds: &ThresholdSet) -> ThresholdParameter {
        match self {
            ColourChannel::Red => thresholds.red,
            ColourChannel::Green => thresholds.green,
            ColourChannel::Blue => thresholds.blue,
        }
    }
}

/// The three per-channel segmentation results.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedChannels {
    pub red: Raster,
    pub green: Raster,
    pub blue: Raster,
}

impl SegmentedChannels {
    pub fn get(&self, channel: ColourChannel) -> &Raster {
        match channel {
            ColourChannel::Red => &self.red,
            ColourChannel::Green => &self.green,
            ColourChannel::Blue => &self.blue,
        }
    }
}

pub fn isolate_channel(src: &Raster, which: ColourChannel) -> Raster {
    src.map_pixels(|pixel| which.solo(which.value_of(&pixel)))
}

/// 0 when the threshold is strictly greater than the value, 255 otherwise.
pub fn segment_channel_value(value: Channel, threshold: ThresholdParameter) -> Channel {
    if threshold > value { 0 } else { 255 }
}

pub fn segment_channel(src: &Raster, which: ColourChannel, threshold: ThresholdParameter) -> Raster {
    src.map_pixels(|pixel| which.solo(segment_channel_value(which.value_of(&pixel), threshold)))
}

pub fn segment_channels(src: &Raster, thresholds: &ThresholdSet) -> SegmentedChannels {
    let [red, green, blue] =
        ColourChannel::ALL.map(|channel| segment_channel(src, channel, channel.threshold_in(thresholds)));
    SegmentedChannels { red, green, blue }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Raster {
        let mut raster = Raster::new(4, 2);
        let values = [(10, 20, 30), (200, 100, 0), (255, 255, 255), (0, 0, 0)];
        for (x, &(r, g, b)) in values.iter().enumerate() {
            raster.set_pixel(x as u32, 0, Pixel::new(r, g, b, 9));
            raster.set_pixel(x as u32, 1, Pixel::opaque(b, r, g));
        }
        raster
    }

    #[test]
    fn isolation_keeps_exactly_one_channel() {
        let src = sample();
        for channel in ColourChannel::ALL {
            let out = isolate_channel(&src, channel);
            for (before, after) in src.pixels().zip(out.pixels()) {
                assert_eq!(channel.value_of(&after), channel.value_of(&before));
                let others: u16 = ColourChannel::ALL
                    .iter()
                    .filter(|&&other| other != channel)
                    .map(|other| other.value_of(&after) as u16)
                    .sum();
                assert_eq!(others, 0);
                assert_eq!(after.alpha, 255);
            }
        }
    }

    #[test]
    fn boundary_value_is_lit() {
        assert_eq!(segment_channel_value(100, 100), 255);
        assert_eq!(segment_channel_value(99, 100), 0);
        assert_eq!(segment_channel_value(101, 100), 255);
        assert_eq!(segment_channel_value(0, 0), 255);
    }

    #[test]
    fn each_channel_uses_its_own_threshold() {
        let src = Raster::filled(2, 2, Pixel::opaque(120, 120, 120));
        let thresholds = ThresholdSet { red: 50, green: 120, blue: 121, ..ThresholdSet::default() };
        let out = segment_channels(&src, &thresholds);
        assert!(out.red.pixels().all(|p| p == Pixel::opaque(255, 0, 0)));
        assert!(out.green.pixels().all(|p| p == Pixel::opaque(0, 255, 0)));
        assert!(out.blue.pixels().all(|p| p == Pixel::opaque(0, 0, 0)));
        assert_eq!(out.get(ColourChannel::Green), &out.green);
    }

    #[test]
    fn zero_thresholds_light_everything() {
        let out = segment_channels(&sample(), &ThresholdSet::default());
        for channel in ColourChannel::ALL {
            assert!(out.get(channel).pixels().all(|p| channel.value_of(&p) == 255));
        }
    }
}
