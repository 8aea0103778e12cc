// THEORY (1D Pixel Colour Spaces):
// The `Pixel` module is the most fundamental unit of the lab. It is a "dumb" data
// container for a single RGBA pixel plus the single-pixel colour math every raster
// operator is built from: luma, CMY(K) and HSI decompositions, and the inverse
// conversions needed to render a hue or reconstruct RGB. Nothing here reads a
// neighbouring pixel; spatial work (blocks, crops, blur) lives in higher modules.
//
// Key principles:
// 1) Single-pixel scope: every function is a pure map of one pixel's channels.
// 2) Defined values everywhere: pure black (K = 1) and zero-sum pixels (R+G+B = 0)
//    have no natural CMY(K) or HSI decomposition. Both are special-cased to 0 so no
//    NaN or infinity ever reaches a channel.
// 3) Byte writes saturate: every float-to-channel write goes through
//    `clamp_channel`, which rounds and clamps to [0, 255].

pub mod pixel {
    use std::f64::consts::PI;

    pub type Channel = u8;
    pub type Luma = f64;
    /// Hue angle in degrees.
    pub type Hue = f64;

    /// Interleaved channels per pixel (R, G, B, A).
    pub const CHANNELS: usize = 4;
    pub const OPAQUE: Channel = 255;

    const LUMA_RED: f64 = 0.299;
    const LUMA_GREEN: f64 = 0.587;
    const LUMA_BLUE: f64 = 0.114;
    const ACHROMATIC_EPSILON: f64 = 1e-9;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha channel value (0-255). Some operators repurpose this slot.
        pub alpha: Channel,
    }

    /// Subtractive decomposition of a pixel, every component in [0, 1].
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Cmyk {
        pub cyan: f64,
        pub magenta: f64,
        pub yellow: f64,
        pub key: f64,
    }

    /// Hue (degrees, [0, 360)), saturation ([0, 1]) and intensity ([0, 1]).
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Hsi {
        pub hue: Hue,
        pub saturation: f64,
        pub intensity: f64,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Self { red, green, blue, alpha }
        }

        pub const fn opaque(red: Channel, green: Channel, blue: Channel) -> Self {
            Self::new(red, green, blue, OPAQUE)
        }

        pub const fn grey(level: Channel) -> Self {
            Self::opaque(level, level, level)
        }

        /// Rec. 601 luma over the 0..255 channels.
        pub fn luma(&self) -> Luma {
            LUMA_RED * self.red as f64 + LUMA_GREEN * self.green as f64 + LUMA_BLUE * self.blue as f64
        }

        /// Raw RGB channel sum.
        pub fn sum(&self) -> u16 {
            self.red as u16 + self.green as u16 + self.blue as u16
        }

        pub fn normalized(&self) -> (f64, f64, f64) {
            (
                self.red as f64 / 255.0,
                self.green as f64 / 255.0,
                self.blue as f64 / 255.0,
            )
        }

        /// CMY(K) decomposition.
        ///
        /// K is the smallest of the three CMY components. The chromatic components
        /// are rescaled by `1 - K`; for pure black that divisor is zero, so C, M and
        /// Y are defined as 0 instead.
        pub fn cmyk(&self) -> Cmyk {
            let (r, g, b) = self.normalized();
            let (cyan, magenta, yellow) = (1.0 - r, 1.0 - g, 1.0 - b);
            let key = cyan.min(magenta).min(yellow);

            if key >= 1.0 {
                return Cmyk { cyan: 0.0, magenta: 0.0, yellow: 0.0, key: 1.0 };
            }

            let scale = 1.0 - key;
            Cmyk {
                cyan: (cyan - key) / scale,
                magenta: (magenta - key) / scale,
                yellow: (yellow - key) / scale,
                key,
            }
        }

        /// HSI decomposition using the geometric (acos) hue.
        ///
        /// - Saturation is 0 for a zero-sum pixel.
        /// - Hue is 0 for any achromatic pixel.
        /// - Hue is reflected to `360 - h` when blue exceeds green.
        pub fn hsi(&self) -> Hsi {
            let (r, g, b) = self.normalized();
            let total = r + g + b;
            let intensity = total / 3.0;

            let saturation = if total <= 0.0 {
                0.0
            } else {
                (1.0 - 3.0 * r.min(g).min(b) / total).max(0.0)
            };

            if saturation <= ACHROMATIC_EPSILON {
                return Hsi { hue: 0.0, saturation: 0.0, intensity };
            }

            let numerator = 0.5 * ((r - g) + (r - b));
            let denominator = ((r - g).powi(2) + (r - b) * (g - b)).sqrt();
            let mut hue = if denominator <= ACHROMATIC_EPSILON {
                0.0
            } else {
                (numerator / denominator).clamp(-1.0, 1.0).acos()
            };
            if b > g {
                hue = 2.0 * PI - hue;
            }

            Hsi {
                hue: hue.to_degrees() % 360.0,
                saturation,
                intensity,
            }
        }

        pub fn to_bytes(self) -> [Channel; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }
    }

    impl From<[Channel; CHANNELS]> for Pixel {
        fn from(bytes: [Channel; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Channel; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            pixel.to_bytes()
        }
    }

    /// Rounds and saturates a float into a channel byte. NaN maps to 0.
    pub fn clamp_channel(value: f64) -> Channel {
        if value.is_nan() {
            return 0;
        }
        value.round().clamp(0.0, 255.0) as Channel
    }

    /// Rebuilds an opaque RGB pixel from a CMY(K) decomposition.
    pub fn cmyk_to_rgb(cmyk: Cmyk) -> Pixel {
        let white = 1.0 - cmyk.key;
        Pixel::opaque(
            clamp_channel(255.0 * (1.0 - cmyk.cyan) * white),
            clamp_channel(255.0 * (1.0 - cmyk.magenta) * white),
            clamp_channel(255.0 * (1.0 - cmyk.yellow) * white),
        )
    }

    /// Full-saturation, full-brightness colour for a hue (HSB(h, 100%, 100%)).
    /// Hues outside [0, 360) wrap around the wheel.
    pub fn hue_to_rgb(hue: Hue) -> Pixel {
        let hue = hue.rem_euclid(360.0);
        let sector = hue / 60.0;
        let rising = 1.0 - ((sector % 2.0) - 1.0).abs();

        let (r, g, b) = match sector as u32 {
            0 => (1.0, rising, 0.0),
            1 => (rising, 1.0, 0.0),
            2 => (0.0, 1.0, rising),
            3 => (0.0, rising, 1.0),
            4 => (rising, 0.0, 1.0),
            _ => (1.0, 0.0, rising),
        };

        Pixel::opaque(clamp_channel(r * 255.0), clamp_channel(g * 255.0), clamp_channel(b * 255.0))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn close(a: f64, b: f64) -> bool {
            (a - b).abs() < 1e-6
        }

        #[test]
        fn luma_weights_follow_rec601() {
            assert!(close(Pixel::opaque(255, 0, 0).luma(), 76.245));
            assert!(close(Pixel::opaque(0, 255, 0).luma(), 149.685));
            assert!(close(Pixel::opaque(0, 0, 255).luma(), 29.07));
            assert!(close(Pixel::grey(128).luma(), 128.0));
        }

        #[test]
        fn cmyk_of_pure_red() {
            let cmyk = Pixel::opaque(255, 0, 0).cmyk();
            assert!(close(cmyk.cyan, 0.0));
            assert!(close(cmyk.magenta, 1.0));
            assert!(close(cmyk.yellow, 1.0));
            assert!(close(cmyk.key, 0.0));
        }

        #[test]
        fn cmyk_of_black_is_defined() {
            let cmyk = Pixel::opaque(0, 0, 0).cmyk();
            assert_eq!(cmyk, Cmyk { cyan: 0.0, magenta: 0.0, yellow: 0.0, key: 1.0 });
            assert_eq!(cmyk_to_rgb(cmyk), Pixel::opaque(0, 0, 0));
        }

        #[test]
        fn cmyk_round_trip_recovers_rgb() {
            for &(r, g, b) in &[(12, 200, 90), (255, 255, 255), (1, 2, 3), (77, 77, 200)] {
                let pixel = Pixel::opaque(r, g, b);
                assert_eq!(cmyk_to_rgb(pixel.cmyk()), pixel);
            }
        }

        #[test]
        fn hsi_primaries() {
            let red = Pixel::opaque(255, 0, 0).hsi();
            assert!(close(red.hue, 0.0));
            assert!(close(red.saturation, 1.0));
            assert!(close(red.intensity, 1.0 / 3.0));

            let green = Pixel::opaque(0, 255, 0).hsi();
            assert!(close(green.hue, 120.0));

            let blue = Pixel::opaque(0, 0, 255).hsi();
            assert!(close(blue.hue, 240.0));
        }

        #[test]
        fn hsi_of_black_and_grey_has_no_hue() {
            let black = Pixel::opaque(0, 0, 0).hsi();
            assert_eq!((black.hue, black.saturation, black.intensity), (0.0, 0.0, 0.0));

            let grey = Pixel::grey(90).hsi();
            assert_eq!(grey.hue, 0.0);
            assert_eq!(grey.saturation, 0.0);
        }

        #[test]
        fn hue_wheel_landmarks() {
            assert_eq!(hue_to_rgb(0.0), Pixel::opaque(255, 0, 0));
            assert_eq!(hue_to_rgb(60.0), Pixel::opaque(255, 255, 0));
            assert_eq!(hue_to_rgb(120.0), Pixel::opaque(0, 255, 0));
            assert_eq!(hue_to_rgb(240.0), Pixel::opaque(0, 0, 255));
            assert_eq!(hue_to_rgb(360.0), hue_to_rgb(0.0));
        }

        #[test]
        fn clamp_channel_saturates() {
            assert_eq!(clamp_channel(-4.0), 0);
            assert_eq!(clamp_channel(306.0), 255);
            assert_eq!(clamp_channel(f64::NAN), 0);
            assert_eq!(clamp_channel(127.6), 128);
        }
    }
}
