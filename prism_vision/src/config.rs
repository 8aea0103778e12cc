// THEORY:
// Two kinds of parameters drive a frame.
//
// - `VisionConfig` is fixed for the life of a pipeline: capture size, the
//   constants of each operator, and the limits of the UI sliders.
// - `FrameContext` (in `pipeline`) carries what the user changes while the lab is
//   running: thresholds, the face filter mode and the particle sliders.

use crate::core_modules::particles::ParticleFieldConfig;
use crate::core_modules::threshold::ThresholdSet;

/// Configuration for the VisionPipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct VisionConfig {
    pub capture_width: u32,
    pub capture_height: u32,
    /// Multiplier applied to luma for the brightened greyscale output.
    pub brightness_gain: f64,
    /// A face counts only when its confidence score is strictly above this.
    pub face_confidence_threshold: u32,
    pub face_pixel_block_size: u32,
    pub face_blur_sigma: f32,
    pub face_outline_thickness: u32,
    pub face_outline_colour: [u8; 3],
    /// Added to every particle position.
    pub particle_origin: (i32, i32),
    pub max_particles_limit: u32,
    pub particle_size_limit: u32,
    pub initial_particles: ParticleFieldConfig,
    pub initial_thresholds: ThresholdSet,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            capture_width: 160,
            capture_height: 120,
            brightness_gain: 1.2,
            face_confidence_threshold: 4,
            face_pixel_block_size: 5,
            face_blur_sigma: 5.0,
            face_outline_thickness: 5,
            face_outline_colour: [255, 0, 0],
            particle_origin: (0, 0),
            max_particles_limit: 10_000,
            particle_size_limit: 10,
            initial_particles: ParticleFieldConfig::default(),
            initial_thresholds: ThresholdSet::default(),
        }
    }
}

impl VisionConfig {
    /// Clamps a particle config to the slider limits.
    pub fn limit_particles(&self, particles: ParticleFieldConfig) -> ParticleFieldConfig {
        ParticleFieldConfig {
            max_particles: particles.max_particles.min(self.max_particles_limit),
            particle_size: particles.particle_size.min(self.particle_size_limit),
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: VisionConfig =
            serde_json::from_str(r#"{ "brightness_gain": 1.5, "initial_thresholds": { "hsi": 90 } }"#).unwrap();
        assert_eq!(config.brightness_gain, 1.5);
        assert_eq!(config.initial_thresholds.hsi, 90);
        assert_eq!(config.initial_thresholds.red, 0);
        assert_eq!(config.capture_width, 160);
    }
}
