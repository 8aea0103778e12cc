// THEORY:
// The `pipeline` module is the top-level API for the lab. It wires the capture
// session, the live UI parameters and every operator into one per-frame call.
//
// Each tick:
// 1. The working raster is read once from the `CaptureSession`. With no raster
//    yet the frame is a no-op and `process_frame` returns `None`.
// 2. Every operator runs independently on that raster. The only chained stages
//    are the two luma segmenters, which consume the CMY(K) and HSI rasters.
// 3. The face dispatcher filters confident faces under the current mode.
// 4. The particle field is handed out separately, on demand, because it needs
//    the caller's random source.
//
// Everything is synchronous and single-threaded. Operators read the
// `FrameContext` by reference and never see each other's intermediate state.

use crate::config::VisionConfig;
use crate::core_modules::capture::CaptureSession;
use crate::core_modules::channel::{ColourChannel, SegmentedChannels, isolate_channel, segment_channels};
use crate::core_modules::colour_space::{to_cmyk, to_greyscale_brightened, to_hsi};
use crate::core_modules::face_filter::{apply_face_filters, confident_faces, outline_faces};
use crate::core_modules::threshold::segment_by_luma;
use rand::Rng;

// Re-export key data structures for the public API.
pub use crate::core_modules::face_filter::{FaceBox, FilterMode};
pub use crate::core_modules::particles::{ParticleDraw, ParticleField, ParticleFieldConfig};
pub use crate::core_modules::raster::Raster;
pub use crate::core_modules::threshold::{ThresholdParameter, ThresholdSet};

/// The live parameters the UI mutates between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub thresholds: ThresholdSet,
    filter_mode: FilterMode,
    particles: ParticleFieldConfig,
    /// Whether the last processed frame held at least one confident face.
    faces_in_view: bool,
}

impl FrameContext {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            thresholds: config.initial_thresholds,
            filter_mode: FilterMode::None,
            particles: config.limit_particles(config.initial_particles),
            faces_in_view: false,
        }
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn particles(&self) -> ParticleFieldConfig {
        self.particles
    }

    pub fn faces_in_view(&self) -> bool {
        self.faces_in_view
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutputs {
    pub greyscale: Raster,
    pub red_channel: Raster,
    pub green_channel: Raster,
    pub blue_channel: Raster,
    pub segmented: SegmentedChannels,
    pub cmyk: Raster,
    pub hsi: Raster,
    pub segmented_cmyk: Raster,
    pub segmented_hsi: Raster,
    /// The capture raster with the face operator applied to confident faces.
    pub face_composite: Raster,
    /// `face_composite` with face outlines drawn when no filter is active.
    pub face_annotated: Raster,
    /// Confident faces only.
    pub faces: Vec<FaceBox>,
    pub filter_mode: FilterMode,
}

impl FrameOutputs {
    /// Every output raster with a display name, in layout order.
    pub fn named(&self) -> Vec<(&'static str, &Raster)> {
        vec![
            ("greyscale", &self.greyscale),
            ("red channel", &self.red_channel),
            ("green channel", &self.green_channel),
            ("blue channel", &self.blue_channel),
            ("segmented red", &self.segmented.red),
            ("segmented green", &self.segmented.green),
            ("segmented blue", &self.segmented.blue),
            ("cmyk", &self.cmyk),
            ("hsi", &self.hsi),
            ("segmented cmyk", &self.segmented_cmyk),
            ("segmented hsi", &self.segmented_hsi),
            ("face composite", &self.face_annotated),
        ]
    }
}

/// Runs every operator over one raster. Pure: same inputs, same outputs.
pub fn render_frame(frame: &Raster, faces: &[FaceBox], context: &FrameContext, config: &VisionConfig) -> FrameOutputs {
    let cmyk = to_cmyk(frame);
    let hsi = to_hsi(frame);
    let segmented_cmyk = segment_by_luma(&cmyk, context.thresholds.cmyk);
    let segmented_hsi = segment_by_luma(&hsi, context.thresholds.hsi);

    let faces: Vec<FaceBox> = confident_faces(faces, config.face_confidence_threshold)
        .copied()
        .collect();
    let face_composite = apply_face_filters(frame, &faces, context.filter_mode, config);
    let face_annotated = if context.filter_mode.is_active() {
        face_composite.clone()
    } else {
        outline_faces(&face_composite, &faces, config)
    };

    FrameOutputs {
        greyscale: to_greyscale_brightened(frame, config.brightness_gain),
        red_channel: isolate_channel(frame, ColourChannel::Red),
        green_channel: isolate_channel(frame, ColourChannel::Green),
        blue_channel: isolate_channel(frame, ColourChannel::Blue),
        segmented: segment_channels(frame, &context.thresholds),
        cmyk,
        hsi,
        segmented_cmyk,
        segmented_hsi,
        face_composite,
        face_annotated,
        faces,
        filter_mode: context.filter_mode,
    }
}

/// The main, top-level struct for the lab.
pub struct VisionPipeline {
    config: VisionConfig,
    context: FrameContext,
    session: CaptureSession,
}

impl VisionPipeline {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            context: FrameContext::new(&config),
            session: CaptureSession::new(config.capture_width, config.capture_height),
            config,
        }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CaptureSession {
        &mut self.session
    }

    pub fn set_thresholds(&mut self, thresholds: ThresholdSet) {
        self.context.thresholds = thresholds;
    }

    /// Applies new particle sliders, clamped to the configured limits.
    pub fn set_particles(&mut self, particles: ParticleFieldConfig) -> ParticleFieldConfig {
        self.context.particles = self.config.limit_particles(particles);
        self.context.particles
    }

    /// Handles a key toggle for `mode`. Toggles only count while a confident
    /// face was in the last processed frame; otherwise the mode is unchanged.
    pub fn toggle_filter(&mut self, mode: FilterMode) -> FilterMode {
        if !self.context.faces_in_view {
            tracing::warn!(requested = %mode, "no face in view, filter toggle ignored");
            return self.context.filter_mode;
        }

        let previous = self.context.filter_mode;
        let next = previous.toggled(mode);
        if next != previous {
            tracing::info!(from = %previous, to = %next, "face filter changed");
        } else {
            tracing::debug!(current = %previous, requested = %mode, "toggle has no effect while another filter is active");
        }
        self.context.filter_mode = next;
        next
    }

    /// Runs one tick over the working raster. `None` when nothing has been
    /// captured yet.
    pub fn process_frame(&mut self, faces: &[FaceBox]) -> Option<FrameOutputs> {
        let Some(frame) = self.session.working() else {
            tracing::debug!("no working raster yet, frame skipped");
            return None;
        };

        let outputs = render_frame(frame, faces, &self.context, &self.config);
        self.context.faces_in_view = !outputs.faces.is_empty();
        tracing::debug!(
            detected = faces.len(),
            confident = outputs.faces.len(),
            mode = %outputs.filter_mode,
            "frame processed"
        );
        Some(outputs)
    }

    /// A fresh particle field over the working raster, using the current sliders.
    pub fn particles<'a, R: Rng>(&'a self, rng: &'a mut R) -> Option<ParticleField<'a, R>> {
        let frame = self.session.working()?;
        Some(ParticleField::new(
            frame,
            &self.context.particles,
            self.config.particle_origin,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::D1::pixel::pixel::Pixel;

    fn pipeline_with_frame() -> VisionPipeline {
        let config = VisionConfig { capture_width: 20, capture_height: 15, ..VisionConfig::default() };
        let mut pipeline = VisionPipeline::new(config);
        pipeline.session_mut().offer_frame(Raster::filled(20, 15, Pixel::opaque(200, 60, 20)));
        pipeline
    }

    #[test]
    fn no_frame_is_a_no_op() {
        let mut pipeline = VisionPipeline::new(VisionConfig::default());
        assert!(pipeline.process_frame(&[]).is_none());
        let mut rng = rand::thread_rng();
        assert!(pipeline.particles(&mut rng).is_none());
    }

    #[test]
    fn toggles_need_a_face_in_view() {
        let mut pipeline = pipeline_with_frame();
        assert_eq!(pipeline.toggle_filter(FilterMode::Blur), FilterMode::None);

        pipeline.process_frame(&[FaceBox::new(2, 2, 6, 6, 2)]);
        assert_eq!(pipeline.toggle_filter(FilterMode::Blur), FilterMode::None);

        pipeline.process_frame(&[FaceBox::new(2, 2, 6, 6, 5)]);
        assert_eq!(pipeline.toggle_filter(FilterMode::Blur), FilterMode::Blur);
        assert_eq!(pipeline.toggle_filter(FilterMode::Pixelate), FilterMode::Blur);
        assert_eq!(pipeline.toggle_filter(FilterMode::Blur), FilterMode::None);
    }

    #[test]
    fn particle_sliders_are_clamped() {
        let mut pipeline = pipeline_with_frame();
        let applied = pipeline.set_particles(ParticleFieldConfig { max_particles: 50_000, particle_size: 40 });
        assert_eq!(applied, ParticleFieldConfig { max_particles: 10_000, particle_size: 10 });

        let mut rng = rand::thread_rng();
        assert_eq!(pipeline.particles(&mut rng).map(|field| field.len()), Some(20 * 15));
    }

    #[test]
    fn outputs_share_capture_dimensions() {
        let mut pipeline = pipeline_with_frame();
        let outputs = pipeline.process_frame(&[]).unwrap();
        assert_eq!(outputs.named().len(), 12);
        for (name, raster) in outputs.named() {
            assert_eq!(raster.dimensions(), (20, 15), "{name}");
        }
    }
}
