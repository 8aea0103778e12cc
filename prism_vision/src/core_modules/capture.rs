// THEORY:
// The `CaptureSession` owns the working raster: the single frame every operator
// reads this tick. It runs in one of two modes.
//
// - Live:   every camera frame offered replaces the working raster.
// - Frozen: a snapshot was taken or an external image was loaded. Camera frames
//           are ignored until the session is resumed.
//
// All incoming rasters are normalised to the capture size on entry, so the rest
// of the pipeline only ever sees one shape. Until the first frame arrives there
// is no working raster at all, and downstream stages treat that as a no-op frame.

use crate::core_modules::raster::Raster;
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CaptureMode {
    #[default]
    Live,
    Frozen,
}

#[derive(Debug, Clone)]
pub struct CaptureSession {
    width: u32,
    height: u32,
    mode: CaptureMode,
    working: Option<Raster>,
}

impl CaptureSession {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mode: CaptureMode::Live,
            working: None,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn is_frozen(&self) -> bool {
        self.mode == CaptureMode::Frozen
    }

    pub fn working(&self) -> Option<&Raster> {
        self.working.as_ref()
    }

    /// Offers a camera frame. Returns `true` when it became the working raster.
    pub fn offer_frame(&mut self, frame: Raster) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.working = Some(image_helper::resize(&frame, self.width, self.height));
        true
    }

    /// Freezes the current working raster. Returns `false` when there is nothing
    /// to freeze yet.
    pub fn take_snapshot(&mut self) -> bool {
        if self.working.is_none() {
            tracing::warn!("snapshot requested before any frame was captured");
            return false;
        }
        self.mode = CaptureMode::Frozen;
        tracing::info!("snapshot taken");
        true
    }

    pub fn resume_live(&mut self) {
        if self.is_frozen() {
            tracing::info!("resuming live capture");
        }
        self.mode = CaptureMode::Live;
    }

    /// Replaces the working raster with an external image, resized to the capture
    /// size, and freezes the session. A file that is not an image leaves the
    /// session exactly as it was.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        match image_helper::load_resized(path, self.width, self.height) {
            Ok(raster) => {
                self.working = Some(raster);
                self.mode = CaptureMode::Frozen;
                tracing::info!(path = %path.display(), "external image loaded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "external image rejected");
                Err(err)
            }
        }
    }

    /// Saves the working raster as PNG. Returns `Ok(false)` when there is no
    /// raster to save.
    pub fn save_snapshot(&self, path: &Path) -> Result<bool> {
        let Some(raster) = self.working.as_ref() else {
            tracing::warn!("no snapshot taken yet, nothing to save");
            return Ok(false);
        };
        image_helper::save_png(path, raster)?;
        tracing::info!(path = %path.display(), "snapshot saved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::D1::pixel::pixel::Pixel;
    use crate::error::VisionError;

    #[test]
    fn starts_empty_and_live() {
        let session = CaptureSession::new(160, 120);
        assert!(session.working().is_none());
        assert_eq!(session.mode(), CaptureMode::Live);
    }

    #[test]
    fn live_frames_replace_and_are_resized() {
        let mut session = CaptureSession::new(16, 12);
        assert!(session.offer_frame(Raster::filled(32, 24, Pixel::grey(10))));
        assert!(session.offer_frame(Raster::filled(16, 12, Pixel::grey(20))));
        let working = session.working().unwrap();
        assert_eq!(working.dimensions(), (16, 12));
        assert_eq!(working.pixel(0, 0), Some(Pixel::grey(20)));
    }

    #[test]
    fn snapshot_freezes_until_resumed() {
        let mut session = CaptureSession::new(4, 4);
        assert!(!session.take_snapshot());

        session.offer_frame(Raster::filled(4, 4, Pixel::grey(1)));
        assert!(session.take_snapshot());
        assert!(!session.offer_frame(Raster::filled(4, 4, Pixel::grey(2))));
        assert_eq!(session.working().unwrap().pixel(0, 0), Some(Pixel::grey(1)));

        session.resume_live();
        assert!(session.offer_frame(Raster::filled(4, 4, Pixel::grey(3))));
        assert_eq!(session.working().unwrap().pixel(0, 0), Some(Pixel::grey(3)));
    }

    #[test]
    fn rejected_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp3");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let mut session = CaptureSession::new(4, 4);
        session.offer_frame(Raster::filled(4, 4, Pixel::grey(5)));
        let err = session.load_image(&path).unwrap_err();

        assert!(matches!(err, VisionError::UnsupportedFile { .. }));
        assert_eq!(session.mode(), CaptureMode::Live);
        assert_eq!(session.working().unwrap().pixel(0, 0), Some(Pixel::grey(5)));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.png");

        let mut session = CaptureSession::new(8, 6);
        assert!(!session.save_snapshot(&path).unwrap());

        session.offer_frame(Raster::filled(8, 6, Pixel::opaque(9, 99, 199)));
        assert!(session.save_snapshot(&path).unwrap());

        let mut other = CaptureSession::new(8, 6);
        other.load_image(&path).unwrap();
        assert!(other.is_frozen());
        assert_eq!(other.working(), session.working());
    }
}
