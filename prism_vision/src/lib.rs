// THEORY:
// This file is the main entry point for the `prism_vision` library crate.
//
// The primary goal is to export `VisionPipeline` and its associated data
// structures (`VisionConfig`, `FrameContext`, `FrameOutputs`, `FaceBox`, ...) as
// the high-level interface of the lab. The individual operators in
// `core_modules` stay public as well, because each one is a self-contained
// `Raster -> Raster` transform that is useful on its own.
//
// Camera access, face detection, key handling and on-screen layout are not part
// of this crate. They belong to the caller (see `visual_tester`).

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::VisionConfig;
pub use error::{Result, VisionError};
pub use pipeline::{FrameContext, FrameOutputs, VisionPipeline};
