use anyhow::{Context, Result, bail};
use clap::Parser;
use opencv::{
    core::{self, Mat, Point, Rect, Scalar, Size, Vector},
    highgui, imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
    videoio::{self, VideoCapture},
};
use prism_vision::pipeline::{FaceBox, FilterMode, FrameOutputs, ParticleFieldConfig, Raster, ThresholdSet};
use prism_vision::{VisionConfig, VisionPipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const WINDOW: &str = "prism lab";
const SHEET_COLUMNS: u32 = 4;
const SHEET_ROWS: u32 = 4;
/// Tile index of the particle panel, right after the 12 named outputs.
const PARTICLE_TILE: u32 = 12;

/// Interactive webcam lab: colour spaces, segmentation, face filters and a
/// reactive particle field, all on one contact sheet.
#[derive(Parser, Debug)]
#[command(name = "visual_tester")]
#[command(about = "Run the prism_vision pipeline over a webcam or video file")]
struct Args {
    /// Camera index, used when no video file is given
    #[arg(short, long, default_value_t = 0)]
    camera: i32,

    /// Read frames from a video file instead of the camera
    #[arg(long)]
    video: Option<PathBuf>,

    /// Haar cascade used for face detection
    #[arg(long, default_value = "haarcascade_frontalface_default.xml")]
    cascade: PathBuf,

    /// VisionConfig as JSON; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start frozen on an external image instead of the live feed
    #[arg(long)]
    load: Option<PathBuf>,

    /// Where the S key writes the working frame
    #[arg(long, default_value = "snapshot.png")]
    snapshot_path: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Toggle(FilterMode),
    SaveSnapshot,
    SnapshotOrResume,
    Quit,
}

fn key_action(code: i32) -> Option<KeyAction> {
    if code < 0 {
        return None;
    }
    let action = match (code & 0xFF) as u8 {
        b'z' | b'Z' => KeyAction::Toggle(FilterMode::Greyscale),
        b'x' | b'X' => KeyAction::Toggle(FilterMode::Blur),
        b'c' | b'C' => KeyAction::Toggle(FilterMode::ColourConvert),
        b'v' | b'V' => KeyAction::Toggle(FilterMode::Pixelate),
        b's' | b'S' => KeyAction::SaveSnapshot,
        b' ' => KeyAction::SnapshotOrResume,
        b'q' | b'Q' | 27 => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

fn init_logging(args: &Args) {
    let level = if args.debug {
        tracing::Level::DEBUG
    } else if args.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<VisionConfig> {
    let Some(path) = path else {
        return Ok(VisionConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    init_logging(&args);

    let mut config = load_config(args.config.as_ref())?;
    let (tile_w, tile_h) = (config.capture_width, config.capture_height);
    config.particle_origin = tile_origin(PARTICLE_TILE, tile_w, tile_h);
    let mut pipeline = VisionPipeline::new(config);

    if let Some(path) = &args.load {
        pipeline.session_mut().load_image(path)?;
    }

    // --- 2. Capture & Detector Initialization ---
    let mut cap = match &args.video {
        Some(path) => VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?,
        None => VideoCapture::new(args.camera, videoio::CAP_ANY)?,
    };
    if !cap.is_opened()? {
        bail!("could not open the video source");
    }
    let mut detector = CascadeClassifier::new(&args.cascade.to_string_lossy())
        .with_context(|| format!("loading cascade {}", args.cascade.display()))?;
    if detector.empty()? {
        bail!("cascade {} has no stages", args.cascade.display());
    }

    // --- 3. Window & Sliders ---
    highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
    create_sliders(pipeline.config())?;

    tracing::info!(source = ?args.video, camera = args.camera, "lab started");

    // --- 4. Main Loop ---
    let mut rng = rand::thread_rng();
    let mut camera_frame = Mat::default();
    loop {
        if !pipeline.session().is_frozen() {
            if !cap.read(&mut camera_frame)? || camera_frame.empty() {
                if args.video.is_some() {
                    tracing::info!("end of video");
                    break;
                }
                continue;
            }
            let raster = mat_to_raster(&camera_frame, tile_w, tile_h)?;
            pipeline.session_mut().offer_frame(raster);
        }

        // --- 5. Sliders -> FrameContext ---
        let (thresholds, particles) = read_sliders()?;
        pipeline.set_thresholds(thresholds);
        pipeline.set_particles(particles);

        // --- 6. Detection & Processing ---
        let faces = match pipeline.session().working() {
            Some(working) => detect_faces(&mut detector, working)?,
            None => Vec::new(),
        };
        if let Some(outputs) = pipeline.process_frame(&faces) {
            let mut sheet = compose_sheet(&outputs, tile_w, tile_h)?;
            if let Some(field) = pipeline.particles(&mut rng) {
                for draw in field {
                    let colour = Scalar::new(draw.colour.blue as f64, draw.colour.green as f64, draw.colour.red as f64, 0.0);
                    let radius = (draw.diameter / 2).max(1) as i32;
                    imgproc::circle(&mut sheet, Point::new(draw.x, draw.y), radius, colour, imgproc::FILLED, imgproc::LINE_8, 0)?;
                }
            }
            label_sheet(&mut sheet, &outputs, tile_w, tile_h)?;
            highgui::imshow(WINDOW, &sheet)?;
        }

        // --- 7. Keys ---
        match key_action(highgui::wait_key(1)?) {
            Some(KeyAction::Toggle(mode)) => {
                pipeline.toggle_filter(mode);
            }
            Some(KeyAction::SaveSnapshot) => {
                if let Err(err) = pipeline.session().save_snapshot(&args.snapshot_path) {
                    tracing::error!(error = %err, "snapshot could not be saved");
                }
            }
            Some(KeyAction::SnapshotOrResume) => {
                if pipeline.session().is_frozen() {
                    pipeline.session_mut().resume_live();
                } else {
                    pipeline.session_mut().take_snapshot();
                }
            }
            Some(KeyAction::Quit) => break,
            None => {}
        }
    }

    highgui::destroy_all_windows()?;
    Ok(())
}

fn create_sliders(config: &VisionConfig) -> opencv::Result<()> {
    let thresholds = config.initial_thresholds;
    let sliders = [
        ("red", thresholds.red as i32, 255),
        ("green", thresholds.green as i32, 255),
        ("blue", thresholds.blue as i32, 255),
        ("cmyk", thresholds.cmyk as i32, 255),
        ("hsi", thresholds.hsi as i32, 255),
        ("particles", config.initial_particles.max_particles as i32, config.max_particles_limit as i32),
        ("size", config.initial_particles.particle_size as i32, config.particle_size_limit as i32),
    ];
    for (name, initial, max) in sliders {
        highgui::create_trackbar(name, WINDOW, None, max, None)?;
        highgui::set_trackbar_pos(name, WINDOW, initial)?;
    }
    Ok(())
}

fn read_sliders() -> opencv::Result<(ThresholdSet, ParticleFieldConfig)> {
    let byte = |name: &str| -> opencv::Result<u8> { Ok(highgui::get_trackbar_pos(name, WINDOW)?.clamp(0, 255) as u8) };
    let count = |name: &str| -> opencv::Result<u32> { Ok(highgui::get_trackbar_pos(name, WINDOW)?.max(0) as u32) };

    let thresholds = ThresholdSet {
        red: byte("red")?,
        green: byte("green")?,
        blue: byte("blue")?,
        cmyk: byte("cmyk")?,
        hsi: byte("hsi")?,
    };
    let particles = ParticleFieldConfig {
        max_particles: count("particles")?,
        particle_size: count("size")?,
    };
    Ok((thresholds, particles))
}

/// Resizes a BGR camera frame to the capture size and converts it into an RGBA
/// raster for the pipeline.
fn mat_to_raster(frame: &Mat, width: u32, height: u32) -> Result<Raster> {
    let mut resized = Mat::default();
    imgproc::resize(frame, &mut resized, Size::new(width as i32, height as i32), 0.0, 0.0, imgproc::INTER_LINEAR)?;
    let mut rgba = Mat::default();
    imgproc::cvt_color(&resized, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
    Ok(Raster::from_raw(width, height, rgba.data_bytes()?.to_vec())?)
}

fn raster_to_mat(raster: &Raster) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        raster.height() as i32,
        raster.width() as i32,
        core::CV_8UC4,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(raster.as_raw());
    Ok(mat)
}

/// Runs the cascade over the working raster. The confidence of each box is
/// the number of raw detections merged into it.
fn detect_faces(detector: &mut CascadeClassifier, working: &Raster) -> opencv::Result<Vec<FaceBox>> {
    let rgba = raster_to_mat(working)?;
    let mut grey = Mat::default();
    imgproc::cvt_color(&rgba, &mut grey, imgproc::COLOR_RGBA2GRAY, 0)?;

    let mut boxes = Vector::<Rect>::new();
    let mut merged = Vector::<i32>::new();
    detector.detect_multi_scale2(
        &grey,
        &mut boxes,
        &mut merged,
        1.1,
        1,
        0,
        Size::new(20, 20),
        Size::default(),
    )?;

    Ok(boxes
        .iter()
        .zip(merged.iter())
        .map(|(rect, count)| {
            FaceBox::new(rect.x, rect.y, rect.width.max(0) as u32, rect.height.max(0) as u32, count.max(0) as u32)
        })
        .collect())
}

fn tile_origin(index: u32, tile_w: u32, tile_h: u32) -> (i32, i32) {
    let column = index % SHEET_COLUMNS;
    let row = index / SHEET_COLUMNS;
    ((column * tile_w) as i32, (row * tile_h) as i32)
}

/// Lays the named outputs out on one BGR sheet, row by row. The particle tile
/// is left black.
fn compose_sheet(outputs: &FrameOutputs, tile_w: u32, tile_h: u32) -> opencv::Result<Mat> {
    let mut sheet = Raster::new(SHEET_COLUMNS * tile_w, SHEET_ROWS * tile_h);
    for (index, (_, raster)) in outputs.named().into_iter().enumerate() {
        let (x, y) = tile_origin(index as u32, tile_w, tile_h);
        sheet.paste(raster, x, y);
    }

    let rgba = raster_to_mat(&sheet)?;
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgba, &mut bgr, imgproc::COLOR_RGBA2BGR, 0)?;
    Ok(bgr)
}

fn label_sheet(sheet: &mut Mat, outputs: &FrameOutputs, tile_w: u32, tile_h: u32) -> opencv::Result<()> {
    let face_label = format!("face: {}", outputs.filter_mode);
    let names = outputs.named();
    let labels = names
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once("particles"))
        .enumerate();

    for (index, name) in labels {
        let text = if name == "face composite" { face_label.as_str() } else { name };
        let (x, y) = tile_origin(index as u32, tile_w, tile_h);
        imgproc::put_text(
            sheet,
            text,
            Point::new(x + 4, y + 12),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.35,
            Scalar::new(0.0, 255.0, 255.0, 0.0),
            1,
            imgproc::LINE_AA,
            false,
        )?;
    }
    Ok(())
}
