#[allow(non_snake_case)]
pub mod D1;
pub mod capture;
pub mod channel;
pub mod chunk;
pub mod colour_space;
pub mod face_filter;
pub mod particles;
pub mod pixelate;
pub mod raster;
pub mod threshold;
pub mod utils;
