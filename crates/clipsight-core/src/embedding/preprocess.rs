//! Image preprocessing for the CLIP vision encoder.
//!
//! CLIP ViT-B/32 expects:
//! - Shortest side resized to the input size, then a centered square crop
//! - Channel order: RGB
//! - Normalization: (pixel/255 - mean) / std with the CLIP channel statistics
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// CLIP normalization mean (per-channel, RGB).
const NORM_MEAN: [f32; CHANNELS] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std (per-channel, RGB).
const NORM_STD: [f32; CHANNELS] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an image for CLIP inference.
///
/// Scales the image to cover `image_size × image_size`, crops the center,
/// and returns a normalized NCHW tensor suitable for ONNX Runtime.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let cropped = image.resize_to_fill(image_size, image_size, FilterType::CatmullRom);
    let rgb = cropped.to_rgb8();

    let size = image_size as usize;
    Array4::from_shape_fn((1, CHANNELS, size, size), |(_, c, y, x)| {
        let value = rgb.get_pixel(x as u32, y as u32)[c];
        (value as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c]
    })
}
