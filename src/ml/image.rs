// ============================================================
// Layer 5 - Tensor / Image Conversion
// ============================================================
// Takes generator output back to something you can look at.
//
//   denormalize      x * std + mean, clamped to [0, 1]
//   tensor_to_image  [C, H, W] float tensor → HWC u8 ImageArray
//
// tensor_to_image expects values already in [0, 1]: it scales by
// 255 and does NOT remap [-1, 1] first. Out-of-range values follow
// Rust's float-to-int cast (saturating, fraction truncated,
// NaN → 0). Call `denormalize` first for tanh outputs.

use burn::tensor::{backend::Backend, Tensor};

use crate::domain::image::ImageArray;
use crate::error::{Result, UtilError};

/// Invert a `(x - mean) / std` normalization and clip to the display range.
pub fn denormalize<B: Backend, const D: usize>(x: Tensor<B, D>, std: f32, mean: f32) -> Tensor<B, D> {
    x.mul_scalar(std).add_scalar(mean).clamp(0.0, 1.0)
}

/// Convert a `[C, H, W]` image tensor to an 8-bit HWC array.
///
/// Single-channel input is replicated to three identical channels.
pub fn tensor_to_image<B: Backend>(tensor: Tensor<B, 3>) -> Result<ImageArray> {
    let [channels, height, width] = tensor.dims();
    let values = tensor
        .detach()
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| UtilError::Tensor(format!("cannot read image tensor: {e:?}")))?;

    let out_channels = if channels == 1 { 3 } else { channels };
    let plane = height * width;

    let mut pixels = Vec::with_capacity(plane * out_channels);
    for y in 0..height {
        for x in 0..width {
            for c in 0..out_channels {
                let src = if channels == 1 { 0 } else { c };
                let v = values[src * plane + y * width + x];
                pixels.push((v * 255.0) as u8);
            }
        }
    }

    Ok(ImageArray::new(height, width, out_channels, pixels))
}
