// ============================================================
// Layer 4 - Datasets
// ============================================================
// In-memory implementations of Burn's Dataset trait. Items are
// returned in insertion order; shuffling is left to the loader.
//
// Image shapes are checked once, at construction: a sample's
// pixel count must match its (C, H, W) shape and every sample in
// an ImageDataset must share one shape, so ImageBatcher can stack
// any batch the loader draws.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilError};

/// One image sample: CHW pixels in [0, 1] and a class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImageSample")]
pub struct ImageSample {
    pixels: Vec<f32>,
    shape:  [usize; 3],
    label:  usize,
}

#[derive(Deserialize)]
struct RawImageSample {
    pixels: Vec<f32>,
    shape:  [usize; 3],
    label:  usize,
}

impl TryFrom<RawImageSample> for ImageSample {
    type Error = UtilError;

    fn try_from(raw: RawImageSample) -> Result<Self> {
        ImageSample::new(raw.pixels, raw.shape, raw.label)
    }
}

impl ImageSample {
    /// Fails with `UtilError::Shape` when `pixels` does not hold C * H * W values.
    pub fn new(pixels: Vec<f32>, shape: [usize; 3], label: usize) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if pixels.len() != expected {
            return Err(UtilError::shape(format!(
                "image sample of shape {shape:?} needs {expected} values, got {}",
                pixels.len()
            )));
        }
        Ok(Self { pixels, shape, label })
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn label(&self) -> usize {
        self.label
    }
}

/// In-memory dataset of (input, label) pairs in a fixed order.
pub struct PairDataset<X, Y> {
    pairs: Vec<(X, Y)>,
}

impl<X, Y> PairDataset<X, Y> {
    pub fn new(pairs: Vec<(X, Y)>) -> Self { Self { pairs } }
}

impl<X, Y> Dataset<(X, Y)> for PairDataset<X, Y>
where
    X: Clone + Send + Sync,
    Y: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<(X, Y)> {
        self.pairs.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// In-memory image dataset, the shape `ImageBatcher` consumes.
pub struct ImageDataset {
    samples: Vec<ImageSample>,
}

impl ImageDataset {
    /// Fails with `UtilError::Shape` when the samples do not all share one shape.
    pub fn new(samples: Vec<ImageSample>) -> Result<Self> {
        if let Some(first) = samples.first() {
            let shape = first.shape();
            if let Some((index, odd)) = samples.iter().enumerate().find(|(_, s)| s.shape() != shape) {
                return Err(UtilError::shape(format!(
                    "sample {index} has shape {:?}, expected {shape:?}",
                    odd.shape()
                )));
            }
        }
        Ok(Self { samples })
    }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count_must_match_shape() {
        let err = ImageSample::new(vec![0.0; 5], [1, 2, 2], 0).unwrap_err();
        assert!(matches!(err, UtilError::Shape(_)));
        assert!(ImageSample::new(vec![0.0; 4], [1, 2, 2], 0).is_ok());
    }

    #[test]
    fn test_mixed_shapes_are_rejected() {
        let samples = vec![
            ImageSample::new(vec![0.0; 4], [1, 2, 2], 0).unwrap(),
            ImageSample::new(vec![0.0; 12], [3, 2, 2], 1).unwrap(),
        ];
        let err = ImageDataset::new(samples).err().unwrap();
        assert!(err.to_string().contains("sample 1 has shape [3, 2, 2]"));

        let dataset = ImageDataset::new(Vec::new()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_deserialising_validates_shape() {
        let bad = r#"{"pixels":[0.0,0.0],"shape":[1,2,2],"label":3}"#;
        assert!(serde_json::from_str::<ImageSample>(bad).is_err());

        let good = r#"{"pixels":[0.0,0.5,1.0,0.5],"shape":[1,2,2],"label":3}"#;
        let sample: ImageSample = serde_json::from_str(good).unwrap();
        assert_eq!((sample.shape(), sample.label()), ([1, 2, 2], 3));
    }
}
