// ============================================================
// Layer 4 - Image Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks ImageSamples into one
// (images, labels) pair so a DataLoader can drive training and
// InfiniteIter can cycle over it.
//
//   Input:  N samples, each C x H x W
//   Output: images [N, C, H, W] (float), labels [N] (int)
//
// Samples whose shape differs from the first one in the batch
// are dropped with a warning instead of failing the batch.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Int, Tensor, TensorData},
};

use crate::data::dataset::ImageSample;

/// A (batch, label) pair as produced by the batcher.
pub type ImageBatch<B> = (Tensor<B, 4>, Tensor<B, 1, Int>);

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let [c, h, w] = items.first().map(ImageSample::shape).unwrap_or([0, 0, 0]);

        // ImageDataset guarantees one shape; items handed in directly may not
        let (items, skipped): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|s| s.shape() == [c, h, w]);
        if !skipped.is_empty() {
            tracing::warn!(
                "Dropped {} samples whose shape differs from {:?}",
                skipped.len(),
                [c, h, w]
            );
        }
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels().iter().copied())
            .collect();
        let labels: Vec<i64> = items.iter().map(|s| s.label() as i64).collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, c, h, w]),
            &self.device,
        );
        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );
        (images, labels)
    }
}
