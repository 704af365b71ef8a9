// ============================================================
// Layer 2 - RenderUseCase
// ============================================================
// Draws the first filter of a convolution layer as a picture:
//
//   Step 1: Rebuild the model from its architecture  (Layer 3)
//   Step 2: Restore the checkpoint                   (Layer 6)
//   Step 3: Slice filter 0 of the layer's weight     (Layer 5)
//   Step 4: Rescale to [-1, 1], denormalize          (Layer 5)
//   Step 5: Convert and save as a 128x128 image      (Layer 5/6)
//
// Filters with other than 1 or 3 input channels are drawn from
// their first channel only.

use anyhow::{anyhow, bail, Context, Result};
use burn::tensor::{backend::Backend, Tensor, TensorData};
use std::path::PathBuf;

use crate::domain::{architecture::ModelConfig, layer::LayerKind};
use crate::infra::{checkpoint::restore_model, image_store::save_image};
use crate::ml::{
    image::{denormalize, tensor_to_image},
    model::Model,
    setup::TrainBackend,
};

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub config_path: PathBuf,
    pub checkpoint:  PathBuf,
    pub layer:       String,
    pub out:         PathBuf,
    pub std:         f32,
    pub mean:        f32,
}

pub struct RenderUseCase {
    config: RenderConfig,
}

impl RenderUseCase {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PathBuf> {
        self.execute_on::<TrainBackend>()
    }

    pub fn execute_on<B: Backend>(&self) -> Result<PathBuf> {
        let cfg = &self.config;

        // ── Step 1 + 2: Model ────────────────────────────────────────────────
        let arch = ModelConfig::load(&cfg.config_path).with_context(|| {
            format!("Cannot read architecture '{}'", cfg.config_path.display())
        })?;
        let device = B::Device::default();
        let mut model = Model::<B>::from_config(&arch, &device)?;
        if !restore_model(&mut model, &cfg.checkpoint)? {
            bail!("No checkpoint at '{}'", cfg.checkpoint.display());
        }

        // ── Step 3: First filter ─────────────────────────────────────────────
        let layer = model
            .layer(&cfg.layer)
            .ok_or_else(|| anyhow!("Model has no layer '{}'", cfg.layer))?;
        if layer.kind() != LayerKind::Convolution {
            bail!("Layer '{}' is {}, not a convolution", cfg.layer, layer.kind());
        }
        let weight = layer
            .param("weight")
            .ok_or_else(|| anyhow!("Layer '{}' has no weight", cfg.layer))?;
        let &[_, in_channels, kh, kw] = weight.shape() else {
            bail!("Unexpected convolution weight shape {:?}", weight.shape());
        };

        let channels = if in_channels == 3 { 3 } else { 1 };
        let filter = first_filter(&weight.to_vec()?, channels * kh * kw)
            .ok_or_else(|| anyhow!("Layer '{}' has no filters", cfg.layer))?;

        // ── Step 4: Display range ────────────────────────────────────────────
        let filter = rescale_symmetric(&filter);
        let tensor = Tensor::<B, 3>::from_data(TensorData::new(filter, [channels, kh, kw]), &device);
        let tensor = denormalize(tensor, cfg.std, cfg.mean);

        // ── Step 5: Save ─────────────────────────────────────────────────────
        let image = tensor_to_image(tensor)?;
        save_image(&image, &cfg.out)
            .with_context(|| format!("Cannot write image '{}'", cfg.out.display()))?;

        tracing::info!("Rendered '{}' filter 0 to '{}'", cfg.layer, cfg.out.display());
        Ok(cfg.out.clone())
    }
}

/// The leading `n` weights, or `None` when the layer holds fewer or `n` is 0.
fn first_filter(weights: &[f32], n: usize) -> Option<Vec<f32>> {
    weights.get(..n).filter(|f| !f.is_empty()).map(<[f32]>::to_vec)
}

/// Min-max rescale into [-1, 1]. A constant filter maps to all zeros.
fn rescale_symmetric(values: &[f32]) -> Vec<f32> {
    let (lo, hi) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if span.is_nan() || span <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - lo) / span * 2.0 - 1.0).collect()
}
