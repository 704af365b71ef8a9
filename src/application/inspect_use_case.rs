// ============================================================
// Layer 2 - InspectUseCase
// ============================================================
// Reads a checkpoint without a model and summarises each
// parameter under the name a restore would match it by.

use anyhow::{bail, Result};
use burn::tensor::backend::Backend;
use std::path::PathBuf;

use crate::infra::checkpoint::{load_parameter_map, PREFIX_LEN};
use crate::ml::setup::TrainBackend;

/// One row of the `inspect` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    pub name:  String,
    pub shape: Vec<usize>,
    pub min:   f32,
    pub max:   f32,
    pub mean:  f32,
}

pub struct InspectUseCase {
    checkpoint: PathBuf,
}

impl InspectUseCase {
    pub fn new(checkpoint: impl Into<PathBuf>) -> Self {
        Self { checkpoint: checkpoint.into() }
    }

    pub fn execute(&self) -> Result<Vec<ParamSummary>> {
        self.execute_on::<TrainBackend>()
    }

    pub fn execute_on<B: Backend>(&self) -> Result<Vec<ParamSummary>> {
        if !self.checkpoint.exists() {
            bail!("No checkpoint at '{}'", self.checkpoint.display());
        }

        let device = B::Device::default();
        let map = load_parameter_map::<B>(&self.checkpoint, &device)?.strip_key_prefix(PREFIX_LEN);

        let mut rows = Vec::with_capacity(map.len());
        for (name, param) in map.iter() {
            let values = param.to_vec()?;
            let (min, max) = values
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let mean = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f32>() / values.len() as f32
            };
            rows.push(ParamSummary {
                name: name.to_string(),
                shape: param.shape().to_vec(),
                min,
                max,
                mean,
            });
        }

        tracing::info!("Checkpoint '{}' holds {} parameters", self.checkpoint.display(), rows.len());
        Ok(rows)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::save_checkpoint;
    use crate::ml::model::{Layer, Model};
    use burn::backend::NdArray;

    #[test]
    fn test_lists_stripped_names_and_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netD.mpk");
        let device = Default::default();
        let model = Model::<NdArray>::new(&device)
            .with_layer(Layer::batch_norm("bn", 3, &device))
            .unwrap();
        save_checkpoint(&model, &path).unwrap();

        let rows = InspectUseCase::new(&path).execute_on::<NdArray>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "bn.weight");
        assert_eq!(rows[0].shape, vec![3]);
        assert_eq!((rows[0].min, rows[0].max, rows[0].mean), (1.0, 1.0, 1.0));
        assert_eq!(rows[1].name, "bn.bias");
        assert_eq!(rows[1].mean, 0.0);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(InspectUseCase::new(dir.path().join("nope.mpk")).execute_on::<NdArray>().is_err());
    }
}
