// ============================================================
// Layer 3 - Model Architecture Config
// ============================================================
// A JSON description of the layers a model is built from.
// The `init` and `render` commands read it, and `init` saves a
// copy next to the checkpoint so the same model can be rebuilt.
//
// Example:
//   {
//     "layers": [
//       { "kind": "conv2d", "name": "conv1", "in_channels": 3,
//         "out_channels": 16, "kernel_size": 3 },
//       { "kind": "batch_norm", "name": "bn1", "num_features": 16 },
//       { "kind": "linear", "name": "fc", "in_features": 64,
//         "out_features": 10 }
//     ]
//   }

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::domain::layer::LayerKind;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub layers: Vec<LayerConfig>,
}

/// One layer entry, tagged by `kind` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerConfig {
    Conv2d {
        name:         String,
        in_channels:  usize,
        out_channels: usize,
        kernel_size:  usize,
    },
    Linear {
        name:         String,
        in_features:  usize,
        out_features: usize,
    },
    BatchNorm {
        name:         String,
        num_features: usize,
    },
    Lstm {
        name:        String,
        input_size:  usize,
        hidden_size: usize,
        #[serde(default = "default_num_layers")]
        num_layers:  usize,
    },
    /// Any other layer with a single weight of fixed shape
    /// (embeddings, layer norms, ...). Initializers leave it alone.
    Other {
        name:  String,
        shape: Vec<usize>,
    },
}

fn default_num_layers() -> usize {
    1
}

impl LayerConfig {
    pub fn name(&self) -> &str {
        match self {
            LayerConfig::Conv2d { name, .. }
            | LayerConfig::Linear { name, .. }
            | LayerConfig::BatchNorm { name, .. }
            | LayerConfig::Lstm { name, .. }
            | LayerConfig::Other { name, .. } => name,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            LayerConfig::Conv2d { .. }    => LayerKind::Convolution,
            LayerConfig::Linear { .. }    => LayerKind::Linear,
            LayerConfig::BatchNorm { .. } => LayerKind::BatchNorm,
            LayerConfig::Lstm { .. }      => LayerKind::Recurrent,
            LayerConfig::Other { .. }     => LayerKind::Other,
        }
    }
}

impl ModelConfig {
    pub fn new(layers: Vec<LayerConfig>) -> Self {
        Self { layers }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_tagged_layers() {
        let json = r#"{
            "layers": [
                { "kind": "conv2d", "name": "conv1", "in_channels": 1,
                  "out_channels": 4, "kernel_size": 3 },
                { "kind": "lstm", "name": "rnn", "input_size": 8, "hidden_size": 5 }
            ]
        }"#;
        let cfg: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.layers.len(), 2);
        assert_eq!(cfg.layers[0].kind(), LayerKind::Convolution);
        assert_eq!(cfg.layers[1].name(), "rnn");
        // num_layers falls back to 1 when omitted
        assert!(matches!(cfg.layers[1], LayerConfig::Lstm { num_layers: 1, .. }));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config.json");
        let cfg = ModelConfig::new(vec![LayerConfig::BatchNorm {
            name:         "bn".into(),
            num_features: 3,
        }]);
        cfg.save(&path).unwrap();
        assert_eq!(ModelConfig::load(&path).unwrap(), cfg);
    }
}
