// ============================================================
// Layer 3 - Layer Kind
// ============================================================
// Closed set of layer families that the initializers know about.
// Every layer carries exactly one tag, and the initializers
// dispatch on it with a `match` instead of inspecting type names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The family a layer belongs to.
///
/// All batch-norm flavours (1d, 2d, 3d) share `BatchNorm`,
/// and every recurrent cell with gate matrices (LSTM-style)
/// is `Recurrent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Convolution,
    Linear,
    BatchNorm,
    Recurrent,
    Other,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Convolution => "convolution",
            LayerKind::Linear      => "linear",
            LayerKind::BatchNorm   => "batch_norm",
            LayerKind::Recurrent   => "recurrent",
            LayerKind::Other       => "other",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
