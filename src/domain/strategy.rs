// ============================================================
// Layer 3 - Initialization Strategy
// ============================================================
// The five named weight-initialization strategies.
//
// Strategy names arrive as strings (CLI flags, config files),
// so parsing is where unknown names are rejected. Nothing in
// the model is touched before a name has been parsed.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::UtilError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Conv/Linear weights uniform over [0, 0.02)
    Normal,
    /// Xavier (Glorot) normal, gain 1
    Xavier,
    /// Kaiming (He) normal, a = 0, fan-in mode
    Kaiming,
    /// Orthogonal, gain 1
    Orthogonal,
    /// Orthogonal gate matrices for recurrent layers, xavier for linear
    OrthogonalRnn,
}

impl InitStrategy {
    pub const ALL: [InitStrategy; 5] = [
        InitStrategy::Normal,
        InitStrategy::Xavier,
        InitStrategy::Kaiming,
        InitStrategy::Orthogonal,
        InitStrategy::OrthogonalRnn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InitStrategy::Normal        => "normal",
            InitStrategy::Xavier        => "xavier",
            InitStrategy::Kaiming       => "kaiming",
            InitStrategy::Orthogonal    => "orthogonal",
            InitStrategy::OrthogonalRnn => "orthogonal_rnn",
        }
    }
}

impl Default for InitStrategy {
    fn default() -> Self {
        InitStrategy::Normal
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InitStrategy {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InitStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                UtilError::configuration(format!(
                    "initialization method [{s}] is not implemented"
                ))
            })
    }
}
