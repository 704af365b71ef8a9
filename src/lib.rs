// ============================================================
// gan-train-utils
// ============================================================
// Training-support helpers for GAN and classifier experiments
// on Burn: weight initialization, checkpoint restore, image
// conversion, a dual-sink logger and endless data iteration.
//
// Layers:
//   1. cli          - clap front end
//   2. application  - one use case per command
//   3. domain       - plain types (layer kinds, strategies, config)
//   4. data         - datasets, batcher, infinite iteration
//   5. ml           - model containers, initializers, conversions
//   6. infra        - checkpoints, logger, image files, directories

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
pub mod error;

pub use error::{Result, UtilError};
