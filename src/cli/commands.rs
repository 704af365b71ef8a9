// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the `init`, `inspect` and `render` subcommands and
// converts their flags into application-layer configs.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{init_use_case::InitConfig, render_use_case::RenderConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a model from an architecture file, initialize it and save a checkpoint
    Init(InitArgs),

    /// List the parameters stored in a checkpoint
    Inspect(InspectArgs),

    /// Save the first filter of a convolution layer as an image
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Architecture JSON describing the layers
    #[arg(long)]
    pub config: PathBuf,

    /// Where to write the checkpoint
    #[arg(long, default_value = "checkpoints/net.mpk")]
    pub out: PathBuf,

    /// normal | xavier | kaiming | orthogonal | orthogonal_rnn
    #[arg(long, default_value = "normal")]
    pub strategy: String,

    /// Random seed; drawn from 1..=10000 when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Checkpoint to resume from (skipped if the file does not exist)
    #[arg(long)]
    pub restore: Option<PathBuf>,

    /// Keep the constructor's values instead of running the initializer
    #[arg(long)]
    pub skip_init: bool,

    /// Also write the run summary to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log file mode: w (truncate) or a (append)
    #[arg(long, default_value = "w")]
    pub log_mode: String,
}

impl From<InitArgs> for InitConfig {
    fn from(a: InitArgs) -> Self {
        InitConfig {
            config_path: a.config,
            out:         a.out,
            strategy:    a.strategy,
            seed:        a.seed,
            restore:     a.restore,
            skip_init:   a.skip_init,
            log_file:    a.log_file,
            log_mode:    a.log_mode,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Checkpoint file to read
    #[arg(long)]
    pub checkpoint: PathBuf,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Architecture JSON the checkpoint was built from
    #[arg(long)]
    pub config: PathBuf,

    #[arg(long)]
    pub checkpoint: PathBuf,

    /// Name of a convolution layer
    #[arg(long)]
    pub layer: String,

    /// Output image; format follows the extension
    #[arg(long, default_value = "filter.png")]
    pub out: PathBuf,

    /// Normalization std to invert
    #[arg(long, default_value_t = 0.5)]
    pub std: f32,

    /// Normalization mean to invert
    #[arg(long, default_value_t = 0.5)]
    pub mean: f32,
}

impl From<RenderArgs> for RenderConfig {
    fn from(a: RenderArgs) -> Self {
        RenderConfig {
            config_path: a.config,
            checkpoint:  a.checkpoint,
            layer:       a.layer,
            out:         a.out,
            std:         a.std,
            mean:        a.mean,
        }
    }
}
