// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
//   1. `init`    - build + initialize a model, save a checkpoint
//   2. `inspect` - list a checkpoint's parameters
//   3. `render`  - draw a convolution filter
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InitArgs, InspectArgs, RenderArgs};

#[derive(Parser, Debug)]
#[command(
    name = "gan-train-utils",
    version,
    about = "Initialize, restore, inspect and visualise GAN / classifier checkpoints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init(args)    => run_init(args),
            Commands::Inspect(args) => run_inspect(args),
            Commands::Render(args)  => run_render(args),
        }
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    use crate::application::init_use_case::InitUseCase;

    tracing::info!("Building model from: {}", args.config.display());
    let report = InitUseCase::new(args.into()).execute()?;

    println!("Checkpoint saved to {}", report.checkpoint.display());
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let rows = InspectUseCase::new(args.checkpoint).execute()?;

    println!("{:<32} {:<18} {:>10} {:>10} {:>10}", "name", "shape", "min", "max", "mean");
    for row in &rows {
        println!(
            "{:<32} {:<18} {:>10.4} {:>10.4} {:>10.4}",
            row.name,
            format!("{:?}", row.shape),
            row.min,
            row.max,
            row.mean
        );
    }
    println!("\n{} parameters", rows.len());
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    use crate::application::render_use_case::RenderUseCase;

    let out = RenderUseCase::new(args.into()).execute()?;
    println!("Filter image saved to {}", out.display());
    Ok(())
}
