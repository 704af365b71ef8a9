// ============================================================
// Layer 2 - InitUseCase
// ============================================================
// Builds a fresh (or resumed) model and writes its checkpoint:
//
//   Step 1: Parse the strategy name       (Layer 3 - domain)
//   Step 2: Read the architecture config  (Layer 3 - domain)
//   Step 3: Open the run log              (Layer 6 - infra)
//   Step 4: Seed the backend + RNG        (Layer 5 - ml)
//   Step 5: Init / restore / place model  (Layer 5 - ml)
//   Step 6: Save checkpoint + config      (Layer 6 - infra)
//
// The architecture is saved next to the checkpoint as
// "<stem>.arch.json" so `render` can rebuild the same model.

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use std::{
    io::{self, Stdout, Write},
    path::PathBuf,
};

use crate::domain::{architecture::ModelConfig, strategy::InitStrategy};
use crate::infra::{
    checkpoint::save_checkpoint,
    logger::{Logger, OpenMode},
};
use crate::ml::{
    model::Model,
    setup::{init_model, init_random_seed, TrainBackend},
};

// ─── Init Configuration ──────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct InitConfig {
    pub config_path: PathBuf,
    pub out:         PathBuf,
    pub strategy:    String,
    pub seed:        Option<u64>,
    pub restore:     Option<PathBuf>,
    pub skip_init:   bool,
    pub log_file:    Option<PathBuf>,
    pub log_mode:    String,
}

/// What a finished `init` run produced.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub seed:       u64,
    pub num_params: usize,
    pub restored:   bool,
    pub checkpoint: PathBuf,
    pub arch_file:  PathBuf,
}

// ─── InitUseCase ──────────────────────────────────────────────────────────────
/// The run summary goes to `terminal` (stdout by default) and to the log file.
pub struct InitUseCase<W: Write = Stdout> {
    config:   InitConfig,
    terminal: W,
}

impl InitUseCase<Stdout> {
    pub fn new(config: InitConfig) -> Self {
        Self::with_terminal(config, io::stdout())
    }
}

impl<W: Write> InitUseCase<W> {
    pub fn with_terminal(config: InitConfig, terminal: W) -> Self {
        Self { config, terminal }
    }

    pub fn terminal(&self) -> &W {
        &self.terminal
    }

    /// Run on the compiled-in training backend.
    pub fn execute(&mut self) -> Result<InitReport> {
        self.execute_on::<TrainBackend>()
    }

    pub fn execute_on<B: Backend>(&mut self) -> Result<InitReport> {
        let cfg = &self.config;

        // ── Step 1: Strategy ─────────────────────────────────────────────────
        // Unknown names stop the run before anything is built.
        let strategy: InitStrategy = cfg.strategy.parse()?;

        // ── Step 2: Architecture ─────────────────────────────────────────────
        let arch = ModelConfig::load(&cfg.config_path).with_context(|| {
            format!("Cannot read architecture '{}'", cfg.config_path.display())
        })?;
        tracing::info!("Loaded architecture with {} layers", arch.layers.len());

        // ── Step 3: Run log ──────────────────────────────────────────────────
        let mut logger = Logger::with_terminal(&mut self.terminal);
        if let Some(log_file) = &cfg.log_file {
            let mode: OpenMode = cfg.log_mode.parse()?;
            logger
                .open(log_file, mode)
                .with_context(|| format!("Cannot open log file '{}'", log_file.display()))?;
        }

        // ── Step 4: Seed ─────────────────────────────────────────────────────
        let (seed, mut rng) = init_random_seed::<B>(cfg.seed);

        // ── Step 5: Model ────────────────────────────────────────────────────
        let device = B::Device::default();
        let model = Model::<B>::from_config(&arch, &device)?;
        let model = init_model(
            model,
            cfg.restore.as_deref(),
            strategy,
            !cfg.skip_init,
            &mut rng,
        )?;

        // ── Step 6: Save ─────────────────────────────────────────────────────
        save_checkpoint(&model, &cfg.out)
            .with_context(|| format!("Cannot write checkpoint '{}'", cfg.out.display()))?;
        let arch_file = cfg.out.with_extension("arch.json");
        arch.save(&arch_file)?;

        let report = InitReport {
            seed,
            num_params: model.num_params(),
            restored:   model.is_restored(),
            checkpoint: cfg.out.clone(),
            arch_file,
        };

        writeln!(logger, "seed:        {}", report.seed)?;
        writeln!(logger, "strategy:    {}", if cfg.skip_init { "skipped" } else { strategy.name() })?;
        writeln!(logger, "restored:    {}", report.restored)?;
        writeln!(logger, "parameters:  {}", report.num_params)?;
        writeln!(logger, "checkpoint:  {}", report.checkpoint.display())?;
        writeln!(logger, "arch:        {}", report.arch_file.display())?;

        Ok(report)
    }
}
