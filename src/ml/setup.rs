// ============================================================
// Layer 5 - Model Bootstrap
// ============================================================
// What a training driver calls once before its first step:
//
//   init_random_seed  → pick (or accept) a seed, seed the backend,
//                       hand back an explicit RNG for the caller
//   init_model        → initialize weights, optionally restore a
//                       checkpoint, place the model on the device
//
// Backend selection happens at compile time: `--features wgpu`
// trains on the GPU, the default build runs on NdArray (CPU).
// WGPU autotuning is the backend's default and needs no switch.

use burn::tensor::backend::Backend;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;

use crate::domain::strategy::InitStrategy;
use crate::error::Result;
use crate::infra::checkpoint::restore_model;
use crate::ml::{initializer::init_weights, model::Model};

#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::NdArray;

/// Range a random seed is drawn from when none is given.
pub const SEED_RANGE: std::ops::RangeInclusive<u64> = 1..=10_000;

/// Resolve the run's seed, seed backend `B`, and build the caller's RNG.
pub fn init_random_seed<B: Backend>(manual_seed: Option<u64>) -> (u64, StdRng) {
    let seed = manual_seed.unwrap_or_else(|| rand::thread_rng().gen_range(SEED_RANGE));
    tracing::info!("use random seed: {}", seed);

    B::seed(seed);
    (seed, StdRng::seed_from_u64(seed))
}

/// Prepare `model` for training.
///
/// Steps, in order:
///   1. `init`: apply `strategy` to every layer
///   2. `restore`: load the checkpoint if the path exists
///   3. move the model to the backend's default device
pub fn init_model<B: Backend, R: Rng + ?Sized>(
    mut model: Model<B>,
    restore: Option<&Path>,
    strategy: InitStrategy,
    init: bool,
    rng: &mut R,
) -> Result<Model<B>> {
    if init {
        init_weights(&mut model, strategy, rng)?;
    }

    if let Some(path) = restore {
        restore_model(&mut model, path)?;
    }

    let device = B::Device::default();
    let model = model.to_device(&device);
    tracing::info!(
        "Model ready on {} ({:?}): {} parameters, restored = {}",
        B::name(),
        device,
        model.num_params(),
        model.is_restored()
    );
    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::save_checkpoint;
    use crate::ml::model::Layer;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn model() -> Model<TestBackend> {
        let device = Default::default();
        Model::new(&device)
            .with_layer(Layer::conv2d("conv1", 1, 2, 3, &device)).unwrap()
            .with_layer(Layer::linear("fc", 8, 2, &device)).unwrap()
    }

    fn values(model: &Model<TestBackend>) -> Vec<f32> {
        model
            .state_dict()
            .iter()
            .flat_map(|(_, p)| p.to_vec().unwrap())
            .collect()
    }

    #[test]
    fn test_manual_seed_is_kept_and_deterministic() {
        let (seed_a, mut rng_a) = init_random_seed::<TestBackend>(Some(42));
        let (seed_b, mut rng_b) = init_random_seed::<TestBackend>(Some(42));
        assert_eq!((seed_a, seed_b), (42, 42));
        assert_eq!(rng_a.gen::<u64>(), rng_b.gen::<u64>());
    }

    #[test]
    fn test_drawn_seed_is_in_range() {
        for _ in 0..20 {
            let (seed, _) = init_random_seed::<TestBackend>(None);
            assert!(SEED_RANGE.contains(&seed));
        }
    }

    #[test]
    fn test_skip_init_leaves_weights() {
        let before = values(&model());
        let (_, mut rng) = init_random_seed::<TestBackend>(Some(1));
        let ready = init_model(model(), None, InitStrategy::Xavier, false, &mut rng).unwrap();
        assert_eq!(values(&ready), before);
        assert!(!ready.is_restored());
    }

    #[test]
    fn test_restore_overrides_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netD.mpk");

        let (_, mut rng) = init_random_seed::<TestBackend>(Some(7));
        let trained = init_model(model(), None, InitStrategy::Kaiming, true, &mut rng).unwrap();
        save_checkpoint(&trained, &path).unwrap();

        let resumed =
            init_model(model(), Some(path.as_path()), InitStrategy::Normal, true, &mut rng).unwrap();
        assert!(resumed.is_restored());
        assert_eq!(values(&resumed), values(&trained));
    }

    #[test]
    fn test_missing_restore_path_is_fresh_start() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut rng) = init_random_seed::<TestBackend>(Some(3));
        let ready = init_model(
            model(),
            Some(dir.path().join("missing.mpk").as_path()),
            InitStrategy::Orthogonal,
            true,
            &mut rng,
        )
        .unwrap();
        assert!(!ready.is_restored());
    }
}
