// ============================================================
// Layer 6 - Checkpoint Save / Restore
// ============================================================
// Saves and restores parameter mappings using Burn's record
// machinery (NamedMpkBytesRecorder, full precision).
//
// File contents: one CheckpointRecord holding, in order,
//   names   - fully-qualified parameter names
//   shapes  - logical shape per parameter
//   tensors - flat f32 tensors
//
// Checkpoints written by data-parallel training carry a
// "module." prefix on every key. `save_checkpoint` writes that
// prefix and `restore_model` strips the first 7 characters of
// every key before matching. The strip does not check that the
// prefix is actually there.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use burn::{
    module::Param,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Record, Recorder},
    tensor::{backend::Backend, Tensor},
};
use std::{fs, path::Path};

use crate::error::{Result, UtilError};
use crate::infra::fs::mkdir;
use crate::ml::model::{Model, Parameter, ParameterMap};

/// Key prefix added by data-parallel wrappers.
pub const DATA_PARALLEL_PREFIX: &str = "module.";

/// Number of characters stripped from every key on restore.
pub const PREFIX_LEN: usize = 7;

type CheckpointRecorder = NamedMpkBytesRecorder<FullPrecisionSettings>;

/// On-disk form of a parameter mapping.
#[derive(Record)]
pub struct CheckpointRecord<B: Backend> {
    pub names:   Vec<String>,
    pub shapes:  Vec<Vec<usize>>,
    pub tensors: Vec<Param<Tensor<B, 1>>>,
}

/// Save `model`'s parameters with every key prefixed by "module.".
pub fn save_checkpoint<B: Backend>(model: &Model<B>, path: impl AsRef<Path>) -> Result<()> {
    save_parameter_map(model.state_dict().with_key_prefix(DATA_PARALLEL_PREFIX), path)
}

/// Save a mapping exactly as given, keys untouched.
pub fn save_parameter_map<B: Backend>(map: ParameterMap<B>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let count = map.len();

    let mut names   = Vec::with_capacity(count);
    let mut shapes  = Vec::with_capacity(count);
    let mut tensors = Vec::with_capacity(count);
    for (name, param) in map {
        names.push(name);
        shapes.push(param.shape().to_vec());
        tensors.push(Param::from_tensor(param.tensor()));
    }

    let record = CheckpointRecord { names, shapes, tensors };
    let bytes = CheckpointRecorder::default()
        .record(record, ())
        .map_err(|e| UtilError::Tensor(format!("cannot serialise checkpoint: {e:?}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        mkdir(parent)?;
    }
    fs::write(path, bytes)?;

    tracing::debug!("Saved {} parameters to '{}'", count, path.display());
    Ok(())
}

/// Read a mapping from `path` onto `device` without applying it.
pub fn load_parameter_map<B: Backend>(
    path: impl AsRef<Path>,
    device: &B::Device,
) -> Result<ParameterMap<B>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| UtilError::load(path, e))?;

    let record: CheckpointRecord<B> = CheckpointRecorder::default()
        .load(bytes, device)
        .map_err(|e| UtilError::load(path, format!("{e:?}")))?;

    let CheckpointRecord { names, shapes, tensors } = record;
    if names.len() != shapes.len() || names.len() != tensors.len() {
        return Err(UtilError::load(
            path,
            format!(
                "record has {} names, {} shapes and {} tensors",
                names.len(),
                shapes.len(),
                tensors.len()
            ),
        ));
    }

    let mut map = ParameterMap::new();
    for ((name, shape), tensor) in names.into_iter().zip(shapes).zip(tensors) {
        let param = Parameter::from_tensor(&shape, tensor.val())
            .map_err(|e| UtilError::load(path, format!("'{name}': {e}")))?;
        map.insert(name, param);
    }
    Ok(map)
}

/// Restore `model` from the checkpoint at `path`.
///
/// Returns `Ok(false)` and leaves the model alone when the path does
/// not exist. Unreadable files and key/shape mismatches after the
/// prefix strip are `UtilError::Load`.
pub fn restore_model<B: Backend>(model: &mut Model<B>, path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No checkpoint at '{}', starting fresh", path.display());
        return Ok(false);
    }

    let map = load_parameter_map::<B>(path, model.device())?.strip_key_prefix(PREFIX_LEN);
    model
        .load_state_dict(map)
        .map_err(|e| UtilError::load(path, e))?;
    model.mark_restored();

    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::info!("Restore model from: {}", absolute.display());
    Ok(true)
}
