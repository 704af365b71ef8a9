// ============================================================
// Layer 5 - Model, Layers and Parameters
// ============================================================
// The mutable parameter containers the helpers operate on.
//
//   Parameter    - one trainable tensor: a flat Burn tensor on a
//                  device plus its logical shape
//   Layer        - a named unit with a LayerKind tag and an
//                  ordered list of named parameters
//   Model        - ordered layers + device + `restored` flag
//   ParameterMap - ordered name -> Parameter snapshot, the shape
//                  of a state dict on disk
//
// Fully-qualified parameter names are "{layer}.{param}", e.g.
// "conv1.weight" or "rnn.bias_hh_l0".
//
// Reference: Burn Book §3 (Tensors), §5 (Records)

use burn::tensor::{backend::Backend, Tensor, TensorData};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    architecture::{LayerConfig, ModelConfig},
    layer::LayerKind,
};
use crate::error::{Result, UtilError};

/// Number of elements for a shape. The empty shape is a scalar.
pub(crate) fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

// ─── Parameter ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Parameter<B: Backend> {
    shape: Vec<usize>,
    value: Tensor<B, 1>,
}

impl<B: Backend> Parameter<B> {
    pub fn zeros(shape: &[usize], device: &B::Device) -> Self {
        Self {
            shape: shape.to_vec(),
            value: Tensor::zeros([numel(shape)], device),
        }
    }

    pub fn full(shape: &[usize], fill: f32, device: &B::Device) -> Self {
        Self {
            shape: shape.to_vec(),
            value: Tensor::full([numel(shape)], fill, device),
        }
    }

    /// Build a parameter from row-major host values.
    pub fn from_values(shape: &[usize], values: Vec<f32>, device: &B::Device) -> Result<Self> {
        check_len(shape, values.len())?;
        let n = values.len();
        Ok(Self {
            shape: shape.to_vec(),
            value: Tensor::from_data(TensorData::new(values, [n]), device),
        })
    }

    /// Wrap an existing flat tensor, checking it holds `numel(shape)` elements.
    pub fn from_tensor(shape: &[usize], value: Tensor<B, 1>) -> Result<Self> {
        let [len] = value.dims();
        check_len(shape, len)?;
        Ok(Self { shape: shape.to_vec(), value })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    pub fn tensor(&self) -> Tensor<B, 1> {
        self.value.clone()
    }

    pub fn device(&self) -> B::Device {
        self.value.device()
    }

    /// Copy the values to host memory as f32.
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        self.value
            .clone()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| UtilError::Tensor(format!("{e:?}")))
    }

    /// Overwrite all values in place, keeping shape and device.
    pub fn set_values(&mut self, values: Vec<f32>) -> Result<()> {
        check_len(&self.shape, values.len())?;
        let n = values.len();
        let device = self.value.device();
        self.value = Tensor::from_data(TensorData::new(values, [n]), &device);
        Ok(())
    }

    pub fn fill(&mut self, fill: f32) {
        let device = self.value.device();
        self.value = Tensor::full([self.numel()], fill, &device);
    }

    pub fn to_device(self, device: &B::Device) -> Self {
        Self {
            shape: self.shape,
            value: self.value.to_device(device),
        }
    }
}

fn check_len(shape: &[usize], len: usize) -> Result<()> {
    if numel(shape) != len {
        return Err(UtilError::shape(format!(
            "shape {shape:?} needs {} values, got {len}",
            numel(shape)
        )));
    }
    Ok(())
}

// ─── Layer ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Layer<B: Backend> {
    name:   String,
    kind:   LayerKind,
    params: Vec<(String, Parameter<B>)>,
}

impl<B: Backend> Layer<B> {
    /// An empty layer; add parameters with `with_param`.
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, param: Parameter<B>) -> Self {
        self.params.push((name.into(), param));
        self
    }

    /// 2-D convolution: weight [out, in, k, k], bias [out].
    pub fn conv2d(
        name: impl Into<String>,
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        device: &B::Device,
    ) -> Self {
        Self::new(name, LayerKind::Convolution)
            .with_param(
                "weight",
                Parameter::zeros(&[out_channels, in_channels, kernel_size, kernel_size], device),
            )
            .with_param("bias", Parameter::zeros(&[out_channels], device))
    }

    /// Fully connected: weight [out, in], bias [out].
    pub fn linear(
        name: impl Into<String>,
        in_features: usize,
        out_features: usize,
        device: &B::Device,
    ) -> Self {
        Self::new(name, LayerKind::Linear)
            .with_param("weight", Parameter::zeros(&[out_features, in_features], device))
            .with_param("bias", Parameter::zeros(&[out_features], device))
    }

    /// Batch norm affine parameters: weight (scale) starts at 1, bias at 0.
    pub fn batch_norm(name: impl Into<String>, num_features: usize, device: &B::Device) -> Self {
        Self::new(name, LayerKind::BatchNorm)
            .with_param("weight", Parameter::full(&[num_features], 1.0, device))
            .with_param("bias", Parameter::zeros(&[num_features], device))
    }

    /// LSTM with four gates per stacked layer `k`:
    /// weight_ih_lk [4h, in_k], weight_hh_lk [4h, h], bias_ih_lk [4h], bias_hh_lk [4h].
    pub fn lstm(
        name: impl Into<String>,
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        device: &B::Device,
    ) -> Self {
        let gates = 4 * hidden_size;
        let mut layer = Self::new(name, LayerKind::Recurrent);
        for k in 0..num_layers {
            let in_k = if k == 0 { input_size } else { hidden_size };
            layer = layer
                .with_param(format!("weight_ih_l{k}"), Parameter::zeros(&[gates, in_k], device))
                .with_param(format!("weight_hh_l{k}"), Parameter::zeros(&[gates, hidden_size], device))
                .with_param(format!("bias_ih_l{k}"), Parameter::zeros(&[gates], device))
                .with_param(format!("bias_hh_l{k}"), Parameter::zeros(&[gates], device));
        }
        layer
    }

    pub fn other(name: impl Into<String>, shape: &[usize], device: &B::Device) -> Self {
        Self::new(name, LayerKind::Other).with_param("weight", Parameter::zeros(shape, device))
    }

    pub fn from_config(cfg: &LayerConfig, device: &B::Device) -> Self {
        match cfg {
            LayerConfig::Conv2d { name, in_channels, out_channels, kernel_size } => {
                Self::conv2d(name.as_str(), *in_channels, *out_channels, *kernel_size, device)
            }
            LayerConfig::Linear { name, in_features, out_features } => {
                Self::linear(name.as_str(), *in_features, *out_features, device)
            }
            LayerConfig::BatchNorm { name, num_features } => {
                Self::batch_norm(name.as_str(), *num_features, device)
            }
            LayerConfig::Lstm { name, input_size, hidden_size, num_layers } => {
                Self::lstm(name.as_str(), *input_size, *hidden_size, *num_layers, device)
            }
            LayerConfig::Other { name, shape } => Self::other(name.as_str(), shape, device),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn params(&self) -> &[(String, Parameter<B>)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Parameter<B>> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut Parameter<B>> {
        self.params.iter_mut().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    fn to_device(self, device: &B::Device) -> Self {
        Self {
            name:   self.name,
            kind:   self.kind,
            params: self
                .params
                .into_iter()
                .map(|(n, p)| (n, p.to_device(device)))
                .collect(),
        }
    }
}

// ─── ParameterMap ─────────────────────────────────────────────────────────────
/// Ordered name -> parameter mapping. Inserting an existing key
/// replaces the value in place and keeps its position.
#[derive(Debug, Clone)]
pub struct ParameterMap<B: Backend> {
    entries: Vec<(String, Parameter<B>)>,
}

impl<B: Backend> Default for ParameterMap<B> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<B: Backend> ParameterMap<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, param: Parameter<B>) -> Option<Parameter<B>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, param)),
            None => {
                self.entries.push((name, param));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter<B>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter<B>)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Drop the first `count` characters of every key.
    ///
    /// The strip is unconditional: a key that never had the prefix
    /// loses its first `count` characters all the same.
    pub fn strip_key_prefix(self, count: usize) -> Self {
        let mut stripped = Self::new();
        for (name, param) in self.entries {
            stripped.insert(name.chars().skip(count).collect::<String>(), param);
        }
        stripped
    }

    pub fn with_key_prefix(self, prefix: &str) -> Self {
        let mut prefixed = Self::new();
        for (name, param) in self.entries {
            prefixed.insert(format!("{prefix}{name}"), param);
        }
        prefixed
    }
}

impl<B: Backend> IntoIterator for ParameterMap<B> {
    type Item = (String, Parameter<B>);
    type IntoIter = std::vec::IntoIter<(String, Parameter<B>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ─── Model ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Model<B: Backend> {
    layers:   Vec<Layer<B>>,
    device:   B::Device,
    restored: bool,
}

impl<B: Backend> Model<B> {
    pub fn new(device: &B::Device) -> Self {
        Self {
            layers:   Vec::new(),
            device:   device.clone(),
            restored: false,
        }
    }

    /// Build every layer described by `cfg` on `device`.
    pub fn from_config(cfg: &ModelConfig, device: &B::Device) -> Result<Self> {
        let mut model = Self::new(device);
        for layer_cfg in &cfg.layers {
            model.push_layer(Layer::from_config(layer_cfg, device))?;
        }
        Ok(model)
    }

    /// Append a layer. Layer names must be unique.
    pub fn push_layer(&mut self, layer: Layer<B>) -> Result<()> {
        if self.layer(layer.name()).is_some() {
            return Err(UtilError::configuration(format!(
                "duplicate layer name '{}'",
                layer.name()
            )));
        }
        let layer = layer.to_device(&self.device);
        self.layers.push(layer);
        Ok(())
    }

    pub fn with_layer(mut self, layer: Layer<B>) -> Result<Self> {
        self.push_layer(layer)?;
        Ok(self)
    }

    pub fn layers(&self) -> &[Layer<B>] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer<B>] {
        &mut self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer<B>> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub(crate) fn mark_restored(&mut self) {
        self.restored = true;
    }

    pub fn num_params(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|l| l.params().iter())
            .map(|(_, p)| p.numel())
            .sum()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.layers
            .iter()
            .flat_map(|l| l.params().iter().map(move |(n, _)| format!("{}.{}", l.name(), n)))
            .collect()
    }

    /// Snapshot of every parameter under its fully-qualified name.
    pub fn state_dict(&self) -> ParameterMap<B> {
        let mut map = ParameterMap::new();
        for layer in &self.layers {
            for (name, param) in layer.params() {
                map.insert(format!("{}.{}", layer.name(), name), param.clone());
            }
        }
        map
    }

    /// Replace every parameter from `map`, matching names exactly.
    ///
    /// Missing keys, unexpected keys and shape mismatches are all
    /// rejected before any parameter is written.
    pub fn load_state_dict(&mut self, map: ParameterMap<B>) -> Result<()> {
        let expected: HashSet<String> = self.parameter_names().into_iter().collect();
        let mut incoming: HashMap<String, Parameter<B>> = map.into_iter().collect();

        let mut missing: Vec<&str> = expected
            .iter()
            .filter(|n| !incoming.contains_key(n.as_str()))
            .map(String::as_str)
            .collect();
        let mut unexpected: Vec<&str> = incoming
            .keys()
            .filter(|n| !expected.contains(n.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            missing.sort_unstable();
            unexpected.sort_unstable();
            return Err(UtilError::Mismatch(format!(
                "missing keys {missing:?}, unexpected keys {unexpected:?}"
            )));
        }

        for layer in &self.layers {
            for (name, param) in layer.params() {
                let full = format!("{}.{}", layer.name(), name);
                let source = &incoming[&full];
                if source.shape() != param.shape() {
                    return Err(UtilError::Mismatch(format!(
                        "'{full}' has shape {:?} in the mapping but {:?} in the model",
                        source.shape(),
                        param.shape()
                    )));
                }
            }
        }

        let device = self.device.clone();
        for layer in &mut self.layers {
            let prefix = layer.name.clone();
            for (name, param) in &mut layer.params {
                if let Some(source) = incoming.remove(&format!("{prefix}.{name}")) {
                    *param = source.to_device(&device);
                }
            }
        }
        Ok(())
    }

    /// Move every parameter to `device` and remember it as the model's device.
    pub fn to_device(self, device: &B::Device) -> Self {
        Self {
            layers:   self.layers.into_iter().map(|l| l.to_device(device)).collect(),
            device:   device.clone(),
            restored: self.restored,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn small_model() -> Model<TestBackend> {
        let device = Default::default();
        Model::new(&device)
            .with_layer(Layer::conv2d("conv1", 1, 2, 3, &device))
            .unwrap()
            .with_layer(Layer::batch_norm("bn1", 2, &device))
            .unwrap()
            .with_layer(Layer::linear("fc", 8, 4, &device))
            .unwrap()
    }

    #[test]
    fn test_parameter_names_are_qualified_and_ordered() {
        let model = small_model();
        assert_eq!(
            model.parameter_names(),
            vec!["conv1.weight", "conv1.bias", "bn1.weight", "bn1.bias", "fc.weight", "fc.bias"]
        );
        assert_eq!(model.num_params(), 18 + 2 + 2 + 2 + 32 + 4);
    }

    #[test]
    fn test_duplicate_layer_names_rejected() {
        let device = Default::default();
        let result = small_model().with_layer(Layer::linear("fc", 1, 1, &device));
        assert!(matches!(result, Err(UtilError::Configuration(_))));
    }

    #[test]
    fn test_lstm_layout() {
        let device = Default::default();
        let layer = Layer::<TestBackend>::lstm("rnn", 3, 5, 2, &device);
        assert_eq!(layer.params().len(), 8);
        assert_eq!(layer.param("weight_ih_l0").unwrap().shape(), &[20, 3]);
        assert_eq!(layer.param("weight_ih_l1").unwrap().shape(), &[20, 5]);
        assert_eq!(layer.param("bias_hh_l1").unwrap().shape(), &[20]);
    }

    #[test]
    fn test_from_values_checks_length() {
        let device = Default::default();
        let err = Parameter::<TestBackend>::from_values(&[2, 2], vec![1.0; 3], &device);
        assert!(matches!(err, Err(UtilError::Shape(_))));
    }

    #[test]
    fn test_state_dict_round_trip_is_exact() {
        let device = Default::default();
        let mut source = small_model();
        let values: Vec<f32> = (0..32).map(|i| i as f32 * 0.1 - 1.7).collect();
        source.layers_mut()[2]
            .param_mut("weight")
            .unwrap()
            .set_values(values.clone())
            .unwrap();

        let mut target = small_model();
        target.load_state_dict(source.state_dict()).unwrap();
        let loaded = target.layer("fc").unwrap().param("weight").unwrap().to_vec().unwrap();
        assert_eq!(loaded, values);
        assert_eq!(*target.device(), device);
    }

    #[test]
    fn test_load_state_dict_reports_missing_and_unexpected() {
        let mut model = small_model();
        let mut map = model.state_dict();
        map = map.with_key_prefix("x");
        let err = model.load_state_dict(map).unwrap_err().to_string();
        assert!(err.contains("missing keys"));
        assert!(err.contains("xconv1.weight"));
    }

    #[test]
    fn test_load_state_dict_rejects_shape_mismatch_without_writing() {
        let device = Default::default();
        let mut model = small_model();
        let mut map = model.state_dict();
        map.insert("conv1.bias", Parameter::full(&[2], 9.0, &device));
        map.insert("fc.bias", Parameter::zeros(&[5], &device));

        assert!(matches!(model.load_state_dict(map), Err(UtilError::Mismatch(_))));
        let bias = model.layer("conv1").unwrap().param("bias").unwrap().to_vec().unwrap();
        assert_eq!(bias, vec![0.0, 0.0]);
    }

    #[test]
    fn test_strip_key_prefix_counts_characters() {
        let device = Default::default();
        let mut map = ParameterMap::<TestBackend>::new();
        map.insert("module.fc.weight", Parameter::zeros(&[1], &device));
        map.insert("fc.bias", Parameter::zeros(&[1], &device));
        let stripped = map.strip_key_prefix(7);
        assert_eq!(stripped.keys().collect::<Vec<_>>(), vec!["fc.weight", ""]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let device = Default::default();
        let mut map = ParameterMap::<TestBackend>::new();
        map.insert("a", Parameter::zeros(&[1], &device));
        map.insert("b", Parameter::zeros(&[1], &device));
        assert!(map.insert("a", Parameter::full(&[1], 2.0, &device)).is_some());
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a").unwrap().to_vec().unwrap(), vec![2.0]);
    }
}
