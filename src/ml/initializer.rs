// ============================================================
// Layer 5 - Weight Initialization
// ============================================================
// Applies one of the five InitStrategy rule sets to every layer
// of a model, choosing per-layer behaviour from its LayerKind.
//
//   strategy        Convolution    Linear            BatchNorm
//   normal          U[0, 0.02)     U[0, 0.02), b=0   U[0.02, 1), b=0
//   xavier          N(0, xavier)   N(0, xavier), b=0 U[0.02, 1), b=0
//   kaiming         N(0, he)       N(0, he), b=0     U[0.02, 1), b=0
//   orthogonal      orth           orth, b=0         U[0.02, 1), b=0
//   orthogonal_rnn  -              N(0, xavier), b=0 U[0.02, 1), b=0
//
// orthogonal_rnn also sets the first gate block of recurrent
// layers: weight_ih_l0 / weight_hh_l0 orthogonal, bias_ih_l0 /
// bias_hh_l0 = 1.
//
// weights_init_dcgan is the separate DCGAN default (conv N(0, 0.02),
// batch norm N(1, 0.02), b=0); it is not one of the named strategies.
//
// Values are drawn from the caller's RNG. Every new value is
// computed first and written afterwards, so an error leaves the
// model exactly as it was.
//
// Reference: Glorot & Bengio (2010), He et al. (2015),
//            Saxe et al. (2014) for orthogonal matrices

use burn::tensor::backend::Backend;
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use rand_distr::Normal;

use crate::domain::{layer::LayerKind, strategy::InitStrategy};
use crate::error::{Result, UtilError};
use crate::ml::model::{numel, Layer, Model};

/// Batch norm scale range shared by every strategy.
pub const BATCH_NORM_WEIGHT_RANGE: (f32, f32) = (0.02, 1.0);

/// Range used by the `normal` strategy for conv/linear weights.
pub const NORMAL_WEIGHT_RANGE: (f32, f32) = (0.0, 0.02);

/// Standard deviation of the DCGAN default initializer.
pub const DCGAN_WEIGHT_STD: f64 = 0.02;

/// Mean of batch norm weights under the DCGAN default initializer.
pub const DCGAN_BATCH_NORM_MEAN: f64 = 1.0;

/// Constant written into the first recurrent bias block by `orthogonal_rnn`.
pub const RECURRENT_BIAS_FILL: f32 = 1.0;

enum NewValue {
    Values(Vec<f32>),
    Fill(f32),
}

/// Parse `name` and initialize. Unknown names fail before anything is written.
pub fn init_weights_named<B: Backend, R: Rng + ?Sized>(
    model: &mut Model<B>,
    name: &str,
    rng: &mut R,
) -> Result<()> {
    let strategy: InitStrategy = name.parse()?;
    init_weights(model, strategy, rng)
}

pub fn init_weights<B: Backend, R: Rng + ?Sized>(
    model: &mut Model<B>,
    strategy: InitStrategy,
    rng: &mut R,
) -> Result<()> {
    tracing::info!("initialization method [{}]", strategy);

    let mut plan: Vec<(usize, String, NewValue)> = Vec::new();
    for (index, layer) in model.layers().iter().enumerate() {
        for (param, value) in plan_layer(layer, strategy, rng)? {
            plan.push((index, param, value));
        }
    }

    apply_plan(model, plan)
}

/// The DCGAN default initializer, applied to generator and
/// discriminator alike: convolution weights N(0, 0.02), batch norm
/// weights N(1, 0.02) and bias 0. Other layers and convolution
/// biases are left as they are.
pub fn weights_init_dcgan<B: Backend, R: Rng + ?Sized>(model: &mut Model<B>, rng: &mut R) -> Result<()> {
    tracing::info!("initialization method [dcgan]");

    let mut plan: Vec<(usize, String, NewValue)> = Vec::new();
    for (index, layer) in model.layers().iter().enumerate() {
        match layer.kind() {
            LayerKind::Convolution => {
                if let Some(weight) = layer.param("weight") {
                    let values = normal(weight.numel(), 0.0, DCGAN_WEIGHT_STD, rng)?;
                    plan.push((index, "weight".to_string(), NewValue::Values(values)));
                }
            }
            LayerKind::BatchNorm => {
                if let Some(weight) = layer.param("weight") {
                    let values = normal(weight.numel(), DCGAN_BATCH_NORM_MEAN, DCGAN_WEIGHT_STD, rng)?;
                    plan.push((index, "weight".to_string(), NewValue::Values(values)));
                }
                if layer.param("bias").is_some() {
                    plan.push((index, "bias".to_string(), NewValue::Fill(0.0)));
                }
            }
            _ => {}
        }
    }
    apply_plan(model, plan)
}

fn apply_plan<B: Backend>(model: &mut Model<B>, plan: Vec<(usize, String, NewValue)>) -> Result<()> {
    let layers = model.layers_mut();
    for (index, param, value) in plan {
        let layer = &mut layers[index];
        let name = layer.name().to_string();
        let target = layer
            .param_mut(&param)
            .ok_or_else(|| missing_param(&name, &param))?;
        match value {
            NewValue::Values(values) => target.set_values(values)?,
            NewValue::Fill(fill)     => target.fill(fill),
        }
    }
    Ok(())
}

fn plan_layer<B: Backend, R: Rng + ?Sized>(
    layer: &Layer<B>,
    strategy: InitStrategy,
    rng: &mut R,
) -> Result<Vec<(String, NewValue)>> {
    let mut plan = Vec::new();
    match (layer.kind(), strategy) {
        (LayerKind::BatchNorm, _) => {
            if let Some(weight) = layer.param("weight") {
                let (low, high) = BATCH_NORM_WEIGHT_RANGE;
                plan.push(("weight".to_string(), NewValue::Values(uniform(weight.numel(), low, high, rng))));
            }
            if layer.param("bias").is_some() {
                plan.push(("bias".to_string(), NewValue::Fill(0.0)));
            }
        }
        (LayerKind::Recurrent, InitStrategy::OrthogonalRnn) => {
            for name in ["weight_ih_l0", "weight_hh_l0"] {
                let weight = layer
                    .param(name)
                    .ok_or_else(|| missing_param(layer.name(), name))?;
                plan.push((name.to_string(), NewValue::Values(orthogonal(weight.shape(), 1.0, rng)?)));
            }
            for name in ["bias_ih_l0", "bias_hh_l0"] {
                if layer.param(name).is_some() {
                    plan.push((name.to_string(), NewValue::Fill(RECURRENT_BIAS_FILL)));
                }
            }
        }
        (LayerKind::Linear, InitStrategy::OrthogonalRnn) => {
            plan_weight(layer, InitStrategy::Xavier, rng, &mut plan)?;
            plan_zero_bias(layer, &mut plan);
        }
        (_, InitStrategy::OrthogonalRnn) => {}
        (LayerKind::Convolution, strategy) => {
            plan_weight(layer, strategy, rng, &mut plan)?;
        }
        (LayerKind::Linear, strategy) => {
            plan_weight(layer, strategy, rng, &mut plan)?;
            plan_zero_bias(layer, &mut plan);
        }
        (LayerKind::Recurrent | LayerKind::Other, _) => {}
    }
    Ok(plan)
}

fn plan_weight<B: Backend, R: Rng + ?Sized>(
    layer: &Layer<B>,
    strategy: InitStrategy,
    rng: &mut R,
    plan: &mut Vec<(String, NewValue)>,
) -> Result<()> {
    let weight = layer
        .param("weight")
        .ok_or_else(|| missing_param(layer.name(), "weight"))?;
    let values = sample_weight(weight.shape(), strategy, rng).map_err(|e| match e {
        UtilError::Shape(msg) => UtilError::shape(format!("{}.weight: {msg}", layer.name())),
        other => other,
    })?;
    plan.push(("weight".to_string(), NewValue::Values(values)));
    Ok(())
}

fn plan_zero_bias<B: Backend>(layer: &Layer<B>, plan: &mut Vec<(String, NewValue)>) {
    if layer.param("bias").is_some() {
        plan.push(("bias".to_string(), NewValue::Fill(0.0)));
    }
}

fn missing_param(layer: &str, param: &str) -> UtilError {
    UtilError::Mismatch(format!("layer '{layer}' has no parameter '{param}'"))
}

fn sample_weight<R: Rng + ?Sized>(shape: &[usize], strategy: InitStrategy, rng: &mut R) -> Result<Vec<f32>> {
    let n = numel(shape);
    match strategy {
        InitStrategy::Normal => {
            let (low, high) = NORMAL_WEIGHT_RANGE;
            Ok(uniform(n, low, high, rng))
        }
        InitStrategy::Xavier | InitStrategy::OrthogonalRnn => {
            let (fan_in, fan_out) = fan_in_fan_out(shape)?;
            if n == 0 {
                return Ok(Vec::new());
            }
            let std = (2.0 / (fan_in + fan_out) as f64).sqrt();
            normal(n, 0.0, std, rng)
        }
        InitStrategy::Kaiming => {
            let (fan_in, _) = fan_in_fan_out(shape)?;
            if n == 0 {
                return Ok(Vec::new());
            }
            let std = std::f64::consts::SQRT_2 / (fan_in as f64).sqrt();
            normal(n, 0.0, std, rng)
        }
        InitStrategy::Orthogonal => orthogonal(shape, 1.0, rng),
    }
}

/// (fan_in, fan_out) for a weight shape: dims 0 and 1 times the
/// receptive field (product of the remaining dims).
pub fn fan_in_fan_out(shape: &[usize]) -> Result<(usize, usize)> {
    if shape.len() < 2 {
        return Err(UtilError::shape(format!(
            "fan in and fan out need at least 2 dimensions, got {shape:?}"
        )));
    }
    let receptive: usize = shape[2..].iter().product();
    Ok((shape[1] * receptive, shape[0] * receptive))
}

fn uniform<R: Rng + ?Sized>(n: usize, low: f32, high: f32, rng: &mut R) -> Vec<f32> {
    let dist = Uniform::new(low, high);
    (0..n).map(|_| dist.sample(rng)).collect()
}

fn normal<R: Rng + ?Sized>(n: usize, mean: f64, std: f64, rng: &mut R) -> Result<Vec<f32>> {
    let dist = Normal::new(mean, std).map_err(|e| UtilError::configuration(e.to_string()))?;
    Ok((0..n).map(|_| dist.sample(rng) as f32).collect())
}

/// Row-major (semi-)orthogonal matrix of `shape`, flattened to
/// (shape[0], numel / shape[0]) and scaled by `gain`.
///
/// A standard normal matrix of the taller orientation is
/// orthonormalised column by column (modified Gram-Schmidt), which
/// gives the Q factor with a positive R diagonal, then transposed
/// back when the shape is wide.
pub fn orthogonal<R: Rng + ?Sized>(shape: &[usize], gain: f64, rng: &mut R) -> Result<Vec<f32>> {
    if shape.len() < 2 {
        return Err(UtilError::shape(format!(
            "orthogonal init needs at least 2 dimensions, got {shape:?}"
        )));
    }
    let total = numel(shape);
    if total == 0 {
        return Ok(Vec::new());
    }
    let rows = shape[0];
    let cols = total / rows;
    let (tall, short) = (rows.max(cols), rows.min(cols));

    let std_normal = Normal::new(0.0f64, 1.0).map_err(|e| UtilError::configuration(e.to_string()))?;
    let mut q: Vec<Vec<f64>> = (0..short)
        .map(|_| (0..tall).map(|_| std_normal.sample(rng)).collect())
        .collect();

    for j in 0..short {
        let (done, rest) = q.split_at_mut(j);
        let column = &mut rest[0];
        for prev in done.iter() {
            let d = dot(prev, column);
            for (c, p) in column.iter_mut().zip(prev) {
                *c -= d * p;
            }
        }
        let norm = dot(column, column).sqrt();
        if norm <= f64::EPSILON {
            return Err(UtilError::shape("degenerate random matrix during orthogonalisation"));
        }
        column.iter_mut().for_each(|c| *c /= norm);
    }

    let mut out = Vec::with_capacity(total);
    for r in 0..rows {
        for c in 0..cols {
            let v = if rows >= cols { q[c][r] } else { q[r][c] };
            out.push((gain * v) as f32);
        }
    }
    Ok(out)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
