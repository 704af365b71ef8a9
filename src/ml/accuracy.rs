// ============================================================
// Layer 5 - Classification Accuracy
// ============================================================
// Percentage of rows whose highest-scoring class equals the label.
//
//   preds  [N, C] float scores (logits or probabilities)
//   labels [N]    int class indices

use burn::tensor::{backend::Backend, ElementConversion, Int, Tensor};

/// Accuracy in percent (0.0 – 100.0). Empty input gives 0.0.
pub fn compute_acc<B: Backend>(preds: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> f64 {
    let [n, _] = preds.dims();
    if n == 0 {
        return 0.0;
    }

    let predicted: Tensor<B, 1, Int> = preds.argmax(1).reshape([n]);
    let correct = predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();

    correct as f64 / n as f64 * 100.0
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    #[test]
    fn test_three_of_four_correct() {
        let device = Default::default();
        let preds = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(
                vec![
                    0.9f32, 0.1, 0.0, //
                    0.2, 0.7, 0.1, //
                    0.1, 0.2, 0.7, //
                    0.6, 0.3, 0.1,
                ],
                [4, 3],
            ),
            &device,
        );
        let labels = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(vec![0i64, 1, 2, 2], [4]),
            &device,
        );

        assert!((compute_acc(preds, labels) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch_is_zero() {
        let device = Default::default();
        let preds = Tensor::<TestBackend, 2>::zeros([0, 5], &device);
        let labels = Tensor::<TestBackend, 1, Int>::zeros([0], &device);
        assert_eq!(compute_acc(preds, labels), 0.0);
    }
}
