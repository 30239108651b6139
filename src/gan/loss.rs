use burn::prelude::*;

/// Bound applied to probabilities before taking logs, so saturated
/// predictions keep a finite loss and a finite gradient.
const PROB_EPS: f64 = 1e-7;

/// Mean binary cross-entropy between probabilities and 0/1 targets.
///
/// `-mean(t * ln(p) + (1 - t) * ln(1 - p))`, with `p` clamped to
/// `[1e-7, 1 - 1e-7]`.
pub fn binary_cross_entropy<B: Backend>(
    predictions: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let p = predictions.clamp(PROB_EPS, 1.0 - PROB_EPS);
    let log_p = p.clone().log();
    let log_not_p = p.neg().add_scalar(1.0).log();
    let not_targets = targets.clone().neg().add_scalar(1.0);

    (targets * log_p + not_targets * log_not_p).mean().neg()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    fn column(values: &[f32]) -> Tensor<TestBackend, 2> {
        Tensor::<TestBackend, 2>::from_data(
            TensorData::new(values.to_vec(), [values.len(), 1]),
            &Default::default(),
        )
    }

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_data().to_vec::<f32>().unwrap()[0]
    }

    #[test]
    fn test_all_real_target_is_negative_mean_log() {
        let loss = scalar(binary_cross_entropy(column(&[0.5, 0.25]), column(&[1.0, 1.0])));
        let expected = -((0.5f32).ln() + (0.25f32).ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-5, "{loss} vs {expected}");
    }

    #[test]
    fn test_all_fake_target_is_negative_mean_log_complement() {
        let loss = scalar(binary_cross_entropy(column(&[0.5, 0.25]), column(&[0.0, 0.0])));
        let expected = -((0.5f32).ln() + (0.75f32).ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-5, "{loss} vs {expected}");
    }

    #[test]
    fn test_perfect_prediction_is_zero() {
        let loss = scalar(binary_cross_entropy(column(&[1.0, 0.0]), column(&[1.0, 0.0])));
        assert!(loss.abs() < 1e-6);
    }

    #[test]
    fn test_saturated_wrong_prediction_is_bounded() {
        let loss = scalar(binary_cross_entropy(column(&[0.0]), column(&[1.0])));
        assert!(loss.is_finite());
        assert!((loss - 16.118).abs() < 1e-2, "{loss}");
    }

    fn gradient(prediction: f32, target: f32) -> (f32, Vec<f32>) {
        let device = Default::default();
        let preds = Tensor::<Autodiff<TestBackend>, 2>::from_data(
            TensorData::new(vec![prediction, 0.5], [2, 1]),
            &device,
        )
        .require_grad();
        let targets = Tensor::<Autodiff<TestBackend>, 2>::from_data(
            TensorData::new(vec![target, target], [2, 1]),
            &device,
        );

        let loss = binary_cross_entropy(preds.clone(), targets);
        let value = loss.clone().into_data().to_vec::<f32>().unwrap()[0];
        let grads = loss.backward();
        let grad = preds.grad(&grads).unwrap().into_data().to_vec::<f32>().unwrap();
        (value, grad)
    }

    #[test]
    fn test_confident_correct_predictions_have_finite_gradients() {
        for (prediction, target, expected) in [(1.0, 1.0, -1.0), (0.0, 0.0, 1.0)] {
            let (loss, grad) = gradient(prediction, target);
            assert!(loss.is_finite(), "loss {loss} for p={prediction}");
            assert!(grad.iter().all(|g| g.is_finite()), "{grad:?} for p={prediction}");
            // d/dp of -ln(p) / 2 at p = 0.5 (or of -ln(1 - p) / 2).
            assert!((grad[1] - expected).abs() < 1e-4, "{grad:?}");
        }
    }

    #[test]
    fn test_confident_wrong_predictions_have_finite_gradients() {
        for (prediction, target) in [(0.0, 1.0), (1.0, 0.0)] {
            let (loss, grad) = gradient(prediction, target);
            assert!(loss.is_finite() && loss > 0.0);
            assert!(grad.iter().all(|g| g.is_finite()), "{grad:?}");
        }
    }

    #[test]
    fn test_loss_is_non_negative() {
        let preds = [0.01, 0.3, 0.5, 0.7, 0.99];
        for target in [0.0, 1.0] {
            let loss = scalar(binary_cross_entropy(column(&preds), column(&[target; 5])));
            assert!(loss >= 0.0 && loss.is_finite());
        }
    }
}
