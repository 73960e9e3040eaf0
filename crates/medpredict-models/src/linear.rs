//! Linear classifiers (logistic regression, linear SVC)

use crate::artifact::{argmax, tensor_error, RawOutput};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module};
use medpredict_core::{Error, Result};

/// Linear decision function `x · Wᵀ + b` evaluated with Candle.
///
/// A single output row is a binary model whose score is the decision margin
/// for `classes[1]`. Multiple rows score one class each.
#[derive(Debug, Clone)]
pub struct LinearModel {
    layer: Linear,
    classes: Vec<i64>,
    outputs: usize,
    width: usize,
    probabilistic: bool,
}

impl LinearModel {
    /// Build from row-major coefficients
    pub fn new(
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        classes: Vec<i64>,
        probabilistic: bool,
    ) -> Result<Self> {
        let outputs = coef.len();
        let width = coef.first().map(Vec::len).unwrap_or(0);

        if outputs == 0 {
            return Err(Error::model("coefficient matrix is empty"));
        }
        if coef.iter().any(|row| row.len() != width) {
            return Err(Error::model("coefficient rows have different lengths"));
        }

        let device = Device::Cpu;
        let weight = Tensor::from_vec(coef.concat(), (outputs, width), &device)
            .map_err(tensor_error)?;
        let bias = Tensor::from_vec(intercept, outputs, &device).map_err(|e| {
            Error::model(format!("intercept does not match {} outputs: {}", outputs, e))
        })?;

        Self::from_tensors(weight, bias, classes, probabilistic)
    }

    /// Build from weight `[outputs, width]` and bias `[outputs]` tensors
    pub fn from_tensors(
        weight: Tensor,
        bias: Tensor,
        classes: Vec<i64>,
        probabilistic: bool,
    ) -> Result<Self> {
        let (outputs, width) = weight.dims2().map_err(tensor_error)?;
        let bias_len = bias.dims1().map_err(tensor_error)?;
        if bias_len != outputs {
            return Err(Error::model(format!(
                "bias has {} entries for {} outputs",
                bias_len, outputs
            )));
        }

        let expected_classes = if outputs == 1 { 2 } else { outputs };
        if classes.len() != expected_classes {
            return Err(Error::model(format!(
                "expected {} classes for {} outputs, found {}",
                expected_classes,
                outputs,
                classes.len()
            )));
        }

        let weight = weight.to_dtype(DType::F64).map_err(tensor_error)?;
        let bias = bias.to_dtype(DType::F64).map_err(tensor_error)?;

        Ok(Self {
            layer: Linear::new(weight, Some(bias)),
            classes,
            outputs,
            width,
            probabilistic,
        })
    }

    /// Input width, or `None` for a degenerate zero-width model
    pub fn width(&self) -> Option<usize> {
        (self.width > 0).then_some(self.width)
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn weight(&self) -> &Tensor {
        self.layer.weight()
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.layer.bias()
    }

    /// Raw decision scores, one per output row
    pub fn scores(&self, features: &[f64]) -> Result<Vec<f64>> {
        let input =
            Tensor::from_slice(features, (1, self.width), &Device::Cpu).map_err(tensor_error)?;
        self.layer
            .forward(&input)
            .and_then(|scores| scores.flatten_all())
            .and_then(|scores| scores.to_vec1::<f64>())
            .map_err(tensor_error)
    }

    pub fn forward(&self, features: &[f64]) -> Result<RawOutput> {
        let scores = self.scores(features)?;

        if self.outputs == 1 {
            let margin = scores[0];
            let class = self.classes[usize::from(margin > 0.0)];
            let probabilities = self.probabilistic.then(|| {
                let positive = sigmoid(margin);
                vec![1.0 - positive, positive]
            });

            return Ok(RawOutput {
                class,
                probabilities,
                margin: Some(margin),
                activations: None,
            });
        }

        let best = argmax(&scores).ok_or_else(|| Error::model("model produced no scores"))?;
        Ok(RawOutput {
            class: self.classes[best],
            probabilities: self.probabilistic.then(|| softmax(&scores)),
            // one margin per class cannot be reduced to a single score
            margin: None,
            activations: None,
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(probabilistic: bool) -> LinearModel {
        LinearModel::new(
            vec![vec![1.0, -2.0, 0.5]],
            vec![0.25],
            vec![0, 1],
            probabilistic,
        )
        .unwrap()
    }

    #[test]
    fn test_binary_margin_and_probability() {
        let model = binary(true);
        // 1*2 - 2*0.5 + 0.5*1 + 0.25 = 1.75
        let out = model.forward(&[2.0, 0.5, 1.0]).unwrap();
        assert_eq!(out.class, 1);
        assert!((out.margin.unwrap() - 1.75).abs() < 1e-9);

        let probs = out.probabilities.unwrap();
        assert!((probs[1] - sigmoid(1.75)).abs() < 1e-9);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_svc_has_no_probabilities() {
        let model = binary(false);
        let out = model.forward(&[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(out.class, 0);
        assert!(out.probabilities.is_none());
        assert!((out.margin.unwrap() + 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_multiclass_has_no_single_margin() {
        let model = LinearModel::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.0],
            vec![10, 20, 30],
            true,
        )
        .unwrap();

        let out = model.forward(&[0.2, 3.0]).unwrap();
        assert_eq!(out.class, 20);
        assert!(out.margin.is_none());

        let probs = out.probabilities.unwrap();
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_inconsistent_parameters() {
        assert!(LinearModel::new(vec![], vec![], vec![0, 1], true).is_err());
        assert!(LinearModel::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0.0, 0.0], vec![0, 1], true).is_err());
        assert!(LinearModel::new(vec![vec![1.0]], vec![0.0, 1.0], vec![0, 1], true).is_err());
        assert!(LinearModel::new(vec![vec![1.0]], vec![0.0], vec![1], true).is_err());
    }

    #[test]
    fn test_zero_width_is_unknown() {
        let model = LinearModel::new(vec![vec![]], vec![0.0], vec![0, 1], false).unwrap();
        assert_eq!(model.width(), None);
        assert_eq!(binary(true).width(), Some(3));
    }
}
