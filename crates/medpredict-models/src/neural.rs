//! Dense feed-forward networks exported from a deep-learning runtime
//!
//! These artifacts are evaluated with Candle but are never converted to the
//! portable format. Their output is a raw activation vector; the predicted
//! class is its argmax.

use crate::artifact::{argmax, tensor_error, RawOutput};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module};
use medpredict_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    fn apply(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Linear => Ok(xs.clone()),
            Self::Relu => xs.relu(),
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
            Self::Tanh => xs.tanh(),
            Self::Softmax => candle_nn::ops::softmax(xs, D::Minus1),
        }
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    linear: Linear,
    activation: Activation,
}

#[derive(Debug, Clone)]
pub struct SequentialNet {
    layers: Vec<DenseLayer>,
    classes: Option<Vec<i64>>,
    width: usize,
}

impl SequentialNet {
    /// Build from `(weights [out][in], bias [out], activation)` triples
    pub fn new(
        layers: Vec<(Vec<Vec<f64>>, Vec<f64>, Activation)>,
        classes: Option<Vec<i64>>,
    ) -> Result<Self> {
        let device = Device::Cpu;
        let mut dense = Vec::with_capacity(layers.len());
        let mut width = 0;
        let mut previous_out: Option<usize> = None;

        for (idx, (weights, bias, activation)) in layers.into_iter().enumerate() {
            let outputs = weights.len();
            let inputs = weights.first().map(Vec::len).unwrap_or(0);

            if outputs == 0 || weights.iter().any(|row| row.len() != inputs) {
                return Err(Error::model(format!("layer {} has a ragged weight matrix", idx)));
            }
            if bias.len() != outputs {
                return Err(Error::model(format!(
                    "layer {} has {} biases for {} units",
                    idx,
                    bias.len(),
                    outputs
                )));
            }
            match previous_out {
                None => width = inputs,
                Some(prev) if prev != inputs => {
                    return Err(Error::model(format!(
                        "layer {} expects {} inputs but previous layer has {} units",
                        idx, inputs, prev
                    )));
                }
                Some(_) => {}
            }
            previous_out = Some(outputs);

            let flat: Vec<f32> = weights.concat().into_iter().map(|w| w as f32).collect();
            let bias: Vec<f32> = bias.into_iter().map(|b| b as f32).collect();
            let weight = Tensor::from_vec(flat, (outputs, inputs), &device).map_err(tensor_error)?;
            let bias = Tensor::from_vec(bias, outputs, &device).map_err(tensor_error)?;

            dense.push(DenseLayer {
                linear: Linear::new(weight, Some(bias)),
                activation,
            });
        }

        if dense.is_empty() {
            return Err(Error::model("network has no layers"));
        }
        if let (Some(classes), Some(units)) = (&classes, previous_out) {
            if classes.len() != units {
                return Err(Error::model(format!(
                    "{} classes for {} output units",
                    classes.len(),
                    units
                )));
            }
        }

        Ok(Self {
            layers: dense,
            classes,
            width,
        })
    }

    pub fn width(&self) -> Option<usize> {
        (self.width > 0).then_some(self.width)
    }

    /// Output activations for one input row
    pub fn activations(&self, features: &[f64]) -> Result<Vec<f64>> {
        let input: Vec<f32> = features.iter().map(|v| *v as f32).collect();
        let mut xs = Tensor::from_vec(input, (1, self.width), &Device::Cpu).map_err(tensor_error)?;

        for layer in &self.layers {
            xs = layer
                .linear
                .forward(&xs)
                .and_then(|ys| layer.activation.apply(&ys))
                .map_err(tensor_error)?;
        }

        xs.flatten_all()
            .and_then(|ys| ys.to_dtype(DType::F64))
            .and_then(|ys| ys.to_vec1::<f64>())
            .map_err(tensor_error)
    }

    pub fn forward(&self, features: &[f64]) -> Result<RawOutput> {
        let activations = self.activations(features)?;
        let best =
            argmax(&activations).ok_or_else(|| Error::model("network produced no output"))?;
        let class = match &self.classes {
            Some(classes) => classes[best],
            None => best as i64,
        };

        Ok(RawOutput {
            class,
            probabilities: None,
            margin: None,
            activations: Some(activations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_softmax() -> SequentialNet {
        SequentialNet::new(
            vec![
                (
                    vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                    vec![0.0, 0.0],
                    Activation::Relu,
                ),
                (
                    vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]],
                    vec![0.0, 0.0, 0.0],
                    Activation::Softmax,
                ),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_softmax_output_sums_to_one() {
        let net = identity_softmax();
        let out = net.forward(&[2.0, 0.5]).unwrap();

        let acts = out.activations.unwrap();
        assert_eq!(acts.len(), 3);
        assert!((acts.iter().sum::<f64>() - 1.0).abs() < 1e-5);
        assert_eq!(out.class, 0);
        assert!(out.probabilities.is_none());
        assert!(out.margin.is_none());
    }

    #[test]
    fn test_relu_clips_negative_inputs() {
        let net = identity_softmax();
        // both hidden units clip to zero, so the first of three equal outputs wins
        let out = net.forward(&[-4.0, -1.0]).unwrap();
        assert_eq!(out.class, 0);
        let acts = out.activations.unwrap();
        assert!((acts[0] - acts[2]).abs() < 1e-6);
    }

    #[test]
    fn test_width_from_first_layer() {
        assert_eq!(identity_softmax().width(), Some(2));
    }

    #[test]
    fn test_rejects_mismatched_layers() {
        let result = SequentialNet::new(
            vec![
                (vec![vec![1.0, 1.0]], vec![0.0], Activation::Linear),
                (vec![vec![1.0, 1.0]], vec![0.0], Activation::Linear),
            ],
            None,
        );
        assert!(result.is_err());
        assert!(SequentialNet::new(vec![], None).is_err());
    }
}
