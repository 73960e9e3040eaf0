//! Nearest-centroid classifier
//!
//! Has neither probabilities nor a margin, so confidence for this kind always
//! comes from the static default tier.

use crate::artifact::RawOutput;
use medpredict_core::{Error, Result};

#[derive(Debug, Clone)]
pub struct NearestCentroid {
    centroids: Vec<Vec<f64>>,
    classes: Vec<i64>,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>, classes: Vec<i64>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(Error::model("no centroids"));
        }
        if centroids.len() != classes.len() {
            return Err(Error::model(format!(
                "{} centroids for {} classes",
                centroids.len(),
                classes.len()
            )));
        }
        let width = centroids[0].len();
        if centroids.iter().any(|c| c.len() != width) {
            return Err(Error::model("centroids have different lengths"));
        }

        Ok(Self { centroids, classes })
    }

    pub fn width(&self) -> Option<usize> {
        self.centroids.first().map(Vec::len).filter(|w| *w > 0)
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn forward(&self, features: &[f64]) -> RawOutput {
        let nearest = self
            .centroids
            .iter()
            .map(|centroid| squared_distance(centroid, features))
            .enumerate()
            .fold((0, f64::INFINITY), |best, (idx, dist)| {
                if dist < best.1 {
                    (idx, dist)
                } else {
                    best
                }
            })
            .0;

        RawOutput::class_only(self.classes[nearest])
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_nearest() {
        let model =
            NearestCentroid::new(vec![vec![0.0, 0.0], vec![5.0, 5.0]], vec![0, 1]).unwrap();

        let out = model.forward(&[4.0, 4.5]);
        assert_eq!(out.class, 1);
        assert!(out.probabilities.is_none());
        assert!(out.margin.is_none());

        assert_eq!(model.forward(&[1.0, -1.0]).class, 0);
    }

    #[test]
    fn test_validation() {
        assert!(NearestCentroid::new(vec![], vec![]).is_err());
        assert!(NearestCentroid::new(vec![vec![1.0]], vec![0, 1]).is_err());
        assert!(NearestCentroid::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0, 1]).is_err());
    }
}
