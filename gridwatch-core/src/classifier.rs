//! Classifier interface and the trained-artifact adapter
//!
//! The pipeline treats the trained model as an opaque predictor behind the
//! `Classifier` trait; no pipeline code depends on artifact internals. The
//! concrete artifact is loaded once at startup and a load failure aborts
//! startup entirely.

use crate::errors::{Error, Result};
use crate::features::FEATURE_ORDER;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Binary probabilistic classifier over fixed-order feature vectors.
///
/// Implementations are stateless per call. A vector of the wrong shape
/// must surface as `Error::SchemaMismatch`, never be coerced.
pub trait Classifier {
    /// Number of features an input vector must carry.
    fn input_width(&self) -> usize;

    /// Theft probability in [0, 1] for one feature vector.
    fn predict_probability(&self, features: &[f64]) -> Result<f64>;

    /// Hard 0/1 label at the 0.5 decision boundary.
    fn predict(&self, features: &[f64]) -> Result<u8> {
        Ok(u8::from(self.predict_probability(features)? >= 0.5))
    }

    /// Batched prediction: same length and order as the input sequence.
    fn predict_probability_batch(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
        batch
            .iter()
            .map(|features| self.predict_probability(features))
            .collect()
    }
}

/// Logistic regression artifact exported from the training pipeline:
/// standardization parameters and coefficients, one per feature.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    feature_names: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Load the artifact from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let resource_err = |reason: String| Error::ResourceLoad {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| resource_err(e.to_string()))?;
        let model: LinearModel =
            serde_json::from_str(&content).map_err(|e| resource_err(e.to_string()))?;
        model.check_schema(path)?;
        tracing::info!(
            path = %path.display(),
            features = model.feature_names.len(),
            "loaded classifier artifact"
        );
        Ok(model)
    }

    /// The artifact must agree with the canonical feature order and be
    /// internally consistent.
    fn check_schema(&self, path: &Path) -> Result<()> {
        let resource_err = |reason: String| Error::ResourceLoad {
            path: path.to_path_buf(),
            reason,
        };

        let names_match = self.feature_names.len() == FEATURE_ORDER.len()
            && self
                .feature_names
                .iter()
                .zip(FEATURE_ORDER.iter())
                .all(|(name, expected)| name == expected);
        if !names_match {
            return Err(resource_err(format!(
                "artifact feature names {:?} do not match the expected order {:?}",
                self.feature_names, FEATURE_ORDER
            )));
        }

        let n = self.feature_names.len();
        if self.means.len() != n || self.scales.len() != n || self.coefficients.len() != n {
            return Err(resource_err(
                "artifact parameter lengths disagree with feature names".to_string(),
            ));
        }
        if self.scales.iter().any(|s| *s == 0.0) {
            return Err(resource_err(
                "artifact contains a zero feature scale".to_string(),
            ));
        }
        Ok(())
    }
}

impl Classifier for LinearModel {
    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.input_width() {
            return Err(Error::SchemaMismatch {
                expected: self.input_width(),
                actual: features.len(),
            });
        }
        let z = features
            .iter()
            .enumerate()
            .fold(self.intercept, |acc, (i, x)| {
                acc + self.coefficients[i] * (x - self.means[i]) / self.scales[i]
            });
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn uniform_model() -> LinearModel {
        LinearModel {
            feature_names: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
            means: vec![0.0; 10],
            scales: vec![1.0; 10],
            coefficients: vec![1.0; 10],
            intercept: 0.0,
        }
    }

    #[test]
    fn test_probability_at_means_is_sigmoid_of_intercept() {
        let model = uniform_model();
        let p = model.predict_probability(&[0.0; 10]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probability_is_bounded_and_monotonic_in_z() {
        let model = uniform_model();
        let low = model.predict_probability(&[-5.0; 10]).unwrap();
        let high = model.predict_probability(&[5.0; 10]).unwrap();
        assert!(low > 0.0 && low < 1.0);
        assert!(high > 0.0 && high < 1.0);
        assert!(high > low);
    }

    #[test]
    fn test_wrong_vector_length_is_schema_mismatch() {
        let model = uniform_model();
        let err = model.predict_probability(&[1.0, 2.0]).unwrap_err();
        match err {
            Error::SchemaMismatch { expected, actual } => {
                assert_eq!(expected, 10);
                assert_eq!(actual, 2);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let model = uniform_model();
        let batch = vec![vec![-2.0; 10], vec![0.0; 10], vec![2.0; 10]];
        let probabilities = model.predict_probability_batch(&batch).unwrap();
        assert_eq!(probabilities.len(), 3);
        assert!(probabilities[0] < probabilities[1]);
        assert!(probabilities[1] < probabilities[2]);
    }

    #[test]
    fn test_predict_label_uses_half_boundary() {
        let model = uniform_model();
        assert_eq!(model.predict(&[-1.0; 10]).unwrap(), 0);
        assert_eq!(model.predict(&[1.0; 10]).unwrap(), 1);
    }

    #[test]
    fn test_from_path_rejects_reordered_feature_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut names: Vec<&str> = FEATURE_ORDER.to_vec();
        names.swap(0, 1);
        let artifact = serde_json::json!({
            "feature_names": names,
            "means": vec![0.0; 10],
            "scales": vec![1.0; 10],
            "coefficients": vec![1.0; 10],
            "intercept": 0.0,
        });
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", artifact).unwrap();
        drop(file);

        let err = LinearModel::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::ResourceLoad { .. }));
    }

    #[test]
    fn test_from_path_rejects_missing_file() {
        let err = LinearModel::from_path(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, Error::ResourceLoad { .. }));
    }
}
