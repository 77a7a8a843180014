use crate::errors::internal::InternalError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Feature order the original training pipeline used; consulted when the
/// artifacts are missing so the request surface stays identical in
/// degraded mode.
const FALLBACK_FEATURE_NAMES: [&str; 5] = [
    "Age",
    "Smokes (years)",
    "Hormonal Contraceptives (years)",
    "IUD (years)",
    "STDs (number)",
];

/// Fallback result served while artifacts are unavailable
const FALLBACK_PROBABILITY: f64 = 0.85;

/// Serialized binary classifier: logistic weights over the selected columns
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Serialized pre-fit scaler: per-feature mean and scale
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// The four pre-trained artifacts produced by the external training process
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: ClassifierArtifact,
    pub scaler: ScalerArtifact,
    pub selected_features: Vec<usize>,
    pub feature_names: Vec<String>,
}

impl ModelArtifacts {
    /// Load all four artifacts from a directory and cross-check their shapes
    ///
    /// Expected files: classifier.json, scaler.json, selected_features.json,
    /// feature_names.json.
    pub fn load(dir: &Path) -> Result<Self, InternalError> {
        let classifier: ClassifierArtifact = Self::read_json(dir, "classifier.json")?;
        let scaler: ScalerArtifact = Self::read_json(dir, "scaler.json")?;
        let selected_features: Vec<usize> = Self::read_json(dir, "selected_features.json")?;
        let feature_names: Vec<String> = Self::read_json(dir, "feature_names.json")?;

        let artifacts = Self {
            classifier,
            scaler,
            selected_features,
            feature_names,
        };
        artifacts.check_shapes()?;
        Ok(artifacts)
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        dir: &Path,
        filename: &str,
    ) -> Result<T, InternalError> {
        let path = dir.join(filename);
        let raw = fs::read_to_string(&path)
            .map_err(|e| InternalError::model_artifact(filename, e.to_string()))?;
        serde_json::from_str(&raw)
            .map_err(|e| InternalError::model_artifact(filename, e.to_string()))
    }

    /// Shape mismatches between artifacts are fatal at load time, never at
    /// prediction time
    fn check_shapes(&self) -> Result<(), InternalError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(InternalError::model_artifact(
                "feature_names.json",
                "feature name list is empty",
            ));
        }
        if self.scaler.mean.len() != n || self.scaler.scale.len() != n {
            return Err(InternalError::model_artifact(
                "scaler.json",
                format!(
                    "scaler shape ({}, {}) does not match {} features",
                    self.scaler.mean.len(),
                    self.scaler.scale.len(),
                    n
                ),
            ));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(InternalError::model_artifact(
                "scaler.json",
                "scaler contains a zero or non-finite scale entry",
            ));
        }
        if let Some(bad) = self.selected_features.iter().find(|i| **i >= n) {
            return Err(InternalError::model_artifact(
                "selected_features.json",
                format!("selected index {} outside {} features", bad, n),
            ));
        }
        if self.classifier.coefficients.len() != self.selected_features.len() {
            return Err(InternalError::model_artifact(
                "classifier.json",
                format!(
                    "{} coefficients for {} selected features",
                    self.classifier.coefficients.len(),
                    self.selected_features.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Outcome of one classification, fallback or genuine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    /// Positive-class label
    pub high_risk: bool,

    /// Probability of the positive class in [0, 1]
    pub probability: f64,

    /// False when this result came from the constant fallback
    pub model_available: bool,
}

impl RiskAssessment {
    /// The label persisted on the patient record
    pub fn status_label(&self) -> &'static str {
        if self.high_risk {
            "High Risk"
        } else {
            "Low Risk"
        }
    }
}

/// Risk classifier adapter wrapping the pre-trained artifacts
///
/// Holds either loaded artifacts or nothing; with nothing loaded every
/// prediction is the constant fallback, flagged as such so callers can
/// surface that the result is not a clinical signal.
pub struct RiskModel {
    artifacts: Option<ModelArtifacts>,
    feature_names: Vec<String>,
}

impl RiskModel {
    /// Load artifacts from a directory, degrading to fallback mode on failure
    ///
    /// Missing or malformed artifacts are a warning, not a startup error:
    /// the rest of the application stays exercisable.
    pub fn load(dir: &Path) -> Self {
        match ModelArtifacts::load(dir) {
            Ok(artifacts) => {
                tracing::info!(
                    features = artifacts.feature_names.len(),
                    selected = artifacts.selected_features.len(),
                    "risk classifier artifacts loaded"
                );
                Self::from_artifacts(artifacts)
            }
            Err(e) => {
                tracing::warn!(
                    "risk classifier artifacts unavailable, serving fallback predictions: {}",
                    e
                );
                Self::unavailable()
            }
        }
    }

    /// Build an adapter around already-validated artifacts
    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        let feature_names = artifacts.feature_names.clone();
        Self {
            artifacts: Some(artifacts),
            feature_names,
        }
    }

    /// Build an adapter with no artifacts; every prediction is the fallback
    pub fn unavailable() -> Self {
        Self {
            artifacts: None,
            feature_names: FALLBACK_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether genuine artifacts are behind this adapter
    pub fn is_available(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Expected feature names in model order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Map named raw values onto the fixed feature order
    ///
    /// Missing names and values that do not read as a float both coerce to
    /// 0.0; this path never fails, so the inference call stays executable
    /// for any input shape.
    pub fn build_feature_vector(&self, input: &HashMap<String, serde_json::Value>) -> Vec<f64> {
        self.feature_names
            .iter()
            .map(|name| input.get(name).map_or(0.0, coerce_to_f64))
            .collect()
    }

    /// Run the full inference path: build row, impute, scale, select, classify
    pub fn predict(
        &self,
        input: &HashMap<String, serde_json::Value>,
    ) -> Result<RiskAssessment, InternalError> {
        let artifacts = match &self.artifacts {
            Some(artifacts) => artifacts,
            None => {
                return Ok(RiskAssessment {
                    high_risk: true,
                    probability: FALLBACK_PROBABILITY,
                    model_available: false,
                })
            }
        };

        let mut row = self.build_feature_vector(input);
        impute_mean(&mut row);

        // Pre-fit affine transform, then restriction to the trained columns
        let scaled: Vec<f64> = row
            .iter()
            .zip(artifacts.scaler.mean.iter().zip(artifacts.scaler.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        // check_shapes verified the indices at load time; guard anyway so a
        // hand-built artifact set surfaces an error instead of a panic
        let selected: Vec<f64> = artifacts
            .selected_features
            .iter()
            .map(|i| {
                scaled.get(*i).copied().ok_or_else(|| {
                    InternalError::model_artifact(
                        "selected_features.json",
                        format!("selected index {} outside {} features", i, scaled.len()),
                    )
                })
            })
            .collect::<Result<_, _>>()?;

        let z: f64 = artifacts
            .classifier
            .coefficients
            .iter()
            .zip(selected.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + artifacts.classifier.intercept;

        let probability = sigmoid(z);

        Ok(RiskAssessment {
            high_risk: probability >= 0.5,
            probability,
            model_available: true,
        })
    }
}

/// Coerce one raw JSON value to a float, defaulting to 0.0
fn coerce_to_f64(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Replace non-finite entries with the mean of the finite ones
///
/// On a single fully-present row this is a no-op; an all-missing row
/// degrades to zeros.
fn impute_mean(row: &mut [f64]) {
    let finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    let mean = if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };
    for value in row.iter_mut() {
        if !value.is_finite() {
            *value = mean;
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_artifacts() -> ModelArtifacts {
        ModelArtifacts {
            classifier: ClassifierArtifact {
                coefficients: vec![1.5, -0.5, 2.0],
                intercept: -0.25,
            },
            scaler: ScalerArtifact {
                mean: vec![30.0, 5.0, 4.0, 1.0, 0.5],
                scale: vec![10.0, 4.0, 3.0, 2.0, 1.0],
            },
            selected_features: vec![0, 1, 4],
            feature_names: FALLBACK_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn features(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_feature_vector_follows_model_order() {
        let model = RiskModel::from_artifacts(test_artifacts());
        let input = features(&[
            ("Smokes (years)", json!(5)),
            ("Age", json!(34)),
        ]);

        let row = model.build_feature_vector(&input);
        assert_eq!(row, vec![34.0, 5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_feature_vector_parses_numeric_strings() {
        let model = RiskModel::from_artifacts(test_artifacts());
        let input = features(&[("Age", json!("34")), ("IUD (years)", json!(" 2.5 "))]);

        let row = model.build_feature_vector(&input);
        assert_eq!(row[0], 34.0);
        assert_eq!(row[3], 2.5);
    }

    #[test]
    fn test_feature_vector_coerces_garbage_to_zero() {
        let model = RiskModel::from_artifacts(test_artifacts());
        let input = features(&[
            ("Age", json!("not a number")),
            ("Smokes (years)", json!(null)),
            ("IUD (years)", json!([1, 2])),
            ("STDs (number)", json!(true)),
        ]);

        let row = model.build_feature_vector(&input);
        assert_eq!(row, vec![0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_impute_mean_fills_non_finite_entries() {
        let mut row = vec![1.0, f64::NAN, 3.0];
        impute_mean(&mut row);
        assert_eq!(row, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_impute_mean_all_missing_degrades_to_zeros() {
        let mut row = vec![f64::NAN, f64::INFINITY];
        impute_mean(&mut row);
        assert_eq!(row, vec![0.0, 0.0]);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = RiskModel::from_artifacts(test_artifacts());
        let input = features(&[("Age", json!(52)), ("Smokes (years)", json!(20))]);

        let first = model.predict(&input).unwrap();
        let second = model.predict(&input).unwrap();
        assert_eq!(first, second);
        assert!(first.model_available);
        assert!(first.probability > 0.0 && first.probability < 1.0);
    }

    #[test]
    fn test_predict_matches_hand_computed_logit() {
        let model = RiskModel::from_artifacts(test_artifacts());
        let input = features(&[
            ("Age", json!(40.0)),
            ("Smokes (years)", json!(9.0)),
            ("STDs (number)", json!(1.5)),
        ]);

        // scaled: (40-30)/10 = 1.0, (9-5)/4 = 1.0, (1.5-0.5)/1 = 1.0
        // z = 1.5*1.0 - 0.5*1.0 + 2.0*1.0 - 0.25 = 2.75
        let expected = 1.0 / (1.0 + (-2.75f64).exp());
        let assessment = model.predict(&input).unwrap();
        assert!((assessment.probability - expected).abs() < 1e-12);
        assert!(assessment.high_risk);
    }

    #[test]
    fn test_low_probability_maps_to_low_risk_label() {
        let model = RiskModel::from_artifacts(test_artifacts());
        // All features far below their means push the logit negative
        let input = features(&[
            ("Age", json!(0)),
            ("Smokes (years)", json!(0)),
            ("STDs (number)", json!(0)),
        ]);

        let assessment = model.predict(&input).unwrap();
        assert!(!assessment.high_risk);
        assert_eq!(assessment.status_label(), "Low Risk");
    }

    #[test]
    fn test_unavailable_model_serves_flagged_fallback() {
        let model = RiskModel::unavailable();
        let assessment = model.predict(&HashMap::new()).unwrap();

        assert!(assessment.high_risk);
        assert_eq!(assessment.probability, 0.85);
        assert!(!assessment.model_available);
        assert_eq!(assessment.status_label(), "High Risk");
    }

    #[test]
    fn test_unavailable_model_keeps_original_feature_surface() {
        let model = RiskModel::unavailable();
        assert_eq!(model.feature_names().len(), 5);
        assert_eq!(model.feature_names()[0], "Age");
    }

    #[test]
    fn test_artifact_shape_mismatch_rejected_at_load() {
        let mut artifacts = test_artifacts();
        artifacts.selected_features = vec![0, 9];
        assert!(artifacts.check_shapes().is_err());

        let mut artifacts = test_artifacts();
        artifacts.scaler.scale[2] = 0.0;
        assert!(artifacts.check_shapes().is_err());

        let mut artifacts = test_artifacts();
        artifacts.classifier.coefficients = vec![1.0];
        assert!(artifacts.check_shapes().is_err());
    }

    #[test]
    fn test_load_from_missing_directory_degrades() {
        let model = RiskModel::load(Path::new("/nonexistent/model_assets"));
        assert!(!model.is_available());
    }
}
