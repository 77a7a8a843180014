use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request model for risk prediction
///
/// Feature values arrive as arbitrary JSON (the form layer sends strings,
/// API clients send numbers); the feature vector builder coerces both and
/// substitutes 0.0 for anything else.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Patient whose record receives the result
    pub patient_id: String,

    /// Mapping from feature name to raw value
    pub features: HashMap<String, serde_json::Value>,
}

/// Response model for risk prediction
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// "High Risk" or "Low Risk"
    pub prediction: String,

    /// Probability of the positive class, formatted "NN.NN%"
    pub probability: String,

    /// False when the classifier artifacts were missing at startup and the
    /// constant fallback produced this result; such results are not a
    /// clinical signal
    pub model_available: bool,
}
