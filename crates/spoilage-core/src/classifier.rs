//! Spoilage classification.
//!
//! Two strategies implement [`Classifier`]:
//!
//! - [`ModelClassifier`] wraps a trained [`Model`]
//! - [`RuleClassifier`] applies fixed thresholds
//!
//! [`load_classifier`] picks one at startup depending on whether a model
//! artifact can be loaded. Both strategies fail open: whatever goes wrong,
//! the answer is [`Prediction::Ok`].
//!
//! # Example
//!
//! ```
//! use spoilage_core::{Classifier, RuleClassifier};
//! use spoilage_types::Prediction;
//!
//! let classifier = RuleClassifier::default();
//! assert_eq!(classifier.classify_raw("26", "50", "100", "500"), Prediction::Spoiled);
//! assert_eq!(classifier.classify_raw("20", "50", "100", "500"), Prediction::Ok);
//! assert_eq!(classifier.classify_raw("abc", "50", "100", "500"), Prediction::Ok);
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use spoilage_types::{Prediction, SensorValues};

use crate::error::{Error, Result};
use crate::model::{Model, ModelOutput, load_model};

/// Decides whether a reading indicates spoilage.
pub trait Classifier: Send + Sync {
    /// Classify already-parsed sensor values.
    fn classify(&self, values: &SensorValues) -> Prediction;

    /// Short name of the strategy, for logs and health output.
    fn name(&self) -> &'static str;

    /// Classify values given as text.
    ///
    /// If any field is not a finite number the reading is reported as
    /// [`Prediction::Ok`].
    fn classify_raw(&self, temperature: &str, humidity: &str, light: &str, gas_level: &str) -> Prediction {
        match SensorValues::parse(temperature, humidity, light, gas_level) {
            Ok(values) => self.classify(&values),
            Err(e) => {
                debug!("Unparsable input, classifying as OK: {}", e);
                Prediction::Ok
            }
        }
    }
}

/// Thresholds used by [`RuleClassifier`]. A reading strictly above any of
/// them is spoiled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Degrees Celsius.
    pub temperature_max: f64,
    /// Relative humidity percent.
    pub humidity_max: f64,
    /// Raw gas sensor level.
    pub gas_level_max: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            temperature_max: 25.0,
            humidity_max: 70.0,
            gas_level_max: 1000.0,
        }
    }
}

/// Threshold rule used when no trained model is available.
///
/// Light is accepted but does not take part in the decision.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    thresholds: RuleThresholds,
}

impl RuleClassifier {
    /// Create a rule classifier with custom thresholds.
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, values: &SensorValues) -> Prediction {
        let t = &self.thresholds;
        if values.temperature > t.temperature_max
            || values.humidity > t.humidity_max
            || values.gas_level > t.gas_level_max
        {
            Prediction::Spoiled
        } else {
            Prediction::Ok
        }
    }

    fn name(&self) -> &'static str {
        "rule"
    }
}

/// Classifier backed by a trained model.
pub struct ModelClassifier {
    model: Box<dyn Model>,
}

impl ModelClassifier {
    /// Wrap a loaded model.
    pub fn new<M: Model + 'static>(model: M) -> Self {
        Self {
            model: Box::new(model),
        }
    }
}

impl std::fmt::Debug for ModelClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClassifier").finish_non_exhaustive()
    }
}

impl Classifier for ModelClassifier {
    fn classify(&self, values: &SensorValues) -> Prediction {
        match self
            .model
            .predict(&values.features())
            .and_then(interpret_output)
        {
            Ok(prediction) => prediction,
            Err(e) => {
                warn!("Prediction error, classifying as OK: {}", e);
                Prediction::Ok
            }
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Map raw model output onto a [`Prediction`].
///
/// Numbers: nonzero is spoiled. Text is lower-cased but not trimmed; known
/// spellings first, then anything containing `"spo"` is spoiled.
pub fn interpret_output(output: ModelOutput) -> Result<Prediction> {
    match output {
        ModelOutput::Number(n) if !n.is_finite() => {
            Err(Error::Inference(format!("non-finite model output {n}")))
        }
        ModelOutput::Number(n) => Ok(if n != 0.0 {
            Prediction::Spoiled
        } else {
            Prediction::Ok
        }),
        ModelOutput::Text(s) => {
            let label = s.to_lowercase();
            Ok(match label.as_str() {
                "spoiled" | "1" | "true" | "yes" => Prediction::Spoiled,
                "ok" | "0" | "false" | "no" => Prediction::Ok,
                other if other.contains("spo") => Prediction::Spoiled,
                _ => Prediction::Ok,
            })
        }
    }
}

/// Select the classifier for this process.
///
/// A missing artifact is expected and selects the rule. An artifact that
/// exists but cannot be loaded is logged as a warning and also selects the
/// rule.
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Arc<dyn Classifier> {
    let path = path.as_ref();

    if !path.exists() {
        info!(
            "No ML model found at {} - using fallback rule",
            path.display()
        );
        return Arc::new(RuleClassifier::default());
    }

    match load_model(path) {
        Ok(model) => {
            info!("Loaded ML model from {}", path.display());
            Arc::new(ModelClassifier::new(model))
        }
        Err(e) => {
            warn!("Failed to load model, using fallback rule: {}", e);
            Arc::new(RuleClassifier::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;

    struct FixedModel(ModelOutput);

    impl Model for FixedModel {
        fn predict(&self, _features: &[f64; 4]) -> Result<ModelOutput> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    impl Model for FailingModel {
        fn predict(&self, _features: &[f64; 4]) -> Result<ModelOutput> {
            Err(Error::Inference("shape mismatch".to_string()))
        }
    }

    fn text(s: &str) -> Prediction {
        ModelClassifier::new(FixedModel(ModelOutput::Text(s.to_string())))
            .classify(&SensorValues::new(0.0, 0.0, 0.0, 0.0))
    }

    fn number(n: f64) -> Prediction {
        ModelClassifier::new(FixedModel(ModelOutput::Number(n)))
            .classify(&SensorValues::new(0.0, 0.0, 0.0, 0.0))
    }

    #[test]
    fn test_rule_triggers() {
        let rule = RuleClassifier::default();
        assert_eq!(rule.classify_raw("26", "50", "100", "500"), Prediction::Spoiled);
        assert_eq!(rule.classify_raw("20", "80", "100", "500"), Prediction::Spoiled);
        assert_eq!(rule.classify_raw("20", "50", "100", "1500"), Prediction::Spoiled);
        assert_eq!(rule.classify_raw("20", "50", "100", "500"), Prediction::Ok);
    }

    #[test]
    fn test_rule_boundaries_are_exclusive() {
        let rule = RuleClassifier::default();
        assert_eq!(rule.classify_raw("25", "70", "0", "1000"), Prediction::Ok);
        assert_eq!(rule.classify_raw("25.01", "70", "0", "1000"), Prediction::Spoiled);
    }

    #[test]
    fn test_rule_ignores_light() {
        let rule = RuleClassifier::default();
        assert_eq!(rule.classify_raw("20", "50", "1e9", "500"), Prediction::Ok);
        assert_eq!(rule.classify_raw("20", "50", "-1e9", "500"), Prediction::Ok);
    }

    #[test]
    fn test_rule_custom_thresholds() {
        let rule = RuleClassifier::new(RuleThresholds {
            temperature_max: 8.0,
            ..RuleThresholds::default()
        });
        assert_eq!(rule.classify_raw("9", "50", "0", "0"), Prediction::Spoiled);
        assert_eq!(rule.thresholds().temperature_max, 8.0);
    }

    #[test]
    fn test_parse_failure_is_ok() {
        let rule = RuleClassifier::default();
        assert_eq!(rule.classify_raw("abc", "50", "100", "500"), Prediction::Ok);
        assert_eq!(rule.classify_raw("30", "", "100", "500"), Prediction::Ok);
        assert_eq!(rule.classify_raw("NaN", "50", "100", "5000"), Prediction::Ok);

        let model = ModelClassifier::new(FixedModel(ModelOutput::Number(1.0)));
        assert_eq!(model.classify_raw("abc", "50", "100", "500"), Prediction::Ok);
    }

    #[test]
    fn test_model_numeric_output() {
        assert_eq!(number(1.0), Prediction::Spoiled);
        assert_eq!(number(-1.0), Prediction::Spoiled);
        assert_eq!(number(0.0), Prediction::Ok);
        assert_eq!(number(f64::NAN), Prediction::Ok);
    }

    #[test]
    fn test_model_text_output() {
        assert_eq!(text("Spoiled"), Prediction::Spoiled);
        assert_eq!(text("1"), Prediction::Spoiled);
        assert_eq!(text("TRUE"), Prediction::Spoiled);
        assert_eq!(text("yes"), Prediction::Spoiled);
        assert_eq!(text("OK"), Prediction::Ok);
        assert_eq!(text("0"), Prediction::Ok);
        assert_eq!(text("false"), Prediction::Ok);
        assert_eq!(text("No"), Prediction::Ok);
    }

    #[test]
    fn test_model_text_output_is_not_trimmed() {
        assert_eq!(text(" 1 "), Prediction::Ok);
        assert_eq!(text(" yes"), Prediction::Ok);
        assert_eq!(text(" spoiled "), Prediction::Spoiled);
    }

    #[test]
    fn test_model_text_substring_fallback() {
        assert_eq!(text("likely_spoilt"), Prediction::Spoiled);
        assert_eq!(text("SPOILAGE"), Prediction::Spoiled);
        assert_eq!(text("fresh"), Prediction::Ok);
        assert_eq!(text(""), Prediction::Ok);
    }

    #[test]
    fn test_model_error_is_ok() {
        let model = ModelClassifier::new(FailingModel);
        assert_eq!(
            model.classify(&SensorValues::new(90.0, 99.0, 0.0, 9000.0)),
            Prediction::Ok
        );
    }

    #[test]
    fn test_load_classifier_missing_artifact_uses_rule() {
        let classifier = load_classifier("/nonexistent/spoilage_model.json");
        assert_eq!(classifier.name(), "rule");
        assert_eq!(
            classifier.classify(&SensorValues::new(26.0, 50.0, 100.0, 500.0)),
            Prediction::Spoiled
        );
    }

    #[test]
    fn test_load_classifier_corrupt_artifact_uses_rule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"\x80\x04\x95 not json").unwrap();

        let classifier = load_classifier(&path);
        assert_eq!(classifier.name(), "rule");
    }

    #[test]
    fn test_load_classifier_valid_artifact_uses_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = crate::model::ModelArtifact::Linear(LinearModel {
            weights: [0.0, 0.0, 1.0, 0.0],
            bias: -500.0,
            labels: None,
        });
        std::fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();

        let classifier = load_classifier(&path);
        assert_eq!(classifier.name(), "model");
        // This model only looks at light, unlike the rule.
        assert_eq!(
            classifier.classify(&SensorValues::new(20.0, 50.0, 600.0, 500.0)),
            Prediction::Spoiled
        );
        assert_eq!(
            classifier.classify(&SensorValues::new(40.0, 50.0, 100.0, 500.0)),
            Prediction::Ok
        );
    }
}
