//! Gesture classifier adapter
//!
//! Wraps a pre-trained multi-class linear scorer (one-vs-rest weight
//! rows plus intercepts, optional feature standardization) serialized as
//! JSON. The model is loaded once at startup and immutable for the
//! process lifetime; inference is a pure function of the feature vector.

use gesture_core::{GestureError, GestureLabel, GestureResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized pre-trained classifier state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureModel {
    /// Output labels, one per weight row
    pub classes: Vec<GestureLabel>,
    /// Expected feature layout, qualified by channel index
    pub feature_names: Vec<String>,
    /// One weight row per class
    pub weights: Vec<Vec<f32>>,
    /// One intercept per class
    pub intercepts: Vec<f32>,
    /// Optional standardization: per-feature mean
    #[serde(default)]
    pub scaler_mean: Option<Vec<f32>>,
    /// Optional standardization: per-feature scale (std)
    #[serde(default)]
    pub scaler_scale: Option<Vec<f32>>,
}

impl GestureModel {
    fn validate(&self) -> GestureResult<()> {
        if self.classes.is_empty() {
            return Err(GestureError::model("model has no classes"));
        }
        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].contains(class) {
                return Err(GestureError::model(format!("duplicate class {}", class)));
            }
        }
        if self.feature_names.is_empty() {
            return Err(GestureError::model("model has no features"));
        }
        if self.weights.len() != self.classes.len() {
            return Err(GestureError::model(format!(
                "{} weight rows for {} classes",
                self.weights.len(),
                self.classes.len()
            )));
        }
        if self.intercepts.len() != self.classes.len() {
            return Err(GestureError::model(format!(
                "{} intercepts for {} classes",
                self.intercepts.len(),
                self.classes.len()
            )));
        }
        for (i, row) in self.weights.iter().enumerate() {
            if row.len() != self.feature_names.len() {
                return Err(GestureError::model(format!(
                    "weight row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    self.feature_names.len()
                )));
            }
        }
        for scaler in [&self.scaler_mean, &self.scaler_scale].into_iter().flatten() {
            if scaler.len() != self.feature_names.len() {
                return Err(GestureError::model(format!(
                    "scaler has {} entries, expected {}",
                    scaler.len(),
                    self.feature_names.len()
                )));
            }
        }
        Ok(())
    }
}

/// Maps one feature vector to exactly one gesture label
pub struct GestureClassifier {
    model: GestureModel,
}

impl GestureClassifier {
    /// Wrap an in-memory model, validating its dimensions
    pub fn from_model(model: GestureModel) -> GestureResult<Self> {
        model.validate()?;
        Ok(GestureClassifier { model })
    }

    /// Load the pre-trained state from a JSON artifact. Any failure here
    /// is fatal to the pipeline: no classification is possible without
    /// a usable model.
    pub fn from_file(path: impl AsRef<Path>) -> GestureResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GestureError::model(format!("cannot read {}: {}", path.display(), e))
        })?;
        let model: GestureModel = serde_json::from_str(&raw).map_err(|e| {
            GestureError::model(format!("cannot parse {}: {}", path.display(), e))
        })?;
        Self::from_model(model)
    }

    /// Feature vector length the model was trained on
    pub fn feature_count(&self) -> usize {
        self.model.feature_names.len()
    }

    /// Expected feature layout
    pub fn feature_names(&self) -> &[String] {
        &self.model.feature_names
    }

    /// Classify one feature vector.
    ///
    /// NaN and infinite entries are replaced with 0 before inference: a
    /// deliberate lossy policy so occasional degenerate features never
    /// abort real-time classification. Ties break toward the earlier
    /// class row, so repeated calls on the same vector always return the
    /// same label.
    pub fn classify(&self, features: &[f32]) -> GestureResult<GestureLabel> {
        if features.len() != self.feature_count() {
            return Err(GestureError::shape(format!(
                "feature vector has {} entries, model expects {}",
                features.len(),
                self.feature_count()
            )));
        }

        let mut sanitized: Vec<f32> = features
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect();

        if let (Some(mean), Some(scale)) = (&self.model.scaler_mean, &self.model.scaler_scale) {
            for ((v, m), s) in sanitized.iter_mut().zip(mean).zip(scale) {
                *v = if *s != 0.0 { (*v - m) / s } else { 0.0 };
            }
        }

        let mut best_class = self.model.classes[0];
        let mut best_score = f32::NEG_INFINITY;
        for ((class, row), intercept) in self
            .model
            .classes
            .iter()
            .zip(&self.model.weights)
            .zip(&self.model.intercepts)
        {
            let score: f32 =
                row.iter().zip(&sanitized).map(|(w, x)| w * x).sum::<f32>() + intercept;
            if score > best_score {
                best_score = score;
                best_class = *class;
            }
        }

        Ok(best_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-feature, three-class model: picks the class whose feature
    /// dominates, Rest when both are small
    fn test_model() -> GestureModel {
        GestureModel {
            classes: vec![GestureLabel::Rest, GestureLabel::Open, GestureLabel::Close],
            feature_names: vec!["ch0_mav".into(), "ch1_mav".into()],
            weights: vec![
                vec![-1.0, -1.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
            ],
            intercepts: vec![0.5, 0.0, 0.0],
            scaler_mean: None,
            scaler_scale: None,
        }
    }

    #[test]
    fn test_classification_picks_highest_score() {
        let classifier = GestureClassifier::from_model(test_model()).unwrap();
        assert_eq!(classifier.classify(&[2.0, 0.1]).unwrap(), GestureLabel::Open);
        assert_eq!(classifier.classify(&[0.1, 2.0]).unwrap(), GestureLabel::Close);
        assert_eq!(classifier.classify(&[0.0, 0.0]).unwrap(), GestureLabel::Rest);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let classifier = GestureClassifier::from_model(test_model()).unwrap();
        let features = [1.375, 0.625];
        let first = classifier.classify(&features).unwrap();
        for _ in 0..100 {
            assert_eq!(classifier.classify(&features).unwrap(), first);
        }
    }

    #[test]
    fn test_tie_breaks_toward_earlier_class() {
        let classifier = GestureClassifier::from_model(test_model()).unwrap();
        // Open and Close score identically; Open comes first
        assert_eq!(classifier.classify(&[1.0, 1.0]).unwrap(), GestureLabel::Open);
    }

    #[test]
    fn test_nan_and_inf_zeroed_before_inference() {
        let classifier = GestureClassifier::from_model(test_model()).unwrap();
        let degenerate = classifier.classify(&[f32::NAN, f32::INFINITY]).unwrap();
        let zeroed = classifier.classify(&[0.0, 0.0]).unwrap();
        assert_eq!(degenerate, zeroed);
    }

    #[test]
    fn test_wrong_length_vector_rejected() {
        let classifier = GestureClassifier::from_model(test_model()).unwrap();
        let err = classifier.classify(&[1.0]);
        assert!(matches!(err, Err(GestureError::InvalidShape { .. })));
    }

    #[test]
    fn test_standardization_applied() {
        let mut model = test_model();
        model.scaler_mean = Some(vec![10.0, 10.0]);
        model.scaler_scale = Some(vec![1.0, 1.0]);
        let classifier = GestureClassifier::from_model(model).unwrap();

        // Raw 12.0 standardizes to 2.0 on ch0: Open
        assert_eq!(
            classifier.classify(&[12.0, 10.1]).unwrap(),
            GestureLabel::Open
        );
    }

    #[test]
    fn test_inconsistent_model_rejected() {
        let mut model = test_model();
        model.weights.pop();
        assert!(matches!(
            GestureClassifier::from_model(model),
            Err(GestureError::ModelUnavailable { .. })
        ));

        let mut model = test_model();
        model.weights[0].push(0.0);
        assert!(GestureClassifier::from_model(model).is_err());

        let mut model = test_model();
        model.classes[1] = GestureLabel::Rest;
        assert!(GestureClassifier::from_model(model).is_err());
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let err = GestureClassifier::from_file("/nonexistent/svm_model.json");
        assert!(matches!(err, Err(GestureError::ModelUnavailable { .. })));
    }

    #[test]
    fn test_artifact_round_trip() {
        let dir = std::env::temp_dir().join("gesture-classifier-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(&path, serde_json::to_string(&test_model()).unwrap()).unwrap();

        let classifier = GestureClassifier::from_file(&path).unwrap();
        assert_eq!(classifier.feature_count(), 2);
        assert_eq!(classifier.classify(&[2.0, 0.0]).unwrap(), GestureLabel::Open);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_garbage_artifact_is_model_unavailable() {
        let dir = std::env::temp_dir().join("gesture-classifier-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "not json").unwrap();

        let err = GestureClassifier::from_file(&path);
        assert!(matches!(err, Err(GestureError::ModelUnavailable { .. })));

        std::fs::remove_file(&path).ok();
    }
}
