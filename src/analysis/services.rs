use tracing::{debug, warn};

use super::error::InferenceError;
use super::labels::ClassLabels;
use crate::classifier::Classifier;
use crate::images::services::ImageTensor;
use crate::nutrition::{label::parse, NutritionRecord};

/// Index and value of the highest probability; ties go to the lowest index.
/// NaN entries are skipped, so an all-NaN vector has no winner.
fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        })
}

/// Turn a probability vector into a nutrition record for the winning class.
pub fn assemble(
    probs: &[f32],
    labels: &ClassLabels,
    daily_target: f64,
) -> Result<NutritionRecord, InferenceError> {
    let (index, confidence) = argmax(probs).ok_or(InferenceError::EmptyPrediction)?;
    if probs.len() != labels.len() {
        warn!(classes = probs.len(), labels = labels.len(), "model output size differs from label count");
    }

    let raw = labels.get(index).ok_or(InferenceError::ConfigMismatch {
        index,
        len: labels.len(),
    })?;
    debug!(index, confidence, label = %raw, "class predicted");

    Ok(NutritionRecord::build(index, confidence, parse(raw), daily_target))
}

pub async fn run(
    input: &ImageTensor,
    classifier: &dyn Classifier,
    labels: &ClassLabels,
    daily_target: f64,
) -> Result<NutritionRecord, InferenceError> {
    let probs = classifier
        .predict(input)
        .await
        .map_err(|e| InferenceError::Model(format!("{:#}", e)))?;
    assemble(&probs, labels, daily_target)
}

#[cfg(test)]
mod inference_tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(Vec<f32>);

    #[async_trait]
    impl Classifier for Fixed {
        async fn predict(&self, _input: &ImageTensor) -> anyhow::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl Classifier for Broken {
        async fn predict(&self, _input: &ImageTensor) -> anyhow::Result<Vec<f32>> {
            anyhow::bail!("connection refused")
        }
    }

    fn one_hot(len: usize, at: usize, p: f32) -> Vec<f32> {
        let rest = (1.0 - p) / (len - 1) as f32;
        (0..len).map(|i| if i == at { p } else { rest }).collect()
    }

    fn tensor() -> ImageTensor {
        ImageTensor { size: 1, data: vec![0.0; 3] }
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.7]), Some((2, 0.7)));
        assert_eq!(argmax(&[0.6, f32::NAN, 0.4]), Some((0, 0.6)));
        assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
    }

    #[test]
    fn all_nan_probabilities_are_a_model_error() {
        let err = assemble(&[f32::NAN; 35], &ClassLabels::builtin(), 2000.0).unwrap_err();
        assert!(matches!(err, InferenceError::EmptyPrediction));
    }

    #[tokio::test]
    async fn run_builds_record_for_rendang() {
        let labels = ClassLabels::builtin();
        let model = Fixed(one_hot(labels.len(), 27, 0.9));
        let r = run(&tensor(), &model, &labels, 2000.0).await.unwrap();
        assert_eq!(r.class_index, 27);
        assert_eq!(r.food_name, "Rendang");
        assert_eq!(r.calories, 468);
        assert!((r.confidence - 0.9).abs() < 1e-6);
        assert!((r.daily_pct - 23.4).abs() < 1e-9);
        assert!((r.portions_for_daily - 2000.0 / 468.0).abs() < 1e-9);
        assert!(r.advice.starts_with("Calories are high per serving"));
        assert!(r.label_parsed);
    }

    #[test]
    fn index_past_label_list_is_config_mismatch() {
        let labels = ClassLabels::from_lines("A (1) = 1 kkal (1% lemak, 1% karb, 1% prot)\nB").unwrap();
        let err = assemble(&[0.1, 0.2, 0.7], &labels, 2000.0).unwrap_err();
        assert!(matches!(err, InferenceError::ConfigMismatch { index: 2, len: 2 }));
    }

    #[test]
    fn empty_probabilities_are_a_model_error() {
        let err = assemble(&[], &ClassLabels::builtin(), 2000.0).unwrap_err();
        assert!(matches!(err, InferenceError::EmptyPrediction));
    }

    #[test]
    fn unparseable_label_still_yields_record() {
        let labels = ClassLabels::from_lines("Mystery Dish").unwrap();
        let r = assemble(&[1.0], &labels, 2000.0).unwrap();
        assert_eq!(r.food_name, "Mystery Dish");
        assert_eq!(r.calories, 0);
        assert!(!r.label_parsed);
    }

    #[tokio::test]
    async fn classifier_failure_is_reported() {
        let err = run(&tensor(), &Broken, &ClassLabels::builtin(), 2000.0)
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Model(ref m) if m.contains("connection refused")));
    }
}
