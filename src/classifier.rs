use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::images::services::ImageTensor;

/// The food-image model: one normalized tensor in, one probability per class out.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, input: &ImageTensor) -> anyhow::Result<Vec<f32>>;
}

/// Client for a TensorFlow-Serving style REST predict endpoint.
#[derive(Clone)]
pub struct ServingClassifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a Vec<Vec<[f32; 3]>>; 1],
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

impl ServingClassifier {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("build model http client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Classifier for ServingClassifier {
    async fn predict(&self, input: &ImageTensor) -> anyhow::Result<Vec<f32>> {
        let nested = input.to_nested();
        let body: PredictResponse = self
            .client
            .post(&self.url)
            .json(&PredictRequest { instances: [&nested] })
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("model predict request")?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("model predict status")?
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("model predict response")?;

        body.predictions
            .into_iter()
            .next()
            .context("model returned no predictions")
    }
}

#[cfg(test)]
mod classifier_tests {
    use super::*;

    #[test]
    fn request_wraps_single_instance() {
        let tensor = ImageTensor {
            size: 1,
            data: vec![0.0, 0.5, 1.0],
        };
        let nested = tensor.to_nested();
        let json = serde_json::to_value(PredictRequest { instances: [&nested] }).unwrap();
        assert_eq!(json, serde_json::json!({ "instances": [[[[0.0, 0.5, 1.0]]]] }));
    }

    #[tokio::test]
    async fn transport_error_hides_model_url() {
        let model = ServingClassifier::new("http://127.0.0.1:1/v1/models/internal-food:predict").unwrap();
        let tensor = ImageTensor { size: 1, data: vec![0.0; 3] };
        let err = model.predict(&tensor).await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("model predict request"));
        assert!(!msg.contains("internal-food"));
    }

    #[test]
    fn response_takes_first_prediction_row() {
        let body: PredictResponse =
            serde_json::from_str(r#"{"predictions": [[0.1, 0.7, 0.2]]}"#).unwrap();
        assert_eq!(body.predictions[0], vec![0.1, 0.7, 0.2]);
    }
}
