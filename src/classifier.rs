use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Label plus the per-category confidence distribution returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    #[serde(default)]
    pub scores: HashMap<String, f64>,
}

/// Text-classification collaborator. The model lives behind this trait; the
/// service only ever sees a label and scores.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, text: &str) -> anyhow::Result<Prediction>;
}

/// Classifier backed by the model-serving sidecar's HTTP endpoint.
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build classifier http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, text: &str) -> anyhow::Result<Prediction> {
        let resp = self
            .client
            .post(format!("{}/predict", self.endpoint))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("classifier request")?
            .error_for_status()
            .context("classifier returned error status")?;
        let prediction = resp
            .json::<Prediction>()
            .await
            .context("decode classifier response")?;
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_decodes_with_scores() {
        let json = r#"{"category":"Jaringan","scores":{"Jaringan":0.92,"Akun":0.08}}"#;
        let p: Prediction = serde_json::from_str(json).expect("decode");
        assert_eq!(p.category, "Jaringan");
        assert_eq!(p.scores.len(), 2);
    }

    #[test]
    fn prediction_decodes_without_scores() {
        let p: Prediction = serde_json::from_str(r#"{"category":"Akun"}"#).expect("decode");
        assert_eq!(p.category, "Akun");
        assert!(p.scores.is_empty());
    }
}
