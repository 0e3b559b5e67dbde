use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;

use crate::classifier::{Classifier, HttpClassifier};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let classifier = Arc::new(HttpClassifier::new(
            &config.classifier.endpoint,
            Duration::from_secs(config.classifier.timeout_seconds),
        )?) as Arc<dyn Classifier>;

        Ok(Self {
            db,
            config,
            classifier,
        })
    }
}
