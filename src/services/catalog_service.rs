use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use validator::Validate;

use crate::error::GameError;
use crate::models::video_case::VideoCase;

/// The fixed list of cases a session draws from.
#[derive(Debug, Clone)]
pub struct Catalog {
    cases: Vec<VideoCase>,
}

impl Catalog {
    pub fn new(cases: Vec<VideoCase>) -> Result<Self, GameError> {
        if cases.is_empty() {
            return Err(GameError::CatalogLoad("catalog is empty".to_string()));
        }
        for (idx, case) in cases.iter().enumerate() {
            case.validate().map_err(|e| {
                GameError::CatalogLoad(format!("entry {} is invalid: {}", idx, e))
            })?;
        }
        Ok(Self { cases })
    }

    pub fn from_json(raw: &str) -> Result<Self, GameError> {
        let cases: Vec<VideoCase> = serde_json::from_str(raw)
            .map_err(|e| GameError::CatalogLoad(format!("malformed catalog: {}", e)))?;
        Self::new(cases)
    }

    pub async fn load_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            GameError::CatalogLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), cases = catalog.len(), "Loaded video catalog");
        Ok(catalog)
    }

    pub async fn load_url(client: &Client, url: &str) -> Result<Self, GameError> {
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| GameError::CatalogLoad(format!("request to {} failed: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GameError::CatalogLoad(format!(
                "catalog status {} from {}",
                status.as_u16(),
                url
            )));
        }

        let raw = resp
            .text()
            .await
            .map_err(|e| GameError::CatalogLoad(format!("cannot read catalog body: {}", e)))?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(%url, cases = catalog.len(), "Loaded video catalog");
        Ok(catalog)
    }

    pub fn cases(&self) -> &[VideoCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.cases.iter().any(|c| c.id == id)
    }

    /// Uniform pick. The constructor guarantees at least one case.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &VideoCase {
        self.cases
            .choose(rng)
            .unwrap_or(&self.cases[0])
    }
}
