use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::dto::gateway_dto::{
    ExplainRequest, ExplainResponse, GatewayErrorBody, McqRequest, McqResponse,
};
use crate::error::GameError;
use crate::services::ai_service::AIService;

/// Produces raw multiple-choice text for a diagnosis.
pub trait QuestionGateway {
    fn generate_question(
        &self,
        disease: &str,
    ) -> impl Future<Output = Result<String, GameError>> + Send;
}

/// Produces a short explanation for a diagnosis and the question asked about it.
pub trait ExplanationGateway {
    fn explain(
        &self,
        disease: &str,
        mcq: &str,
    ) -> impl Future<Output = Result<String, GameError>> + Send;
}

/// Calls the `/api/mcq` and `/api/explain` endpoints of the gateway server.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, String>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if !resp.status().is_success() {
            return Err(describe_failure(resp).await);
        }

        resp.json::<T>()
            .await
            .map_err(|e| format!("unexpected response from {}: {}", url, e))
    }
}

async fn describe_failure(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<GatewayErrorBody>(&text) {
        Ok(body) => match body.details {
            Some(details) => format!("status {}: {} ({})", status.as_u16(), body.error, details),
            None => format!("status {}: {}", status.as_u16(), body.error),
        },
        Err(_) => format!("status {}", status.as_u16()),
    }
}

impl QuestionGateway for HttpGateway {
    async fn generate_question(&self, disease: &str) -> Result<String, GameError> {
        let req = McqRequest {
            disease: disease.to_string(),
        };
        let resp: McqResponse = self
            .post("/api/mcq", &req)
            .await
            .map_err(GameError::Generation)?;
        Ok(resp.mcq)
    }
}

impl ExplanationGateway for HttpGateway {
    async fn explain(&self, disease: &str, mcq: &str) -> Result<String, GameError> {
        let req = ExplainRequest {
            disease: disease.to_string(),
            mcq: mcq.to_string(),
        };
        let resp: ExplainResponse = self
            .post("/api/explain", &req)
            .await
            .map_err(GameError::Explanation)?;
        Ok(resp.explanation)
    }
}

impl QuestionGateway for AIService {
    async fn generate_question(&self, disease: &str) -> Result<String, GameError> {
        self.generate_mcq(disease)
            .await
            .map_err(|e| GameError::Generation(e.to_string()))
    }
}

impl ExplanationGateway for AIService {
    async fn explain(&self, disease: &str, mcq: &str) -> Result<String, GameError> {
        AIService::explain(self, disease, mcq)
            .await
            .map_err(|e| GameError::Explanation(e.to_string()))
    }
}
