use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::TARGET_PROVIDER_REQUEST;

const API_VERSION: &str = "2023-04-01";

/// The four analysis operations the gateway exposes. The wire name of each
/// kind matches what the text-analytics provider expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    EntityRecognition,
    PiiEntityRecognition,
    KeyPhraseExtraction,
    EntityLinking,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::EntityRecognition => "EntityRecognition",
            OperationKind::PiiEntityRecognition => "PiiEntityRecognition",
            OperationKind::KeyPhraseExtraction => "KeyPhraseExtraction",
            OperationKind::EntityLinking => "EntityLinking",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to analysis provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// The outbound analysis seam. Handlers hold this as a trait object so tests
/// can substitute a fake provider for the network client.
#[async_trait]
pub trait TextAnalysisProvider: Send + Sync {
    async fn analyze(
        &self,
        kind: OperationKind,
        documents: &[String],
        language: &str,
    ) -> Result<Value, ProviderError>;
}

/// HTTP client for the cloud Language service, authenticated with a
/// subscription key. One outbound request per `analyze` call; no retries.
pub struct LanguageClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LanguageClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/language/:analyze-text?api-version={}",
            self.endpoint.trim_end_matches('/'),
            API_VERSION
        )
    }
}

#[async_trait]
impl TextAnalysisProvider for LanguageClient {
    async fn analyze(
        &self,
        kind: OperationKind,
        documents: &[String],
        language: &str,
    ) -> Result<Value, ProviderError> {
        let analysis_documents: Vec<Value> = documents
            .iter()
            .enumerate()
            .map(|(i, text)| {
                json!({
                    "id": (i + 1).to_string(),
                    "language": language,
                    "text": text,
                })
            })
            .collect();

        let request_body = json!({
            "kind": kind.as_str(),
            "parameters": {},
            "analysisInput": {
                "documents": analysis_documents,
            },
        });

        debug!(
            target: TARGET_PROVIDER_REQUEST,
            "Sending {} request for {} document(s)",
            kind.as_str(),
            documents.len()
        );

        let response = self
            .http
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

/// Forwards a validated document sequence to the provider and relays the
/// result untouched. Failures are logged here with full detail; callers only
/// ever see the opaque [`ProviderError`].
pub async fn dispatch(
    provider: &dyn TextAnalysisProvider,
    kind: OperationKind,
    documents: &[String],
) -> Result<Value, ProviderError> {
    match provider.analyze(kind, documents, "en").await {
        Ok(result) => Ok(result),
        Err(e) => {
            error!(
                target: TARGET_PROVIDER_REQUEST,
                "Error analyzing documents ({}): {}",
                kind.as_str(),
                e
            );
            Err(e)
        }
    }
}
