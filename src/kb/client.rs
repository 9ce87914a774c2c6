//! HTTP client for the knowledge base retrieve-and-generate endpoint.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::AwsConfig;
use crate::models::RetrievedReference;

use super::sign::{self, CanonicalRequest, SignError};
use super::types::{ApiErrorBody, RetrieveAndGenerateRequest, RetrieveAndGenerateResponse};

/// Signing service name shared by all Bedrock runtime endpoints.
const SERVICE: &str = "bedrock";

const RETRIEVE_AND_GENERATE_PATH: &str = "/retrieveAndGenerate";

/// Failures surfaced by the remote call, typed so callers can react to the
/// kind without inspecting message strings.
#[derive(Debug, Error)]
pub enum KbError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("knowledge base not found: {0}")]
    NotFound(String),

    /// The conversation session id is no longer valid. The caller retries
    /// exactly once with the session id omitted; see [`KbClient::ask`].
    #[error("conversation session is no longer valid")]
    StaleSession,

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("service error {code}: {message}")]
    Api { code: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Sign(#[from] SignError),
}

impl KbError {
    /// Shorthand for logs and the doctor summary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access denied",
            Self::NotFound(_) => "not found",
            Self::StaleSession => "stale session",
            Self::Throttled(_) => "throttled",
            Self::Api { .. } => "service error",
            Self::Http(_) => "network error",
            Self::Encode(_) | Self::Sign(_) => "request error",
        }
    }
}

/// The useful part of a retrieve-and-generate response.
#[derive(Debug, Clone)]
pub struct KbAnswer {
    /// Generated answer text.
    pub text: String,
    /// Raw references behind the answer, in service order.
    pub references: Vec<RetrievedReference>,
    /// Session id to reuse for conversational continuity.
    pub session_id: Option<String>,
}

/// Client for the managed retrieve-and-generate service.
#[derive(Debug, Clone)]
pub struct KbClient {
    credentials: AwsConfig,
    endpoint: String,
    client: Client,
}

impl KbClient {
    /// Client against the regional service endpoint.
    pub fn new(credentials: AwsConfig) -> Self {
        let endpoint = format!(
            "https://bedrock-agent-runtime.{}.amazonaws.com",
            credentials.region
        );
        Self::with_endpoint(credentials, endpoint)
    }

    /// Client against an explicit endpoint, e.g. a local server in tests.
    pub fn with_endpoint(credentials: AwsConfig, endpoint: impl Into<String>) -> Self {
        Self {
            credentials,
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    pub fn region(&self) -> &str {
        &self.credentials.region
    }

    /// Authority part of the endpoint, as signed in the `host` header.
    fn host(&self) -> &str {
        match self.endpoint.split_once("://") {
            Some((_, authority)) => authority,
            None => &self.endpoint,
        }
    }

    /// Ask one question, transparently recovering from a stale session.
    ///
    /// The only retry policy in the system: when the service rejects the
    /// session id, the call is repeated exactly once without it. Every other
    /// failure is returned as-is.
    pub async fn ask(
        &self,
        prompt: &str,
        knowledge_base_id: &str,
        model_arn: &str,
        session_id: Option<&str>,
    ) -> Result<KbAnswer, KbError> {
        match self
            .retrieve_and_generate(prompt, knowledge_base_id, model_arn, session_id)
            .await
        {
            Err(KbError::StaleSession) if session_id.is_some() => {
                tracing::warn!("session no longer valid, retrying without session id");
                self.retrieve_and_generate(prompt, knowledge_base_id, model_arn, None)
                    .await
            }
            other => other,
        }
    }

    /// One signed POST to `retrieveAndGenerate`; no retries at this level.
    pub async fn retrieve_and_generate(
        &self,
        prompt: &str,
        knowledge_base_id: &str,
        model_arn: &str,
        session_id: Option<&str>,
    ) -> Result<KbAnswer, KbError> {
        let request =
            RetrieveAndGenerateRequest::new(prompt, knowledge_base_id, model_arn, session_id);
        let payload = serde_json::to_vec(&request)?;

        let now = Utc::now();
        let amz_date = sign::amz_date(&now);

        let headers = [
            ("content-type", "application/json"),
            ("host", self.host()),
            ("x-amz-date", amz_date.as_str()),
        ];
        let authorization = sign::authorization(
            &CanonicalRequest {
                method: "POST",
                uri: RETRIEVE_AND_GENERATE_PATH,
                query: "",
                headers: &headers,
                payload: &payload,
            },
            &self.credentials.access_key_id,
            &self.credentials.secret_access_key,
            &self.credentials.region,
            SERVICE,
            &now,
        )?;

        tracing::debug!(knowledge_base_id, session = session_id.is_some(), "querying knowledge base");

        let response = self
            .client
            .post(format!("{}{}", self.endpoint, RETRIEVE_AND_GENERATE_PATH))
            .header("content-type", "application/json")
            .header("x-amz-date", amz_date)
            .header("authorization", authorization)
            .body(payload)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Convert the HTTP response into an answer or a typed error.
    async fn handle_response(&self, response: reqwest::Response) -> Result<KbAnswer, KbError> {
        let status = response.status();
        if status.is_success() {
            let wire: RetrieveAndGenerateResponse = response.json().await?;
            return Ok(KbAnswer {
                text: wire.output.text.clone(),
                references: wire.references(),
                session_id: wire.session_id,
            });
        }

        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        Err(classify_error(status, error_type.as_deref(), &body))
    }
}

/// Map an error response to a [`KbError`].
///
/// The service names the failure in the `x-amzn-errortype` header (sometimes
/// namespaced, e.g. `com.amazon...#ValidationException:http...`) and carries
/// a human message in the JSON body. A `ValidationException` that mentions
/// the session is the stale-session case from the retry rule.
pub fn classify_error(status: StatusCode, error_type: Option<&str>, body: &str) -> KbError {
    let code = error_type
        .map(normalize_error_code)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.trim().to_string());

    match code.as_str() {
        "AccessDeniedException" | "UnauthorizedException" => KbError::AccessDenied(message),
        "ResourceNotFoundException" => KbError::NotFound(message),
        "ThrottlingException" => KbError::Throttled(message),
        "ValidationException" if message.to_lowercase().contains("session") => {
            KbError::StaleSession
        }
        _ => KbError::Api { code, message },
    }
}

/// Strip the namespace prefix and any `:http` suffix from the error type
/// header value.
fn normalize_error_code(raw: &str) -> String {
    let after_hash = raw.rsplit('#').next().unwrap_or(raw);
    let before_colon = after_hash.split(':').next().unwrap_or(after_hash);
    before_colon.to_string()
}
