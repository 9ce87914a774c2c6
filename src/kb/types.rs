//! Wire shapes for the `retrieveAndGenerate` endpoint.
//!
//! Mirrors the service's JSON surface closely enough to round-trip what we
//! use: the generated text, the retrieved references behind it, and the
//! session id for conversational follow-ups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::RetrievedReference;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveAndGenerateRequest {
    pub input: QueryInput,
    pub retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl RetrieveAndGenerateRequest {
    pub fn new(
        prompt: impl Into<String>,
        knowledge_base_id: impl Into<String>,
        model_arn: impl Into<String>,
        session_id: Option<&str>,
    ) -> Self {
        Self {
            input: QueryInput {
                text: prompt.into(),
            },
            retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration {
                config_type: "KNOWLEDGE_BASE".to_string(),
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id: knowledge_base_id.into(),
                    model_arn: model_arn.into(),
                },
            },
            session_id: session_id.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryInput {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveAndGenerateConfiguration {
    #[serde(rename = "type")]
    pub config_type: String,
    pub knowledge_base_configuration: KnowledgeBaseConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfiguration {
    pub knowledge_base_id: String,
    pub model_arn: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveAndGenerateResponse {
    pub output: GeneratedOutput,
    #[serde(default)]
    pub citations: Vec<CitationGroup>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl RetrieveAndGenerateResponse {
    /// Flatten every citation group into the references it retrieved.
    pub fn references(&self) -> Vec<RetrievedReference> {
        self.citations
            .iter()
            .flat_map(|group| group.retrieved_references.iter())
            .map(WireReference::to_reference)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedOutput {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CitationGroup {
    #[serde(default)]
    pub retrieved_references: Vec<WireReference>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireReference {
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub location: Option<WireLocation>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl WireReference {
    /// Lift a wire reference into the local model: pick the locator from
    /// whichever location variant is present and flatten metadata values to
    /// strings.
    pub fn to_reference(&self) -> RetrievedReference {
        let text = self
            .content
            .as_ref()
            .and_then(|c| c.text.clone())
            .unwrap_or_default();

        let locator = self
            .location
            .as_ref()
            .map(WireLocation::locator)
            .unwrap_or_default();

        let metadata = self
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), flatten_value(value)))
            .collect();

        RetrievedReference {
            text,
            locator,
            metadata,
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WireContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// Source location of a retrieved chunk. The service reports exactly one of
/// these variants depending on the data source type.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireLocation {
    #[serde(rename = "type", default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub s3_location: Option<S3Location>,
    #[serde(default)]
    pub web_location: Option<UrlLocation>,
    #[serde(default)]
    pub confluence_location: Option<UrlLocation>,
    #[serde(default)]
    pub salesforce_location: Option<UrlLocation>,
    #[serde(rename = "sharePointLocation", default)]
    pub share_point_location: Option<UrlLocation>,
}

impl WireLocation {
    pub fn locator(&self) -> String {
        if let Some(s3) = &self.s3_location {
            return s3.uri.clone().unwrap_or_default();
        }
        let url = self
            .web_location
            .as_ref()
            .or(self.confluence_location.as_ref())
            .or(self.salesforce_location.as_ref())
            .or(self.share_point_location.as_ref());
        url.and_then(|loc| loc.url.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct S3Location {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UrlLocation {
    #[serde(default)]
    pub url: Option<String>,
}

/// Error payload the service returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
