//! Wire-shape and error-classification tests for the knowledge base client.

use reqwest::StatusCode;

use courtside::kb::client::{classify_error, KbError};
use courtside::kb::types::{RetrieveAndGenerateRequest, RetrieveAndGenerateResponse};

mod request_shape {
    use super::*;

    #[test]
    fn serializes_the_knowledge_base_configuration() {
        let request = RetrieveAndGenerateRequest::new(
            "What is traveling?",
            "KB123",
            "us.anthropic.claude-3-5-sonnet-20241022-v2:0",
            None,
        );
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["input"]["text"], "What is traveling?");
        assert_eq!(json["retrieveAndGenerateConfiguration"]["type"], "KNOWLEDGE_BASE");
        assert_eq!(
            json["retrieveAndGenerateConfiguration"]["knowledgeBaseConfiguration"]
                ["knowledgeBaseId"],
            "KB123"
        );
    }

    #[test]
    fn omits_session_id_when_absent() {
        let request = RetrieveAndGenerateRequest::new("q", "kb", "model", None);
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("sessionId").is_none());
    }

    #[test]
    fn carries_session_id_when_present() {
        let request = RetrieveAndGenerateRequest::new("q", "kb", "model", Some("abc"));
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["sessionId"], "abc");
    }
}

mod response_shape {
    use super::*;

    const RESPONSE: &str = r#"{
        "output": { "text": "Traveling is a violation." },
        "sessionId": "session-42",
        "citations": [
            {
                "generatedResponsePart": { "textResponsePart": { "text": "Traveling" } },
                "retrievedReferences": [
                    {
                        "content": { "text": "Rule 10, Section XIII covers traveling." },
                        "location": {
                            "type": "S3",
                            "s3Location": { "uri": "s3://corpus/rulebook.pdf" }
                        },
                        "metadata": { "rule": "10", "page": 42 },
                        "score": 0.91
                    },
                    {
                        "content": { "text": "Interpretation from the web." },
                        "location": {
                            "type": "WEB",
                            "webLocation": { "url": "https://example.com/rules" }
                        }
                    }
                ]
            },
            { "retrievedReferences": [] }
        ]
    }"#;

    #[test]
    fn extracts_answer_text_and_session() {
        let response: RetrieveAndGenerateResponse =
            serde_json::from_str(RESPONSE).expect("parse");
        assert_eq!(response.output.text, "Traveling is a violation.");
        assert_eq!(response.session_id.as_deref(), Some("session-42"));
    }

    #[test]
    fn flattens_references_across_citation_groups() {
        let response: RetrieveAndGenerateResponse =
            serde_json::from_str(RESPONSE).expect("parse");
        let references = response.references();

        assert_eq!(references.len(), 2);
        assert_eq!(references[0].locator, "s3://corpus/rulebook.pdf");
        assert_eq!(references[0].score, Some(0.91));
        assert_eq!(references[1].locator, "https://example.com/rules");
        assert_eq!(references[1].score, None);
    }

    #[test]
    fn metadata_values_flatten_to_strings() {
        let response: RetrieveAndGenerateResponse =
            serde_json::from_str(RESPONSE).expect("parse");
        let references = response.references();

        assert_eq!(references[0].metadata.get("rule").map(String::as_str), Some("10"));
        assert_eq!(references[0].metadata.get("page").map(String::as_str), Some("42"));
    }

    #[test]
    fn tolerates_missing_content_and_location() {
        let raw = r#"{
            "output": { "text": "answer" },
            "citations": [ { "retrievedReferences": [ {} ] } ]
        }"#;
        let response: RetrieveAndGenerateResponse = serde_json::from_str(raw).expect("parse");
        let references = response.references();

        assert_eq!(references.len(), 1);
        assert_eq!(references[0].text, "");
        assert_eq!(references[0].locator, "");
    }

    #[test]
    fn tolerates_a_response_without_citations() {
        let raw = r#"{ "output": { "text": "answer" } }"#;
        let response: RetrieveAndGenerateResponse = serde_json::from_str(raw).expect("parse");
        assert!(response.references().is_empty());
        assert_eq!(response.session_id, None);
    }
}

mod error_classification {
    use super::*;

    #[test]
    fn access_denied_maps_to_access_denied() {
        let error = classify_error(
            StatusCode::FORBIDDEN,
            Some("AccessDeniedException"),
            r#"{"message":"not allowed"}"#,
        );
        assert!(matches!(error, KbError::AccessDenied(message) if message == "not allowed"));
    }

    #[test]
    fn resource_not_found_maps_to_not_found() {
        let error = classify_error(
            StatusCode::NOT_FOUND,
            Some("ResourceNotFoundException"),
            r#"{"message":"no such knowledge base"}"#,
        );
        assert!(matches!(error, KbError::NotFound(_)));
    }

    #[test]
    fn session_validation_failure_is_stale_session() {
        let error = classify_error(
            StatusCode::BAD_REQUEST,
            Some("ValidationException"),
            r#"{"message":"Session with Id session-42 is not valid. Please check and try again."}"#,
        );
        assert!(matches!(error, KbError::StaleSession));
    }

    #[test]
    fn other_validation_failures_stay_api_errors() {
        let error = classify_error(
            StatusCode::BAD_REQUEST,
            Some("ValidationException"),
            r#"{"message":"1 validation error detected: text too long"}"#,
        );
        assert!(matches!(error, KbError::Api { code, .. } if code == "ValidationException"));
    }

    #[test]
    fn throttling_maps_to_throttled() {
        let error = classify_error(
            StatusCode::TOO_MANY_REQUESTS,
            Some("ThrottlingException"),
            r#"{"message":"slow down"}"#,
        );
        assert!(matches!(error, KbError::Throttled(_)));
    }

    #[test]
    fn namespaced_error_types_are_normalized() {
        let error = classify_error(
            StatusCode::BAD_REQUEST,
            Some("com.amazonaws.bedrock#ValidationException:http://internal"),
            r#"{"message":"session expired for this conversation"}"#,
        );
        assert!(matches!(error, KbError::StaleSession));
    }

    #[test]
    fn missing_error_type_falls_back_to_status_code() {
        let error = classify_error(StatusCode::BAD_GATEWAY, None, "upstream broke");
        assert!(
            matches!(error, KbError::Api { code, message } if code == "HTTP 502" && message == "upstream broke")
        );
    }

    #[test]
    fn non_json_bodies_become_the_message_verbatim() {
        let error = classify_error(
            StatusCode::FORBIDDEN,
            Some("AccessDeniedException"),
            "plain text denial\n",
        );
        assert!(matches!(error, KbError::AccessDenied(message) if message == "plain text denial"));
    }

    #[test]
    fn kinds_summarize_the_taxonomy() {
        assert_eq!(KbError::StaleSession.kind(), "stale session");
        assert_eq!(KbError::AccessDenied("x".into()).kind(), "access denied");
        assert_eq!(
            KbError::Api {
                code: "HTTP 500".into(),
                message: "oops".into(),
            }
            .kind(),
            "service error"
        );
    }
}

mod retries {
    use std::sync::{Arc, Mutex};

    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use courtside::config::AwsConfig;
    use courtside::kb::{KbClient, KbError};

    /// Shared record of every request body the stub service received.
    #[derive(Clone, Default)]
    struct Recorder {
        requests: Arc<Mutex<Vec<Value>>>,
    }

    impl Recorder {
        fn record(&self, body: Value) {
            self.requests.lock().expect("lock").push(body);
        }

        fn received(&self) -> Vec<Value> {
            self.requests.lock().expect("lock").clone()
        }
    }

    fn stale_session() -> axum::response::Response {
        (
            axum::http::StatusCode::BAD_REQUEST,
            [("x-amzn-errortype", "ValidationException")],
            Json(json!({ "message": "Session with Id s-1 is not valid" })),
        )
            .into_response()
    }

    fn throttled() -> axum::response::Response {
        (
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            [("x-amzn-errortype", "ThrottlingException")],
            Json(json!({ "message": "slow down" })),
        )
            .into_response()
    }

    fn answer() -> axum::response::Response {
        Json(json!({ "output": { "text": "fresh answer" }, "sessionId": "s-2" })).into_response()
    }

    fn app(recorder: Recorder, respond: fn(&Value) -> axum::response::Response) -> Router {
        Router::new().route(
            "/retrieveAndGenerate",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    let response = respond(&body);
                    recorder.record(body);
                    response
                }
            }),
        )
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{}", addr)
    }

    fn client(endpoint: &str) -> KbClient {
        KbClient::with_endpoint(
            AwsConfig {
                access_key_id: "AKIDEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                region: "us-east-1".to_string(),
            },
            endpoint,
        )
    }

    #[tokio::test]
    async fn a_stale_session_is_retried_once_without_the_session_id() {
        let recorder = Recorder::default();
        let endpoint = serve(app(recorder.clone(), |body| {
            if body.get("sessionId").is_some() {
                stale_session()
            } else {
                answer()
            }
        }))
        .await;

        let answer = client(&endpoint)
            .ask("q", "kb", "model", Some("s-1"))
            .await
            .expect("answer after retry");

        assert_eq!(answer.text, "fresh answer");
        assert_eq!(answer.session_id.as_deref(), Some("s-2"));

        let requests = recorder.received();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["sessionId"], "s-1");
        assert!(requests[1].get("sessionId").is_none());
    }

    #[tokio::test]
    async fn a_second_stale_failure_is_returned_without_another_retry() {
        let recorder = Recorder::default();
        let endpoint = serve(app(recorder.clone(), |_| stale_session())).await;

        let error = client(&endpoint)
            .ask("q", "kb", "model", Some("s-1"))
            .await
            .expect_err("stale twice");

        assert!(matches!(error, KbError::StaleSession));
        assert_eq!(recorder.received().len(), 2);
    }

    #[tokio::test]
    async fn stale_without_a_session_id_is_not_retried() {
        let recorder = Recorder::default();
        let endpoint = serve(app(recorder.clone(), |_| stale_session())).await;

        let error = client(&endpoint)
            .ask("q", "kb", "model", None)
            .await
            .expect_err("stale");

        assert!(matches!(error, KbError::StaleSession));
        assert_eq!(recorder.received().len(), 1);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let recorder = Recorder::default();
        let endpoint = serve(app(recorder.clone(), |_| throttled())).await;

        let error = client(&endpoint)
            .ask("q", "kb", "model", Some("s-1"))
            .await
            .expect_err("throttled");

        assert!(matches!(error, KbError::Throttled(_)));
        assert_eq!(recorder.received().len(), 1);
    }
}
