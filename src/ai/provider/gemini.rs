//! Gemini API Transport
//!
//! Sends one `generateContent` request and validates the reply in a fixed
//! order: HTTP status, empty body, HTML error page, JSON parse, explicit
//! error field, generated-text path.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::{GenerationRequest, GenerationTransport, ProviderConfig};
use crate::ai::timeout::{default_request_timeout, with_timeout};
use crate::constants::provider as provider_constants;
use crate::types::{ErrorClassifier, ReverieError, Result};

/// Longest slice of an error body kept in error messages
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Gemini transport with secure API key handling
pub struct GeminiTransport {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    endpoint: Url,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTransport")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiTransport {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = resolve_api_key(
            config.api_key,
            std::env::var(provider_constants::API_KEY_ENV).ok(),
        )?;
        let endpoint = endpoint_url(&config.host, &config.model)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReverieError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            endpoint,
            model: config.model,
            timeout: default_request_timeout(),
            client,
        })
    }

    /// Override the request deadline (tests use a short one)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_body<'a>(&self, request: &'a GenerationRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.sampling.temperature,
                max_output_tokens: request.sampling.max_output_tokens,
                top_p: request.sampling.top_p,
                top_k: request.sampling.top_k,
            },
        }
    }

    async fn execute(&self, request: &GenerationRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                provider_constants::API_KEY_HEADER,
                self.api_key.expose_secret(),
            )
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        interpret_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<String> {
        info!(
            model = %self.model,
            temperature = request.sampling.temperature,
            max_output_tokens = request.sampling.max_output_tokens,
            "Generating with Gemini"
        );

        let start_time = Instant::now();
        let result = with_timeout(self.timeout, self.execute(request)).await;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => debug!(elapsed_ms, chars = text.len(), "Received Gemini response"),
            Err(err) => warn!(elapsed_ms, category = %err.category(), error = %err, "Gemini request failed"),
        }

        result
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Configured key wins over the environment; a blank key counts as missing
fn resolve_api_key(configured: Option<String>, from_env: Option<String>) -> Result<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_env.filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| {
            ReverieError::Config(format!(
                "Gemini API key not found. Set {} or provider.api_key in config",
                provider_constants::API_KEY_ENV
            ))
        })
}

/// Build `{scheme}://{host}/v1beta/models/{model}:generateContent`
fn endpoint_url(host: &str, model: &str) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };

    let raw = format!("{}/v1beta/models/{}:generateContent", base, model.trim());
    Url::parse(&raw)
        .map_err(|e| ReverieError::Config(format!("Invalid provider endpoint '{}': {}", raw, e)))
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}

/// Validate a provider reply and extract the generated text
fn interpret_response(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(ReverieError::ProviderHttp {
            status,
            body: preview(body.trim()),
            category: ErrorClassifier::classify_http(status, body),
        });
    }

    if body.trim().is_empty() {
        return Err(ReverieError::ProviderEmptyResponse);
    }

    if looks_like_html(body) {
        return Err(ReverieError::provider(
            "Provider returned an HTML page instead of a JSON payload",
        ));
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ReverieError::ProviderParse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(ReverieError::provider(error.describe()));
    }

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
        .ok_or(ReverieError::ProviderUnexpectedFormat)
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl ApiError {
    fn describe(&self) -> String {
        match (&self.status, self.message.is_empty()) {
            (Some(status), true) => status.clone(),
            (Some(status), false) => format!("{} ({})", self.message, status),
            (None, true) => "Unknown provider error".to_string(),
            (None, false) => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RetryPolicy;
    use crate::ai::provider::SamplingParams;
    use crate::types::ErrorCategory;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "test-model";
    const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            prompt: "Write something kind.".to_string(),
            sampling: SamplingParams {
                temperature: 0.7,
                max_output_tokens: 200,
                top_p: 0.95,
                top_k: 40,
            },
        }
    }

    fn transport_for(server: &MockServer) -> GeminiTransport {
        GeminiTransport::new(ProviderConfig {
            host: server.uri(),
            model: MODEL.to_string(),
            api_key: Some("test-key".to_string()),
        })
        .unwrap()
    }

    fn success_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn test_endpoint_defaults_to_https() {
        let url = endpoint_url("generativelanguage.googleapis.com", "gemini-2.0-flash-exp").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn test_endpoint_keeps_explicit_scheme() {
        let url = endpoint_url("http://127.0.0.1:8080/", "m").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let key = resolve_api_key(Some("from-config".into()), Some("from-env".into())).unwrap();
        assert_eq!(key, "from-config");

        let key = resolve_api_key(Some("  ".into()), Some("from-env".into())).unwrap();
        assert_eq!(key, "from-env");

        let err = resolve_api_key(None, None).unwrap_err();
        assert!(matches!(err, ReverieError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let transport = GeminiTransport::new(ProviderConfig {
            api_key: Some("very-secret-key".to_string()),
            ..Default::default()
        })
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("very-secret-key"));
    }

    #[test]
    fn test_interpret_non_2xx_first() {
        let err = interpret_response(503, "<!DOCTYPE html><html></html>").unwrap_err();
        assert!(matches!(err, ReverieError::ProviderHttp { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_interpret_empty_body() {
        let err = interpret_response(200, "  \n ").unwrap_err();
        assert!(matches!(err, ReverieError::ProviderEmptyResponse));
    }

    #[test]
    fn test_interpret_html_before_parse() {
        let err = interpret_response(200, "<!DOCTYPE html><html><body>Oops</body></html>")
            .unwrap_err();
        assert!(matches!(err, ReverieError::Provider { .. }));

        let err = interpret_response(200, "\n<HTML><head></head></HTML>").unwrap_err();
        assert!(matches!(err, ReverieError::Provider { .. }));
    }

    #[test]
    fn test_interpret_invalid_json() {
        let err = interpret_response(200, "{\"candidates\": [").unwrap_err();
        assert!(matches!(err, ReverieError::ProviderParse(_)));
    }

    #[test]
    fn test_interpret_error_field() {
        let body = json!({
            "error": { "code": 429, "message": "Quota exceeded for requests", "status": "RESOURCE_EXHAUSTED" }
        })
        .to_string();
        let err = interpret_response(200, &body).unwrap_err();
        match err {
            ReverieError::Provider { message, category } => {
                assert!(message.contains("Quota exceeded"));
                assert_eq!(category, ErrorCategory::Quota);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_interpret_missing_text_path() {
        let body = json!({ "candidates": [{ "content": { "parts": [] } }] }).to_string();
        let err = interpret_response(200, &body).unwrap_err();
        assert!(matches!(err, ReverieError::ProviderUnexpectedFormat));

        let err = interpret_response(200, "{}").unwrap_err();
        assert!(matches!(err, ReverieError::ProviderUnexpectedFormat));
    }

    #[test]
    fn test_interpret_success() {
        let body = success_body("  Hello there  ").to_string();
        assert_eq!(interpret_response(200, &body).unwrap(), "  Hello there  ");
    }

    #[tokio::test]
    async fn test_send_posts_prompt_and_sampling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "Write something kind." }] }],
                "generationConfig": {
                    "temperature": 0.7,
                    "maxOutputTokens": 200,
                    "topP": 0.95,
                    "topK": 40
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("You are doing well.")))
            .expect(1)
            .mount(&server)
            .await;

        let text = transport_for(&server).send(&sample_request()).await.unwrap();
        assert_eq!(text, "You are doing well.");
    }

    #[tokio::test]
    async fn test_send_html_page_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html><html><body>Error 502</body></html>"),
            )
            .mount(&server)
            .await;

        let err = transport_for(&server).send(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ReverieError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_send_forbidden_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let err = transport_for(&server).send(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ReverieError::ProviderHttp { status: 403, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_quota_429_fails_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": 429,
                    "message": "You exceeded your current quota, please check your plan and billing details.",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let req = sample_request();
        let err = RetryPolicy::new(Duration::from_millis(1), 2)
            .execute(|| transport.send(&req))
            .await
            .unwrap_err();

        assert!(matches!(err, ReverieError::ProviderHttp { status: 429, .. }));
        assert_eq!(err.category(), ErrorCategory::Quota);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_plain_429_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .expect(3)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let req = sample_request();
        let err = RetryPolicy::new(Duration::from_millis(1), 2)
            .execute(|| transport.send(&req))
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Transient);
    }

    #[tokio::test]
    async fn test_send_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body("too late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let transport = transport_for(&server).with_timeout(Duration::from_millis(200));
        let start = Instant::now();
        let err = transport.send(&sample_request()).await.unwrap_err();

        assert!(matches!(err, ReverieError::ProviderTimeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_send_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = GeminiTransport::new(ProviderConfig {
            host: format!("http://127.0.0.1:{}", port),
            model: MODEL.to_string(),
            api_key: Some("test-key".to_string()),
        })
        .unwrap();

        let err = transport.send(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ReverieError::Network(_)));
        assert!(err.is_retryable());
    }
}
