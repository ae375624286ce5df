//! Anthropic Claude draft provider.
//!
//! Streams draft text over the Messages SSE protocol. The prompt is
//! built from structured request fields (see [`super::prompts`]);
//! only text deltas are surfaced, everything else in the event stream
//! is protocol framing.

use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::prompts::{build_draft_prompt, SYSTEM_PROMPT};
use super::request::DraftRequest;
use super::traits::{DraftError, DraftProvider, DraftResult, GenerationChunk, GenerationStream};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: usize,
    system: String,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

/// Streaming events we care about; everything else deserializes to
/// `Ignored` and is skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: ContentDelta },

    #[serde(rename = "message_stop")]
    MessageStop,

    #[serde(rename = "error")]
    Error { error: ApiErrorDetail },

    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct ContentDelta {
    #[serde(rename = "type")]
    delta_type: String,
    text: Option<String>,
}

/// Non-streaming error response body.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Draft provider backed by Anthropic's Claude models.
pub struct AnthropicDraftProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

impl AnthropicDraftProvider {
    /// Creates a provider with the default model and sampling settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Overrides the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the output token cap.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers
    }

    fn build_body(&self, request: &DraftRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user",
                content: build_draft_prompt(request),
            }],
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            temperature: self.temperature,
            stream: true,
        }
    }

    async fn handle_error_response(response: reqwest::Response) -> DraftError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            return DraftError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        if let Ok(error) = response.json::<ApiError>().await {
            if status == 401 || error.error.error_type == "authentication_error" {
                return DraftError::Configuration(error.error.message);
            }
            return DraftError::Api {
                status,
                message: error.error.message,
            };
        }

        DraftError::Api {
            status,
            message: format!("HTTP {status}"),
        }
    }
}

#[async_trait]
impl DraftProvider for AnthropicDraftProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn stream_draft(&self, request: &DraftRequest) -> DraftResult<GenerationStream> {
        request.validate()?;

        if self.api_key.is_empty() {
            return Err(DraftError::Configuration("API key is not set".into()));
        }

        let body = self.build_body(request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let stream = response.bytes_stream();
        Ok(Box::pin(SseStream::new(stream)))
    }
}

/// SSE decoder for the Messages streaming protocol. Yields one chunk
/// per text delta and terminates on `message_stop` or connection end.
struct SseStream<S> {
    inner: S,
    buffer: Vec<u8>,
    finished: bool,
}

impl<S> SseStream<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            finished: false,
        }
    }
}

/// Parses one SSE data payload. `None` means the event carries no text.
fn parse_event(data: &str) -> Option<DraftResult<GenerationChunk>> {
    match serde_json::from_str::<StreamEvent>(data) {
        Ok(StreamEvent::ContentBlockDelta { delta }) if delta.delta_type == "text_delta" => {
            Some(Ok(GenerationChunk {
                text: delta.text.unwrap_or_default(),
            }))
        }
        Ok(StreamEvent::Error { error }) => Some(Err(DraftError::Stream(error.message))),
        Ok(_) => None,
        Err(e) => Some(Err(DraftError::InvalidResponse(format!(
            "failed to parse stream event: {e}"
        )))),
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error,
{
    type Item = DraftResult<GenerationChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        loop {
            // Events are blank-line delimited: "event: type\ndata: json".
            // Framing happens on raw bytes; a read boundary may fall
            // inside a multibyte character, so the buffer is only decoded
            // once a complete event is present.
            if let Some(event_end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
                let frame: Vec<u8> = self.buffer.drain(..event_end + 2).collect();
                let event_text = String::from_utf8_lossy(&frame[..event_end]).into_owned();

                let mut event_type = None;
                let mut data = None;
                for line in event_text.lines() {
                    if let Some(value) = line.strip_prefix("event: ") {
                        event_type = Some(value.to_string());
                    } else if let Some(value) = line.strip_prefix("data: ") {
                        data = Some(value.to_string());
                    }
                }

                if event_type.as_deref() == Some("message_stop") {
                    self.finished = true;
                    return Poll::Ready(None);
                }

                if let Some(data) = data {
                    if let Some(result) = parse_event(&data) {
                        return Poll::Ready(Some(result));
                    }
                }
                continue;
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(DraftError::Stream(e.to_string()))));
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Priority};
    use crate::providers::ai::Tone;
    use futures::StreamExt;

    fn request() -> DraftRequest {
        DraftRequest {
            sender_name: Some("Alice".into()),
            sender_email: "alice@example.com".into(),
            subject: "Invoice".into(),
            snippet: Some("Payment due Friday".into()),
            category: Category::Billing,
            priority: Priority::High,
            user_name: None,
            tone: Tone::default(),
        }
    }

    #[test]
    fn request_body_streams_with_system_prompt() {
        let provider = AnthropicDraftProvider::new("test-key");
        let body = provider.build_body(&request());
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains("claude-3-5-sonnet"));
        assert!(json.contains("\"stream\":true"));
        assert!(json.contains("expert email assistant"));
        assert!(json.contains("alice@example.com"));
        assert_eq!(body.max_tokens, 500);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
    }

    #[test]
    fn builders_override_defaults() {
        let provider = AnthropicDraftProvider::new("key")
            .with_model("claude-3-5-haiku-20241022")
            .with_max_tokens(800)
            .with_temperature(0.2);
        assert_eq!(provider.model, "claude-3-5-haiku-20241022");
        assert_eq!(provider.max_tokens, 800);
        assert_eq!(provider.temperature, 0.2);
    }

    #[tokio::test]
    async fn empty_api_key_is_a_configuration_error() {
        let provider = AnthropicDraftProvider::new("");
        let err = provider.stream_draft(&request()).await.err().unwrap();
        assert!(matches!(err, DraftError::Configuration(_)));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_wire() {
        let provider = AnthropicDraftProvider::new("key");
        let mut req = request();
        req.sender_email = "not-an-email".into();
        let err = provider.stream_draft(&req).await.err().unwrap();
        assert!(matches!(err, DraftError::Validation { .. }));
    }

    #[test]
    fn text_delta_events_yield_chunks() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#;
        let chunk = parse_event(data).unwrap().unwrap();
        assert_eq!(chunk.text, "Hello");
    }

    #[test]
    fn framing_events_are_skipped() {
        for data in [
            r#"{"type":"ping"}"#,
            r#"{"type":"message_start","message":{}}"#,
            r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            r#"{"type":"content_block_stop","index":0}"#,
        ] {
            assert!(parse_event(data).is_none(), "should skip {data}");
        }
    }

    #[test]
    fn error_events_surface_as_stream_errors() {
        let data = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        match parse_event(data).unwrap().unwrap_err() {
            DraftError::Stream(message) => assert_eq!(message, "Overloaded"),
            other => panic!("expected stream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sse_stream_decodes_deltas_and_stops() {
        let frames: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::from(
                "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n\
                 event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi \"}}\n\n",
            )),
            Ok(bytes::Bytes::from(
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Alice\"}}\n\n\
                 event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            )),
        ];
        let mut stream = SseStream::new(futures::stream::iter(frames));

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.unwrap().text);
        }
        assert_eq!(text, "Hi Alice");
    }

    #[tokio::test]
    async fn sse_stream_handles_split_frames() {
        // An event split across two network reads must reassemble.
        let frames: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::from(
                "event: content_block_delta\ndata: {\"type\":\"content_block_del",
            )),
            Ok(bytes::Bytes::from(
                "ta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"joined\"}}\n\n",
            )),
        ];
        let mut stream = SseStream::new(futures::stream::iter(frames));

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.text, "joined");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn sse_stream_survives_a_read_boundary_inside_a_character() {
        // "é" is 0xC3 0xA9; split the event between the two bytes.
        let event =
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"caf\u{e9} demain\"}}\n\n"
                .as_bytes()
                .to_vec();
        let split = event
            .iter()
            .position(|b| *b == 0xC3)
            .expect("multibyte char in fixture")
            + 1;
        let frames: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::copy_from_slice(&event[..split])),
            Ok(bytes::Bytes::copy_from_slice(&event[split..])),
        ];
        let mut stream = SseStream::new(futures::stream::iter(frames));

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.text, "café demain");
        assert!(stream.next().await.is_none());
    }
}
