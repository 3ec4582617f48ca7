//! Chat-model invocation: one-shot completion and token streaming.
//!
//! The engine only depends on [`ChatModelClient`]; the blocking
//! OpenAI-compatible HTTP client below is the production implementation and
//! tests substitute a mock.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use super::config::ModelConfig;

const CONNECT_TIMEOUT_MS: u64 = 30_000;

/// One model invocation: the resolved config plus the assembled prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub config: ModelConfig,
    pub system_prompt: String,
    pub user_prompt: String,
}

pub trait ChatModelClient {
    type Stream: Iterator<Item = Result<String, ChatClientError>>;

    /// One-shot call returning the full response text.
    fn complete(&self, request: &ChatRequest) -> Result<String, ChatClientError>;

    /// Streaming call returning an order-preserving sequence of text
    /// fragments with no boundary guarantees.
    fn stream(&self, request: &ChatRequest) -> Result<Self::Stream, ChatClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatClientError {
    BuildClient { message: String },
    Http { message: String },
    HttpStatus { code: u16, message: String },
    DecodeResponse { message: String },
    EmptyChoice,
}

impl fmt::Display for ChatClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatClientError::BuildClient { message } => write!(f, "client build failed: {message}"),
            ChatClientError::Http { message } => write!(f, "http request failed: {message}"),
            ChatClientError::HttpStatus { code, message } => {
                write!(f, "http status {code}: {message}")
            }
            ChatClientError::DecodeResponse { message } => {
                write!(f, "decode response failed: {message}")
            }
            ChatClientError::EmptyChoice => write!(f, "empty completion choice"),
        }
    }
}

impl Error for ChatClientError {}

#[derive(Debug, Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatStreamDelta,
}

#[derive(Debug, Deserialize, Default)]
struct ChatStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client speaking the OpenAI-compatible `chat/completions` wire
/// shape, one-shot and streamed.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
}

impl OpenAiChatClient {
    pub fn new() -> Result<Self, ChatClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .build()
            .map_err(|err| ChatClientError::BuildClient {
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }

    fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::blocking::Response, ChatClientError> {
        let url = format!(
            "{}/chat/completions",
            request.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionPayload {
            model: request.config.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt.as_str(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt.as_str(),
                },
            ],
            temperature: request.config.temperature,
            max_tokens: request.config.max_tokens,
            stream,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&request.config.api_key)
            .json(&payload)
            .send()
            .map_err(|err| ChatClientError::Http {
                message: err.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().unwrap_or_else(|_| "<no body>".to_string());
            return Err(ChatClientError::HttpStatus {
                code: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

impl ChatModelClient for OpenAiChatClient {
    type Stream = ChatFragmentStream<reqwest::blocking::Response>;

    fn complete(&self, request: &ChatRequest) -> Result<String, ChatClientError> {
        let response: ChatCompletionResponse = self.send(request, false)?.json().map_err(|err| {
            ChatClientError::DecodeResponse {
                message: err.to_string(),
            }
        })?;
        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatClientError::EmptyChoice)?;
        Ok(first.message.content)
    }

    fn stream(&self, request: &ChatRequest) -> Result<Self::Stream, ChatClientError> {
        let response = self.send(request, true)?;
        Ok(ChatFragmentStream::new(response))
    }
}

/// What one SSE line contributes to the fragment stream.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SseLine {
    Fragment(String),
    Skip,
    Done,
}

/// `data:`-prefixed JSON chunks carry `choices[0].delta.content`; comment
/// lines, keep-alives and undecodable chunks are skipped rather than fatal.
fn classify_sse_line(line: &str) -> SseLine {
    let Some(data) = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
    else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data.is_empty() {
        return SseLine::Skip;
    }
    if data == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<ChatStreamChunk>(data) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default();
            if content.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Fragment(content)
            }
        }
        Err(_) => SseLine::Skip,
    }
}

/// Text fragments pulled off an open streaming response.
pub struct ChatFragmentStream<R: std::io::Read> {
    lines: Lines<BufReader<R>>,
    done: bool,
}

impl<R: std::io::Read> ChatFragmentStream<R> {
    pub fn new(body: R) -> Self {
        Self {
            lines: BufReader::new(body).lines(),
            done: false,
        }
    }
}

impl<R: std::io::Read> fmt::Debug for ChatFragmentStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatFragmentStream")
            .field("done", &self.done)
            .finish()
    }
}

impl<R: std::io::Read> Iterator for ChatFragmentStream<R> {
    type Item = Result<String, ChatClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(ChatClientError::Http {
                        message: err.to_string(),
                    }));
                }
                None => {
                    self.done = true;
                    return None;
                }
            };
            match classify_sse_line(&line) {
                SseLine::Fragment(content) => return Some(Ok(content)),
                SseLine::Skip => continue,
                SseLine::Done => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
