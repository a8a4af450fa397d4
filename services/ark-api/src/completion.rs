//! OpenAI-compatible chat completion types.
//!
//! Only the fields the service reads or produces are modelled. Token usage is
//! an approximation: whitespace-separated word counts, not a tokenizer.

use chrono::Utc;
use crds::QueryStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;
use utoipa::ToSchema;

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ChatMessage {
    /// Author role ("system", "user", "assistant", ...)
    pub role: String,
    /// Message content, usually a string. An explicit `null` is kept.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Value>,
}

impl ChatMessage {
    /// Content rendered as plain text.
    ///
    /// Missing content is empty. Any other non-string value is written out
    /// with `", "` and `": "` separators, so its word count matches the
    /// usage figures existing clients were given.
    pub fn content_text(&self) -> String {
        match &self.content {
            None => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => spaced_json(other),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Compact JSON, except for a space after every `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn spaced_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

/// Request body for `POST /openai/v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatCompletionRequest {
    /// Query target as `<type>/<name>`, e.g. `agent/weather`
    pub model: String,
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Streaming is not supported
    #[serde(default)]
    pub stream: bool,
    /// Execution budget as a Kubernetes duration, e.g. `5m`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatCompletion {
    /// Name of the query that produced this completion
    pub id: String,
    /// Always `chat.completion`
    pub object: String,
    /// Unix timestamp (seconds)
    pub created: i64,
    /// Model identifier from the request
    pub model: String,
    /// Exactly one choice
    pub choices: Vec<Choice>,
    /// Approximate token usage
    pub usage: Usage,
    /// Raw query status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub ark: Option<ArkExtension>,
}

/// Vendor extension carried on completions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArkExtension {
    /// Query status at completion time
    pub query_status: QueryStatus,
}

/// One completion choice.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Choice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: AssistantMessage,
    /// Always `stop`
    pub finish_reason: String,
}

/// Message produced by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssistantMessage {
    /// Always `assistant`
    pub role: String,
    /// Generated text
    pub content: String,
}

/// Token usage block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Usage {
    /// Words across all prompt messages
    pub prompt_tokens: u64,
    /// Words in the completion
    pub completion_tokens: u64,
    /// Sum of prompt and completion
    pub total_tokens: u64,
}

impl Usage {
    /// Counts usage for `messages` and the generated `completion`.
    pub fn estimate(messages: &[ChatMessage], completion: &str) -> Self {
        let prompt_text = messages
            .iter()
            .map(ChatMessage::content_text)
            .collect::<Vec<_>>()
            .join(" ");
        let prompt_tokens = word_count(&prompt_text);
        let completion_tokens = word_count(completion);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

impl ChatCompletion {
    /// Builds the completion for a finished query.
    pub fn from_query(
        query_name: &str,
        model: &str,
        content: String,
        messages: &[ChatMessage],
        query_status: QueryStatus,
    ) -> Self {
        let usage = Usage::estimate(messages, &content);
        Self {
            id: query_name.to_string(),
            object: "chat.completion".to_string(),
            created: Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content,
                },
                finish_reason: "stop".to_string(),
            }],
            usage,
            ark: Some(ArkExtension { query_status }),
        }
    }

    /// Text of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
