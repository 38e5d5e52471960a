//! OpenAI-compatible adapter for category suggestion.
//!
//! Supports OpenAI API, Azure OpenAI, and local Ollama instances.
//! Implements `CategorySuggesterPort` with robust JSON parsing and markdown stripping.

use crate::domain::{Category, DomainError};
use crate::ports::CategorySuggesterPort;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// OpenAI-compatible category suggester.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiSuggester {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiSuggester {
    /// Create a new suggester.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    /// * `timeout` - Whole-request timeout; a hung request must not hold the form forever
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Suggestion(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }

    /// System prompt listing the allowed labels and the JSON reply shape.
    fn system_prompt() -> String {
        let mut categories = String::new();
        for c in Category::ALL {
            categories.push_str("- ");
            categories.push_str(c.as_str());
            categories.push('\n');
        }
        format!(
            "You are an assistant that suggests the best category for an expense based on its description.\n\n\
             The available categories are:\n{}\n\
             Suggest only one category, exactly as written above.\n\
             You MUST respond with valid JSON only, in the form {{\"category\": \"<Category>\"}}.",
            categories
        )
    }

    fn user_prompt(description: &str) -> String {
        format!(
            "Suggest only one category that best fits the following expense description:\nDescription: {}",
            description
        )
    }

    /// Sanitize JSON response from LLM.
    ///
    /// LLMs sometimes wrap JSON in markdown code blocks. This strips them.
    fn sanitize_json(raw_text: &str) -> String {
        let trimmed = raw_text.trim();

        // Handle markdown code blocks: ```json ... ``` or ``` ... ```
        if trimmed.starts_with("```") {
            let without_prefix = if trimmed.starts_with("```json") {
                trimmed.strip_prefix("```json").unwrap_or(trimmed)
            } else {
                trimmed.strip_prefix("```").unwrap_or(trimmed)
            };

            if let Some(end_idx) = without_prefix.rfind("```") {
                return without_prefix[..end_idx].trim().to_string();
            }
            return without_prefix.trim().to_string();
        }

        if let Some(start) = trimmed.find('{') {
            if let Some(end) = trimmed.rfind('}') {
                if start < end {
                    return trimmed[start..=end].to_string();
                }
            }
        }

        trimmed.to_string()
    }

    /// Extract the category from the model's reply. Accepts the JSON object,
    /// or a bare label from models that ignore the response format.
    fn parse_category(raw_content: &str) -> Result<Category, DomainError> {
        let clean_json = Self::sanitize_json(raw_content);
        let label = match serde_json::from_str::<LlmSuggestion>(&clean_json) {
            Ok(parsed) => parsed.category,
            Err(_) => clean_json,
        };
        label.parse::<Category>().map_err(|e| {
            warn!(reply = %raw_content.chars().take(200).collect::<String>(), "unusable category reply");
            DomainError::Suggestion(e.to_string())
        })
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Parsed LLM response (matches our JSON schema).
#[derive(Deserialize)]
struct LlmSuggestion {
    category: String,
}

#[async_trait::async_trait]
impl CategorySuggesterPort for OpenAiSuggester {
    async fn suggest_category(&self, text: &str) -> Result<Category, DomainError> {
        info!(
            model = %self.model,
            text_len = text.len(),
            "requesting category suggestion"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::user_prompt(text),
                },
            ],
            temperature: 0.0,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::Suggestion(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            return Err(DomainError::Suggestion(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Suggestion(format!("Failed to parse API response: {}", e)))?;

        let raw_content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| DomainError::Suggestion("No response choices returned".to_string()))?;

        debug!(raw_len = raw_content.len(), "received AI response");

        Self::parse_category(&raw_content)
    }
}
