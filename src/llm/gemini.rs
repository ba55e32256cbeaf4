//! Gemini API client
//!
//! Calls `generateContent` over a long-lived reqwest::Client.

use super::{FunctionDeclaration, GenerateRequest, LanguageModel, ModelReply};
use crate::error::AssistantError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            return Err(AssistantError::Config(
                "Gemini API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The key travels in a header so it never shows up in a URL
    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelReply> {
        let body = GeminiRequest::from_request(request);

        info!(
            model = %self.model,
            with_function = request.function.is_some(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Gemini API request failed: {}", e);
                AssistantError::LlmError(format!("Gemini API error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response ({}): {}", status, error_text);
            return Err(AssistantError::LlmError(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse Gemini response: {}", e);
            AssistantError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        let reply = first_part_reply(gemini_response)?;
        debug!(?reply, "Gemini reply");
        Ok(reply)
    }
}

/// Pick the first part of the first candidate, preferring a proposed call
fn first_part_reply(response: GeminiResponse) -> Result<ModelReply> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        AssistantError::LlmError(format!("No response from Gemini API ({})", reason))
    })?;

    let part = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .ok_or_else(|| AssistantError::LlmError("Empty response from Gemini".to_string()))?;

    match (part.function_call, part.text) {
        (Some(call), _) => Ok(ModelReply::FunctionCall {
            name: call.name,
            args: call.args,
        }),
        (None, Some(text)) => Ok(ModelReply::Text(text)),
        (None, None) => Err(AssistantError::LlmError(
            "Gemini response part has neither text nor function call".to_string(),
        )),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

impl<'a> GeminiRequest<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let contents = vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(request.contents.clone()),
                function_call: None,
            }],
        }];

        match &request.function {
            Some(declaration) => Self {
                contents,
                tools: vec![Tool {
                    function_declarations: vec![declaration],
                }],
                // AUTO lets the model choose between text and a proposed call
                tool_config: Some(ToolConfig {
                    function_calling_config: FunctionCallingConfig { mode: "AUTO" },
                }),
            },
            None => Self {
                contents,
                tools: Vec::new(),
                tool_config: None,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool<'a> {
    function_declarations: Vec<&'a FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct FunctionCallingConfig {
    mode: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_request_has_no_tools() {
        let request = GenerateRequest::text("What is RSI?");
        let json = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "What is RSI?");
        assert!(json.get("tools").is_none());
        assert!(json.get("toolConfig").is_none());
    }

    #[test]
    fn test_function_request_serialization() {
        let declaration = FunctionDeclaration {
            name: "classify".to_string(),
            description: "desc".to_string(),
            parameters: json!({ "type": "OBJECT" }),
        };
        let request = GenerateRequest::with_function("price of Nike?", declaration);
        let json = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();

        assert_eq!(
            json["tools"][0]["functionDeclarations"][0]["name"],
            "classify"
        );
        assert_eq!(json["toolConfig"]["functionCallingConfig"]["mode"], "AUTO");
    }

    #[test]
    fn test_function_call_reply() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "classify",
                            "args": { "company_symbol": "NKE", "intent": "get_stock_info" }
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        }));

        let reply = first_part_reply(response).unwrap();
        assert_eq!(
            reply,
            ModelReply::FunctionCall {
                name: "classify".to_string(),
                args: json!({ "company_symbol": "NKE", "intent": "get_stock_info" }),
            }
        );
    }

    #[test]
    fn test_text_reply() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello there" }, { "text": "ignored" }] }
            }]
        }));

        assert_eq!(
            first_part_reply(response).unwrap(),
            ModelReply::Text("Hello there".to_string())
        );
    }

    #[test]
    fn test_blocked_prompt_is_error() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        let err = first_part_reply(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_endpoint_has_no_key() {
        let client = GeminiClient::new(
            "SECRET-KEY-123".to_string(),
            "gemini-2.0-flash".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        let client = GeminiClient::new(
            "SECRET-KEY-123".to_string(),
            "gemini-2.0-flash".to_string(),
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url("http://127.0.0.1:9/v1beta/models");

        let err = client.generate_text("hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::LlmError(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GeminiClient::new(String::new(), "m".to_string(), Duration::from_secs(1));
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }
}
