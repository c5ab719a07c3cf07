//! JSON-RPC 2.0 protocol implementation
//!
//! Defines the envelope types for MCP communication over stdio, the
//! protocol-level error taxonomy, and the dual (structured + text) encoding
//! of tool results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Last-resort frame written when a response cannot be serialized at all
pub const FALLBACK_INTERNAL_ERROR: &str =
    r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#;

/// Distinguish an absent `id` (notification) from an explicit `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (expected "2.0")
    #[serde(default)]
    pub jsonrpc: String,

    /// Method name to invoke
    pub method: String,

    /// Parameters (object for every method this server handles)
    #[serde(default)]
    pub params: Value,

    /// Correlation id; `None` marks a notification
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request ID (echoed from request, `null` when unknown)
    pub id: Option<Value>,

    /// Result (present if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error (present if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error codes used by this server
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// MCP: request arrived before the initialize handshake completed
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Error message
    pub message: String,

    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Parse error (-32700)
    pub fn parse_error() -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error")
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, "Method not found").with_data(Value::from(method))
    }

    /// Invalid params (-32602)
    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, "Invalid params").with_data(Value::from(detail.into()))
    }

    /// Internal error (-32603)
    pub fn internal_error() -> Self {
        Self::new(codes::INTERNAL_ERROR, "Internal error")
    }

    /// Server not initialized (-32002)
    pub fn server_not_initialized() -> Self {
        Self::new(codes::SERVER_NOT_INITIALIZED, "Server not initialized")
    }

    fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// `initialize` params; only the requested version matters here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
}

/// `tools/call` params
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,

    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// One entry of a tool result's `content` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Encoded outcome of a `tools/call`
///
/// Domain failures travel inside a successful envelope with `isError: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub is_error: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,

    pub content: Vec<TextContent>,
}

impl ToolCallResult {
    /// Wrap a successful tool value; the text payload is its compact JSON
    pub fn success(value: Value) -> Self {
        let text = serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
        Self {
            is_error: false,
            structured_content: Some(value),
            content: vec![TextContent::text(text)],
        }
    }

    /// Wrap a tool failure; the text payload is the error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            structured_content: None,
            content: vec![TextContent::text(message)],
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: "tools/list".to_string(),
            params: json!({}),
            id: Some(json!(1)),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"tools/list\""));
    }

    #[test]
    fn test_notification_vs_null_id() {
        let notification: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(notification.is_notification());

        let null_id: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert_eq!(null_id.id, Some(Value::Null));
        assert!(!null_id.is_notification());
    }

    #[test]
    fn test_response_serialization() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"status": "ok"}));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_response() {
        let response = JsonRpcResponse::error(
            Some(json!(1)),
            JsonRpcError::method_not_found("invalid_method"),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("-32601"));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_parse_error_has_null_id() {
        let response = JsonRpcResponse::error(None, JsonRpcError::parse_error());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], json!(-32700));
    }

    #[test]
    fn test_fallback_frame_is_valid_json() {
        let value: Value = serde_json::from_str(FALLBACK_INTERNAL_ERROR).unwrap();
        assert_eq!(value["error"]["code"], json!(codes::INTERNAL_ERROR));
    }

    #[test]
    fn test_tool_result_success_encoding() {
        let result = ToolCallResult::success(json!({"ok": true}));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["isError"], json!(false));
        assert_eq!(value["structuredContent"], json!({"ok": true}));
        assert_eq!(value["content"][0]["type"], json!("text"));
        assert_eq!(value["content"][0]["text"], json!("{\"ok\":true}"));
    }

    #[test]
    fn test_tool_result_failure_encoding() {
        let result = ToolCallResult::failure("taskId is required");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["isError"], json!(true));
        assert!(value.get("structuredContent").is_none());
        assert_eq!(value["content"][0]["text"], json!("taskId is required"));
    }

    #[test]
    fn test_tool_call_params_arguments_optional() {
        let params: ToolCallParams = serde_json::from_value(json!({"name": "list_projects"})).unwrap();
        assert!(params.arguments.is_none());

        let bad = serde_json::from_value::<ToolCallParams>(json!({"name": "x", "arguments": [1]}));
        assert!(bad.is_err());
    }
}
