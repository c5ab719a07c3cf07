//! MCP server with stdio transport
//!
//! Implements a JSON-RPC 2.0 server over newline-delimited frames. One line
//! is read, handled and answered before the next is read. The handshake
//! state lives in a [`Session`] owned by the serve loop.

use super::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams,
    ToolCallResult, FALLBACK_INTERNAL_ERROR,
};
use super::session::Session;
use super::tools::ToolHandler;
use crate::error::Result;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "ramorie";

/// MCP server that handles JSON-RPC requests over stdio
pub struct McpServer {
    tool_handler: ToolHandler,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self { tool_handler }
    }

    /// Run the server on stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        info!("MCP server started, listening on stdin...");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve frames from `reader` until end of stream
    ///
    /// Only I/O failures are returned; every malformed frame is answered or
    /// skipped without stopping the loop.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session = Session::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).await.map_err(|e| {
                error!("Failed to read from stdin: {}", e);
                e
            })?;
            if n == 0 {
                debug!("Received EOF, shutting down");
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    debug!("Received request: {}", line);
                    self.handle_line(&mut session, line).await
                }
                Err(e) => {
                    warn!("Frame is not valid UTF-8: {}", e);
                    Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()))
                }
            };

            if let Some(response) = response {
                let frame = encode(&response);
                debug!("Sending response: {}", frame);
                write_frame(&mut writer, &frame).await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one trimmed, non-blank frame
    ///
    /// Returns `None` when nothing must be written back (notifications and
    /// unrecoverable envelopes).
    pub async fn handle_line(&self, session: &mut Session, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Invalid JSON: {}", e);
                return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                return match value.get("id") {
                    Some(id) => {
                        warn!("Malformed request (id {}): {}", id, e);
                        Some(JsonRpcResponse::error(
                            Some(id.clone()),
                            JsonRpcError::parse_error(),
                        ))
                    }
                    None => {
                        warn!("Skipping malformed message without id: {}", e);
                        None
                    }
                };
            }
        };

        self.handle_request(session, request).await
    }

    /// Route a parsed request according to the session state
    pub async fn handle_request(
        &self,
        session: &mut Session,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(session, &request);
            return None;
        }

        let id = request.id.clone();

        // A missing version is tolerated, a wrong one is not
        if !request.jsonrpc.is_empty() && request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(session, request),
            "ping" => JsonRpcResponse::success(id, json!({})),
            _ if !session.is_ready() => {
                debug!("Rejecting {} before initialization", request.method);
                JsonRpcResponse::error(id, JsonRpcError::server_not_initialized())
            }
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        };

        Some(response)
    }

    fn handle_notification(&self, session: &mut Session, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => session.mark_ready(),
            other => debug!("Ignoring notification: {}", other),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, session: &mut Session, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling initialize");

        let params: InitializeParams = serde_json::from_value(request.params).unwrap_or_default();
        let version = session.negotiate(params.protocol_version.as_deref());

        JsonRpcResponse::success(
            request.id,
            json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling tools/list");

        let tools = self.tool_handler.list_tools();

        JsonRpcResponse::success(request.id, json!({ "tools": tools }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling tools/call");

        let params: ToolCallParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(request.id, JsonRpcError::invalid_params(e.to_string()));
            }
        };

        let arguments = params.arguments.unwrap_or_else(Map::new);
        let outcome = self.tool_handler.execute(&params.name, &arguments).await;
        if let Err(e) = &outcome {
            debug!("Tool {} failed: {}", params.name, e);
        }

        match serde_json::to_value(ToolCallResult::from_result(outcome)) {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                error!("Failed to encode tool result: {}", e);
                JsonRpcResponse::error(request.id, JsonRpcError::internal_error())
            }
        }
    }
}

/// Serialize a response, falling back to a fixed internal-error frame
fn encode(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        FALLBACK_INTERNAL_ERROR.to_string()
    })
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &str) -> Result<()> {
    let result = async {
        writer.write_all(frame.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
    .await;

    result.map_err(|e| {
        error!("Failed to write response: {}", e);
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::config::ConfigStore;
    use crate::mcp::protocol::codes;
    use crate::mcp::session::DEFAULT_PROTOCOL_VERSION;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server(dir: &TempDir) -> McpServer {
        let handler = ToolHandler::new(
            Arc::new(MockBackend::new()),
            ConfigStore::at(dir.path().join("config.json")),
        );
        McpServer::new(handler)
    }

    async fn send(server: &McpServer, session: &mut Session, line: &str) -> Option<Value> {
        server
            .handle_line(session, line)
            .await
            .map(|r| serde_json::to_value(r).unwrap())
    }

    #[test]
    fn test_request_routing() {
        let request = r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(request).unwrap();

        assert_eq!(parsed.jsonrpc, "2.0");
        assert_eq!(parsed.method, "tools/list");
        assert_eq!(parsed.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_initialize_echoes_version_and_stays_uninitialized() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let resp = send(
            &server,
            &mut session,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .await
        .unwrap();

        assert_eq!(resp["result"]["protocolVersion"], json!("2024-11-05"));
        assert_eq!(resp["result"]["serverInfo"]["name"], json!(SERVER_NAME));
        assert_eq!(resp["result"]["capabilities"]["tools"], json!({}));
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn test_initialize_without_version_uses_default() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let resp = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#)
            .await
            .unwrap();
        assert_eq!(resp["result"]["protocolVersion"], json!(DEFAULT_PROTOCOL_VERSION));
    }

    #[tokio::test]
    async fn test_gating_before_and_after_handshake() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let resp = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::SERVER_NOT_INITIALIZED));

        let none = send(
            &server,
            &mut session,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(none.is_none());
        assert!(session.is_ready());

        let resp = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp["result"]["tools"].as_array().unwrap().len(), 28);
    }

    #[tokio::test]
    async fn test_ping_in_any_state() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let before = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#)
            .await
            .unwrap();
        session.mark_ready();
        let after = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":"a","method":"ping"}"#)
            .await
            .unwrap();

        assert_eq!(before, after);
        assert_eq!(before["result"], json!({}));
        assert_eq!(before["id"], json!("a"));
    }

    #[tokio::test]
    async fn test_unknown_method_after_ready() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();
        session.mark_ready();

        let resp = send(&server, &mut session, r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::METHOD_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_parse_errors() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let resp = send(&server, &mut session, "{not json").await.unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::PARSE_ERROR));
        assert_eq!(resp["id"], Value::Null);

        // Valid JSON, not a request, id recoverable
        let resp = send(&server, &mut session, r#"{"id":7,"method":42}"#)
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::PARSE_ERROR));
        assert_eq!(resp["id"], json!(7));

        // Nothing to correlate with
        assert!(send(&server, &mut session, "[1,2,3]").await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version_rejected() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();

        let resp = send(&server, &mut session, r#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::INVALID_REQUEST));

        let resp = send(&server, &mut session, r#"{"id":9,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_call_invalid_params() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();
        session.mark_ready();

        let resp = send(
            &server,
            &mut session,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"arguments":{}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(resp["error"]["code"], json!(codes::INVALID_PARAMS));
    }

    #[tokio::test]
    async fn test_tool_failure_is_successful_envelope() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        let mut session = Session::new();
        session.mark_ready();

        let resp = send(
            &server,
            &mut session,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"create_task","arguments":{}}}"#,
        )
        .await
        .unwrap();

        assert!(resp.get("error").is_none());
        assert_eq!(resp["result"]["isError"], json!(true));
        assert!(resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("description is required"));
    }

    #[tokio::test]
    async fn test_serve_skips_blank_lines_and_stops_at_eof() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let input = b"\n   \n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n".to_vec();
        let mut output = Vec::new();
        server.serve(&input[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            serde_json::from_str::<Value>(lines[0]).unwrap()["result"],
            json!({})
        );
    }

    #[tokio::test]
    async fn test_serve_answers_invalid_utf8_with_parse_error() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let input = b"\xff\xfe\n".to_vec();
        let mut output = Vec::new();
        server.serve(&input[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let frame: Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(frame["error"]["code"], json!(codes::PARSE_ERROR));
    }
}
