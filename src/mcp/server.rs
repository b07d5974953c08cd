//! MCP server implementation for Autodesk Fusion.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Graceful connection termination
//!
//! # Architecture
//!
//! The server does no CAD work itself. Each tool call is validated here and
//! then forwarded to the Fusion add-in through an [`AddinClient`]; add-in
//! failures come back to the client as tool results with `isError` set.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::client::{AddinClient, ClientError};
use crate::config::ScreenshotConfig;
use crate::mcp::protocol::{
    ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_INSTRUCTIONS,
    SERVER_NAME,
};
use crate::mcp::transport::{StdinReader, Transport};

/// Longest script accepted by `execute_code`, in characters.
pub const MAX_CODE_CHARS: usize = 20_000;

/// Longest description accepted by `execute_code`, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1_000;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Base64-encoded image content.
    Image {
        /// The encoded image bytes.
        data: String,
        /// MIME type of the image, e.g. `image/png`.
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates a successful result holding pretty-printed JSON.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::text(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
    }

    /// Creates a successful image result.
    #[must_use]
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Image {
                data: data.into(),
                mime_type: mime_type.into(),
            }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Creates an error result for arguments rejected before reaching the
    /// add-in, typed the same way the add-in types its own input errors.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::error(format!("InvalidUserInput: {}", message.into()))
    }

    /// Creates an error result from an add-in failure.
    #[must_use]
    pub fn addin_error(error: &ClientError) -> Self {
        Self::error(error.describe())
    }
}

/// The MCP server for Autodesk Fusion.
///
/// Generic over its transport so it can be driven over stdio (the default)
/// or any in-memory pipe.
pub struct McpServer<R = StdinReader, W = tokio::io::Stdout> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: Transport<R, W>,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Connection to the Fusion add-in.
    client: AddinClient,
    /// Where screenshots are written and whether they are kept.
    screenshots: ScreenshotConfig,
}

impl McpServer {
    /// Creates a server on stdio that forwards tool calls through `client`.
    #[must_use]
    pub fn new(client: AddinClient, screenshots: ScreenshotConfig) -> Self {
        Self::with_transport(Transport::stdio(), client, screenshots)
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server on an explicit transport.
    #[must_use]
    pub const fn with_transport(
        transport: Transport<R, W>,
        client: AddinClient,
        screenshots: ScreenshotConfig,
    ) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport,
            protocol_version: None,
            client,
            screenshots,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Client closed the connection");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        use crate::mcp::protocol::parse_message;

        match parse_message(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected malformed message");
                self.transport.write_error(&error).await
            }
        }
    }

    /// Handles a parsed incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> std::io::Result<()> {
        match msg {
            IncomingMessage::Request(req) => self.handle_request(req).await,
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                Ok(())
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> std::io::Result<()> {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.transport.write_response(&resp).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            tracing::info!("Client initialised, server running");
            self.state = ServerState::Running;
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
            "instructions": SERVER_INSTRUCTIONS,
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let result = self.call_tool(&params.name, &params.arguments).await;

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }

    /// Dispatches a tool call by name.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> ToolCallResult {
        tracing::info!(tool = name, "Tool call");

        let result = match name {
            "execute_code" => self.call_execute_code(arguments).await,
            "get_viewport_screenshot" => self.call_get_viewport_screenshot().await,
            "list_user_parameters" => self.call_list_user_parameters().await,
            "set_user_parameter" => self.call_set_user_parameter(arguments).await,
            _ => ToolCallResult::error(format!("Unknown tool: {name}")),
        };

        if result.is_error {
            tracing::warn!(tool = name, "Tool call failed");
        }

        result
    }

    // ==================== Tool Handlers ====================

    /// Runs a script in Fusion and returns its captured output.
    async fn call_execute_code(&self, arguments: &Value) -> ToolCallResult {
        let Some(code) = arguments.get("code").and_then(Value::as_str) else {
            return ToolCallResult::invalid_input("Missing required parameter: code");
        };

        let code_chars = code.chars().count();
        if code_chars == 0 {
            return ToolCallResult::invalid_input("Parameter 'code' cannot be empty");
        }
        if code_chars > MAX_CODE_CHARS {
            return ToolCallResult::invalid_input(format!(
                "Parameter 'code' is too long: {code_chars} characters (maximum {MAX_CODE_CHARS})"
            ));
        }

        match arguments.get("description") {
            None | Some(Value::Null) => {}
            Some(Value::String(description)) => {
                if description.chars().count() > MAX_DESCRIPTION_CHARS {
                    return ToolCallResult::invalid_input(format!(
                        "Parameter 'description' is too long (maximum {MAX_DESCRIPTION_CHARS} characters)"
                    ));
                }
                tracing::info!(description = %description, "Executing code in Fusion");
            }
            Some(_) => {
                return ToolCallResult::invalid_input("Parameter 'description' must be a string");
            }
        }

        match self.client.execute_code(code).await {
            Ok(output) => ToolCallResult::json(&json!({ "result": output })),
            Err(e) => ToolCallResult::addin_error(&e),
        }
    }

    /// Captures the active viewport and returns it as a PNG image.
    async fn call_get_viewport_screenshot(&self) -> ToolCallResult {
        let filepath = self
            .screenshots
            .directory()
            .join(format!("fusion-mcp-{}.png", uuid::Uuid::new_v4()));

        let saved = match self.client.get_viewport_screenshot(&filepath).await {
            Ok(saved) => saved.filepath,
            Err(e) => return ToolCallResult::addin_error(&e),
        };

        // Only the file this server named is read or removed.
        if Path::new(&saved) != filepath {
            tracing::error!(
                requested = %filepath.display(),
                reported = %saved,
                "Add-in reported a different screenshot path"
            );
            return ToolCallResult::error(format!(
                "FusionServerResponseError: Screenshot saved to unexpected path '{saved}' \
                 (expected '{}')",
                filepath.display()
            ));
        }

        let bytes = match tokio::fs::read(&filepath).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(path = %filepath.display(), error = %e, "Failed to read screenshot");
                return ToolCallResult::error(format!(
                    "Failed to read screenshot '{}': {e}",
                    filepath.display()
                ));
            }
        };

        if !self.screenshots.keep_files {
            if let Err(e) = tokio::fs::remove_file(&filepath).await {
                tracing::warn!(path = %filepath.display(), error = %e, "Failed to remove screenshot");
            }
        }

        tracing::debug!(bytes = bytes.len(), "Screenshot captured");

        ToolCallResult::image(BASE64_STANDARD.encode(bytes), "image/png")
    }

    /// Lists the user parameters of the active design.
    async fn call_list_user_parameters(&self) -> ToolCallResult {
        match self.client.list_user_parameters().await {
            Ok(parameters) => ToolCallResult::json(&json!({
                "count": parameters.len(),
                "parameters": parameters,
            })),
            Err(e) => ToolCallResult::addin_error(&e),
        }
    }

    /// Changes a parameter's expression.
    async fn call_set_user_parameter(&self, arguments: &Value) -> ToolCallResult {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return ToolCallResult::invalid_input("Missing required parameter: name");
        };
        let Some(expression) = arguments.get("expression").and_then(Value::as_str) else {
            return ToolCallResult::invalid_input("Missing required parameter: expression");
        };

        if name.is_empty() {
            return ToolCallResult::invalid_input("Parameter 'name' cannot be empty");
        }
        if expression.is_empty() {
            return ToolCallResult::invalid_input("Parameter 'expression' cannot be empty");
        }

        match self.client.set_user_parameter(name, expression).await {
            Ok(parameter) => ToolCallResult::json(&json!({ "parameter": parameter })),
            Err(e) => ToolCallResult::addin_error(&e),
        }
    }
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "execute_code".to_string(),
            description: Some(
                "Execute Python code within the Autodesk Fusion CAD environment. \
                 Provides full access to the Fusion API for 3D modeling, sketching, assemblies, \
                 simulations, and data extraction. Code runs in the active design with \
                 pre-initialised objects: adsk (adsk.core, adsk.fusion, adsk.cam), app, design, \
                 root_comp. Output of print() is captured and returned. Changes apply to the \
                 model immediately; use Fusion's undo to revert them."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Python script to execute in Fusion. Has access to Fusion API objects. Must be syntactically valid Python code. Use print() statements to capture output.",
                        "minLength": 1,
                        "maxLength": MAX_CODE_CHARS
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional description of the code being executed",
                        "maxLength": MAX_DESCRIPTION_CHARS
                    }
                },
                "required": ["code"]
            }),
        },
        ToolDefinition {
            name: "get_viewport_screenshot".to_string(),
            description: Some(
                "Capture the active Fusion viewport at its on-screen size and return it as a \
                 PNG image. Use it to check the result of modelling operations."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "list_user_parameters".to_string(),
            description: Some(
                "List the user parameters of the active Fusion design with their name, value, \
                 unit, expression and comment."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "set_user_parameter".to_string(),
            description: Some(
                "Set the expression of a parameter in the active Fusion design. Works for user \
                 and model parameters. Returns the parameter as it reads after the change."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the parameter, e.g. 'width'"
                    },
                    "expression": {
                        "type": "string",
                        "description": "New expression, e.g. '10 cm' or 'height * 2'"
                    }
                },
                "required": ["name", "expression"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AddinConfig;

    fn offline_server() -> McpServer<&'static [u8], Vec<u8>> {
        let client = AddinClient::new(&AddinConfig::default()).unwrap();
        McpServer::with_transport(
            Transport::new(&b""[..], Vec::new()),
            client,
            ScreenshotConfig::default(),
        )
    }

    #[test]
    fn server_initial_state() {
        let server = offline_server();
        assert_eq!(server.state(), ServerState::AwaitingInit);
        assert_eq!(server.protocol_version(), None);
    }

    #[test]
    fn tool_definitions_valid() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "execute_code",
                "get_viewport_screenshot",
                "list_user_parameters",
                "set_user_parameter"
            ]
        );

        for tool in &tools {
            assert!(tool.description.is_some());
            assert!(tool.input_schema.is_object());
        }
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        assert!(!result.is_error);
        assert_eq!(
            result.content,
            vec![ToolContent::Text {
                text: "Hello, world!".to_string()
            }]
        );
    }

    #[test]
    fn tool_call_result_error() {
        let result = ToolCallResult::error("Something went wrong");
        assert!(result.is_error);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn image_content_serialisation() {
        let result = ToolCallResult::image("aGk=", "image/png");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({"content": [{"type": "image", "data": "aGk=", "mimeType": "image/png"}]})
        );
    }

    #[test]
    fn unknown_tool() {
        let server = offline_server();
        let result = tokio_test::block_on(server.call_tool("delete_design", &json!({})));
        assert!(result.is_error);
        assert_eq!(
            result.content,
            vec![ToolContent::Text {
                text: "Unknown tool: delete_design".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn execute_code_argument_checks() {
        let server = offline_server();

        let missing = server.call_tool("execute_code", &json!({})).await;
        assert!(missing.is_error);
        assert_eq!(
            missing.content,
            vec![ToolContent::Text {
                text: "InvalidUserInput: Missing required parameter: code".to_string()
            }]
        );

        let empty = server.call_tool("execute_code", &json!({"code": ""})).await;
        assert!(empty.is_error);
        assert_eq!(
            empty.content,
            vec![ToolContent::Text {
                text: "InvalidUserInput: Parameter 'code' cannot be empty".to_string()
            }]
        );

        let long = "x".repeat(MAX_CODE_CHARS + 1);
        let too_long = server.call_tool("execute_code", &json!({"code": long})).await;
        assert!(too_long.is_error);

        let description = "d".repeat(MAX_DESCRIPTION_CHARS + 1);
        let long_description = server
            .call_tool(
                "execute_code",
                &json!({"code": "print(1)", "description": description}),
            )
            .await;
        assert!(long_description.is_error);

        let bad_description = server
            .call_tool("execute_code", &json!({"code": "print(1)", "description": 5}))
            .await;
        assert!(bad_description.is_error);
    }

    #[tokio::test]
    async fn set_user_parameter_argument_checks() {
        let server = offline_server();

        let no_expression = server
            .call_tool("set_user_parameter", &json!({"name": "width"}))
            .await;
        assert!(no_expression.is_error);

        let empty_name = server
            .call_tool(
                "set_user_parameter",
                &json!({"name": "", "expression": "10 mm"}),
            )
            .await;
        assert!(empty_name.is_error);
        assert_eq!(
            empty_name.content,
            vec![ToolContent::Text {
                text: "InvalidUserInput: Parameter 'name' cannot be empty".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn whitespace_arguments_reach_the_addin() {
        // Same rule as the add-in: only empty strings are rejected locally.
        let server = offline_server();

        let result = server
            .call_tool(
                "set_user_parameter",
                &json!({"name": " ", "expression": " "}),
            )
            .await;
        assert!(result.is_error);
        let ToolContent::Text { text } = &result.content[0] else {
            panic!("Expected text content");
        };
        assert!(!text.starts_with("InvalidUserInput: "), "{text}");
    }
}
