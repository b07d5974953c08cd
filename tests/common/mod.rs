//! Shared test fixtures: an in-memory Fusion host and a running add-in.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use fusion_mcp::action::UserParameter;
use fusion_mcp::addin::{AddinServer, FusionHost, HostError};
use fusion_mcp::client::AddinClient;
use fusion_mcp::config::AddinConfig;

/// First bytes of every PNG file.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A host that keeps its design in memory.
///
/// Scripts understand two statements per line: `print("...")`, which
/// appends the quoted text to the output, and `raise <message>`, which fails.
pub struct FakeHost {
    pub parameters: Vec<UserParameter>,
    pub design_open: bool,
    pub viewport: bool,
    pub scripts_run: Vec<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            parameters: vec![
                parameter("width", 20.0, "mm", "20 mm", "Overall width"),
                parameter("height", 40.0, "mm", "width * 2", ""),
            ],
            design_open: true,
            viewport: true,
            scripts_run: Vec::new(),
        }
    }

    fn require_design(&self) -> Result<(), HostError> {
        if self.design_open {
            Ok(())
        } else {
            Err(HostError::NoActiveDesign)
        }
    }
}

impl FusionHost for FakeHost {
    fn execute_script(&mut self, code: &str) -> Result<String, HostError> {
        self.scripts_run.push(code.to_string());

        let mut output = String::new();
        for line in code.lines().map(str::trim) {
            if let Some(message) = line.strip_prefix("raise ") {
                return Err(HostError::Script(message.to_string()));
            }
            if let Some(inner) = line
                .strip_prefix("print(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                output.push_str(inner.trim_matches(|c| c == '"' || c == '\''));
                output.push('\n');
            }
        }
        Ok(output)
    }

    fn save_viewport_image(&mut self, path: &Path) -> Result<bool, HostError> {
        if !self.viewport {
            return Err(HostError::NoActiveViewport);
        }
        let mut image = PNG_SIGNATURE.to_vec();
        image.extend_from_slice(b"fake image data");
        Ok(std::fs::write(path, image).is_ok())
    }

    fn user_parameters(&mut self) -> Result<Vec<UserParameter>, HostError> {
        self.require_design()?;
        Ok(self.parameters.clone())
    }

    fn set_parameter_expression(
        &mut self,
        name: &str,
        expression: &str,
    ) -> Result<UserParameter, HostError> {
        self.require_design()?;

        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| HostError::ParameterNotFound(name.to_string()))?;

        let mut tokens = expression.split_whitespace();
        let value = tokens
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| HostError::Rejected(format!("cannot evaluate '{expression}'")))?;

        param.value = value;
        param.expression = expression.to_string();
        if let Some(unit) = tokens.next() {
            param.unit = unit.to_string();
        }

        Ok(param.clone())
    }
}

pub fn parameter(name: &str, value: f64, unit: &str, expression: &str, comment: &str) -> UserParameter {
    UserParameter {
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        expression: expression.to_string(),
        comment: comment.to_string(),
    }
}

/// Starts an add-in on an ephemeral local port.
pub async fn start_addin(host: FakeHost) -> (AddinServer<FakeHost>, SocketAddr) {
    let mut server = AddinServer::with_address("127.0.0.1:0", host);
    let addr = server.start().await.expect("add-in should bind");
    (server, addr)
}

/// Serves `app` on an ephemeral local port in place of a real add-in.
///
/// Used to hand the client replies a well-behaved add-in never sends. The
/// listener lives until the test's runtime shuts down.
pub async fn start_stub(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub should bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Builds a client for an add-in listening at `addr`.
pub fn client_for(addr: SocketAddr) -> AddinClient {
    AddinClient::new(&addin_config(addr)).expect("client should build")
}

pub fn addin_config(addr: SocketAddr) -> AddinConfig {
    AddinConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        ..AddinConfig::default()
    }
}

/// Returns a local port nothing is listening on.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
