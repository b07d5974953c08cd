//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP specification for exposing Autodesk Fusion
//! operations as tools to AI assistants. The server communicates over stdio
//! transport using JSON-RPC 2.0 messages and forwards tool calls to the
//! Fusion add-in.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│ AddinClient  │──HTTP──▶ Fusion add-in
//! │   │   (stdio)   │    │ (lifecycle) │    │  (actions)   │     │
//! │   └─────────────┘    └─────────────┘    └──────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
