//! fusion-mcp: MCP server and add-in bridge for AI-assisted Autodesk Fusion modelling
//!
//! This library connects an AI assistant to a running Fusion session.
//!
//! # Architecture
//!
//! The bridge has two halves that talk over local HTTP:
//!
//! - **MCP server**: speaks MCP on stdio and exposes `execute_code`,
//!   `get_viewport_screenshot`, `list_user_parameters` and
//!   `set_user_parameter` as tools
//! - **Add-in**: runs inside Fusion, receives action calls and performs
//!   them against the host scripting API
//!
//! The AI (not this tool) writes the modelling scripts and decides what to
//! change; the bridge only carries requests and results.
//!
//! # Modules
//!
//! - [`action`] — Wire vocabulary shared by both halves
//! - [`addin`] — In-host listener and the host API boundary
//! - [`client`] — HTTP client the MCP server uses to reach the add-in
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`mcp`] — MCP protocol implementation

pub mod action;
pub mod addin;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
