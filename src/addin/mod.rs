//! The Fusion side of the bridge.
//!
//! The add-in runs inside the host application. It listens for action calls
//! from the MCP server over local HTTP and performs them through a
//! [`FusionHost`], which wraps the host's own scripting API.
//!
//! ```text
//! McpServer ──POST /<action>──▶ AddinServer ──▶ handlers ──▶ FusionHost
//! ```
//!
//! A host integration implements [`FusionHost`] and calls
//! [`start_if_enabled`] from its load hook and [`AddinServer::stop`] from its
//! unload hook.

mod error;
pub mod handlers;
mod host;
mod server;

pub use error::{AddinError, HostError};
pub use host::FusionHost;
pub use server::{router, start_if_enabled, AddinServer};
