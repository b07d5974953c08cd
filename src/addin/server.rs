//! HTTP listener that runs inside the host and serves add-in actions.
//!
//! Every action is `POST /<action_name>` with a JSON object body. Responses
//! are always JSON ([`ActionResponse`]), with status 200 on success, 400 for
//! caller mistakes and 500 for host or internal failures.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::action::{Action, ActionResponse};
use crate::addin::{handlers, AddinError, FusionHost};
use crate::config::AddinConfig;

/// Shared state handed to every request.
struct AppState<H> {
    /// The host, locked so requests reach it one at a time.
    host: Arc<Mutex<H>>,
}

impl<H> Clone for AppState<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

/// Builds the add-in router around a shared host.
///
/// Anything other than `POST /<action>` still gets the JSON error envelope.
pub fn router<H: FusionHost>(host: Arc<Mutex<H>>) -> Router {
    Router::new()
        .route("/{action}", post(handle_action::<H>).fallback(unknown_action))
        .fallback(unknown_action)
        .with_state(AppState { host })
}

async fn unknown_action(method: Method, uri: Uri) -> Response {
    let action_name = uri.path().trim_matches('/');
    let e = AddinError::InvalidUserInput(format!("Action '{action_name}' not found."));
    tracing::warn!(method = %method, path = uri.path(), "Unknown add-in route");
    (e.status_code(), Json(ActionResponse::failed(e.to_body()))).into_response()
}

async fn handle_action<H: FusionHost>(
    State(state): State<AppState<H>>,
    Path(action_name): Path<String>,
    body: Bytes,
) -> Response {
    match run_action(&state, &action_name, &body).await {
        Ok(result) => Json(ActionResponse::ok(result)).into_response(),
        Err(e) => {
            tracing::error!(
                action = %action_name,
                error_type = e.error_type(),
                error = %e,
                "Action failed"
            );
            (e.status_code(), Json(ActionResponse::failed(e.to_body()))).into_response()
        }
    }
}

async fn run_action<H: FusionHost>(
    state: &AppState<H>,
    action_name: &str,
    body: &[u8],
) -> Result<Value, AddinError> {
    let params: Value = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(body).map_err(|e| AddinError::BadRequest(e.to_string()))?
    };

    if !params.is_object() {
        return Err(AddinError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }

    let action = Action::from_name(action_name).ok_or_else(|| {
        AddinError::InvalidUserInput(format!("Action '{action_name}' not found."))
    })?;

    tracing::debug!(action = %action, "Dispatching action to host");

    let host = Arc::clone(&state.host);
    tokio::task::spawn_blocking(move || {
        let mut host = host
            .lock()
            .map_err(|_| AddinError::Internal("host lock poisoned".to_string()))?;
        handlers::dispatch(&mut *host, action, params)
    })
    .await
    .map_err(|e| AddinError::Internal(e.to_string()))?
}

/// A listener that is currently serving.
struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// The add-in's HTTP listener.
///
/// Created stopped. [`start`](Self::start) binds and serves in a background
/// task; [`stop`](Self::stop) shuts it down. Both are idempotent. Dropping a
/// running server also shuts the listener down.
pub struct AddinServer<H: FusionHost> {
    /// `host:port` to bind.
    bind_addr: String,
    /// The host shared with the router.
    host: Arc<Mutex<H>>,
    /// Set while serving.
    running: Option<Running>,
}

impl<H: FusionHost> AddinServer<H> {
    /// Creates a stopped listener for the address in `config`.
    #[must_use]
    pub fn new(config: &AddinConfig, host: H) -> Self {
        Self::with_address(format!("{}:{}", config.host, config.port), host)
    }

    /// Creates a stopped listener for an explicit `host:port`.
    #[must_use]
    pub fn with_address(bind_addr: impl Into<String>, host: H) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            host: Arc::new(Mutex::new(host)),
            running: None,
        }
    }

    /// Returns whether the listener is serving.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Returns the bound address while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Returns the shared host.
    #[must_use]
    pub fn host(&self) -> Arc<Mutex<H>> {
        Arc::clone(&self.host)
    }

    /// Binds the listener and starts serving in the background.
    ///
    /// Returns the bound address. Calling this while already running logs
    /// and returns the existing address.
    ///
    /// # Errors
    ///
    /// Returns [`AddinError::Bind`] if the address cannot be bound.
    pub async fn start(&mut self) -> Result<SocketAddr, AddinError> {
        if let Some(running) = &self.running {
            tracing::info!(addr = %running.local_addr, "Add-in listener is already running");
            return Ok(running.local_addr);
        }

        let bind_err = |source| AddinError::Bind {
            addr: self.bind_addr.clone(),
            source,
        };

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let app = router(Arc::clone(&self.host));
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    // Fires on stop() or when the sender is dropped.
                    let _ = shutdown_rx.await;
                })
                .await;

            if let Err(e) = result {
                tracing::error!(error = %e, "Add-in listener stopped with an error");
            }
        });

        tracing::info!(addr = %local_addr, "Add-in listener started");

        self.running = Some(Running {
            local_addr,
            shutdown,
            task,
        });

        Ok(local_addr)
    }

    /// Stops serving and waits for in-flight requests to finish.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            tracing::info!("Add-in listener is not running or already stopped");
            return;
        };

        tracing::info!(addr = %running.local_addr, "Stopping add-in listener...");

        let _ = running.shutdown.send(());
        if let Err(e) = running.task.await {
            tracing::error!(error = %e, "Add-in listener task failed");
        }

        tracing::info!("Add-in listener stopped");
    }
}

/// Creates the listener and starts it if `run_on_startup` is set.
///
/// This is what the add-in's load hook calls when the host starts it.
///
/// # Errors
///
/// Returns [`AddinError::Bind`] if startup was requested and failed.
pub async fn start_if_enabled<H: FusionHost>(
    config: &AddinConfig,
    host: H,
) -> Result<AddinServer<H>, AddinError> {
    let mut server = AddinServer::new(config, host);

    if config.run_on_startup {
        server.start().await?;
    } else {
        tracing::info!("Add-in listener disabled at startup");
    }

    Ok(server)
}
