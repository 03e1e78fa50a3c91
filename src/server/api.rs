use crate::cli::Args;
use crate::models::api::{ AskPayload, AskRequest, AskResponse, HistoryField };
use crate::relay::Relay;
use super::error::ApiError;

use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ rejection::JsonRejection, State },
    response::IntoResponse,
    Json,
};
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use serde_json::{ json, Value as JsonValue };
use tower_http::cors::{ Any, CorsLayer };
use uuid::Uuid;
use log::{ info, warn, error };

pub type AskLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct AppState {
    relay: Relay,
    limiter: Option<Arc<AskLimiter>>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay, limiter: None }
    }

    /// Caps `/api/ask` at `per_second` requests; 0 leaves it unlimited.
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.limiter = NonZeroU32::new(per_second).map(|n| Arc::new(RateLimiter::direct(Quota::per_second(n))));
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    args: &Args,
    relay: Relay
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args
        .server_addr()
        .parse::<SocketAddr>()
        .map_err(|e| format!("Invalid listen address '{}': {}", args.server_addr(), e))?;

    let app = build_router(AppState::new(relay).with_rate_limit(args.rate_limit_per_second));

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            (Some(_), None) | (None, Some(_)) => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("Missing TLS certificate or key path".into());
            }
            (None, None) => {
                error!("--enable-tls was set but no certificate/key paths provided.");
                return Err("TLS enabled without cert/key".into());
            }
        };

        // axum-server pulls in aws-lc-rs as well, so the process default must be chosen explicitly.
        let _ = rustls::crypto::ring::default_provider().install_default();

        info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        info!("Relay listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).handle(handle).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener
            ::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;

        info!("Relay listening on http://{}", addr);
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    }

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn ask_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>
) -> Result<Json<AskResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            return Err(ApiError::RateLimited);
        }
    }

    let payload = match body {
        Ok(Json(body)) => AskPayload::from_value(body),
        // A body that was not sent as JSON carries no question.
        Err(JsonRejection::MissingJsonContentType(_)) => AskPayload::default(),
        Err(rejection) => {
            return Err(ApiError::InvalidBody(rejection.body_text()));
        }
    };

    let question = payload.question().ok_or(ApiError::MissingQuestion)?.to_string();
    let history = match payload.history() {
        HistoryField::Absent => None,
        HistoryField::Valid(turns) => Some(turns),
        HistoryField::Invalid(reason) => {
            warn!("[{}] Ignoring invalid history ({}), asking without context", request_id, reason);
            None
        }
    };

    info!(
        "[{}] Question received: {} chars, history={}",
        request_id,
        question.chars().count(),
        history.as_ref().map_or_else(|| "none".to_string(), |h| h.len().to_string())
    );

    let request = AskRequest { question, history };
    let answer = state.relay.answer(&request).await.map_err(|e| {
        error!("[{}] Generation failed ({}): {}", request_id, e.kind(), e);
        ApiError::from(e)
    })?;

    info!("[{}] Answer ready: {} chars", request_id, answer.chars().count());
    Ok(Json(AskResponse { answer }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "model": state.relay.model() }))
}
