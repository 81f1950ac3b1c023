//! Tally Web Server
//!
//! Axum-based REST boundary for the Tally statement ingestion pipeline.
//!
//! The server owns nothing durable: auth tokens are resolved against the
//! hosted platform, parsed records are handed to the storage collaborator,
//! and each upload is one request-scoped computation.
//!
//! Security posture:
//! - Platform token authentication (secure by default, use --no-auth for
//!   local dev)
//! - Restrictive CORS policy
//! - Request body size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use tally_core::store::Store;

mod auth;
mod handlers;

pub use auth::{AuthUser, AuthVerifier, PlatformVerifier};

/// Maximum request body size (1 MiB covers any realistic statement export)
pub const MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Owner id stamped on records when authentication is disabled
pub const LOCAL_DEV_USER: &str = "local-dev";

const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Token verifier; absent only when `require_auth` is off
    pub verifier: Option<Arc<dyn AuthVerifier>>,
    pub config: ServerConfig,
}

/// Authentication middleware - resolves the bearer token through the
/// platform verifier and installs the resulting [`AuthUser`] as a request
/// extension for handlers.
///
/// With `require_auth` off (local development), every request runs as the
/// fixed [`LOCAL_DEV_USER`].
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        request.extensions_mut().insert(AuthUser {
            id: LOCAL_DEV_USER.to_string(),
        });
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    if let (Some(token), Some(verifier)) = (token, &state.verifier) {
        match verifier.verify(&token).await {
            Ok(Some(user)) => {
                info!(user = %user.id, path = %request.uri().path(), "Authenticated via platform token");
                request.extensions_mut().insert(user);
                return next.run(request).await;
            }
            Ok(None) => {
                warn!(path = %request.uri().path(), "Platform rejected token");
            }
            Err(e) => {
                warn!(error = %e, path = %request.uri().path(), "Token verification failed");
            }
        }
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Create the application router
pub fn create_router(
    store: Arc<dyn Store>,
    verifier: Option<Arc<dyn AuthVerifier>>,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        store,
        verifier,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Statement ingestion
        .route("/process-csv", post(handlers::process_csv));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(
    store: Arc<dyn Store>,
    verifier: Option<Arc<dyn AuthVerifier>>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    let app = create_router(store, verifier, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
