//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::expenses: expense page, card list, add/edit form, delete,
//!   and the JSON inspection endpoints

pub mod error;
pub mod render;
pub mod routes;

use axum::{
    routing::{delete, get, post},
    Router,
};
use expenseweb_config::Config;
use expenseweb_core::{Session, SourceRef};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;
pub use render::HtmlRenderer;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub source: SourceRef,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, session: Arc<RwLock<Session>>, source: SourceRef) -> Self {
        Self {
            session,
            source,
            config,
        }
    }

    pub fn renderer(&self) -> HtmlRenderer {
        HtmlRenderer::new(&self.config.ui)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::expenses::{
        api_expense_detail, api_expenses, api_reload, api_status, htmx_expense_cancel,
        htmx_expense_delete, htmx_expense_edit_form, htmx_expense_new_form,
        htmx_expense_submit, htmx_expenses_list, page_expenses,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/status", get(api_status))
        .route("/api/expenses", get(api_expenses))
        .route("/api/expenses/:id", get(api_expense_detail))
        .route("/api/reload", post(api_reload))
        // HTMX page routes
        .route("/", get(page_expenses))
        // HTMX partial routes
        .route("/expenses/list", get(htmx_expenses_list))
        .route("/expenses/new", get(htmx_expense_new_form))
        .route("/expenses/cancel", post(htmx_expense_cancel))
        .route("/expenses/submit", post(htmx_expense_submit))
        // record routes sit one level down so no id can shadow a fragment route
        .route("/expenses/item/:id/edit", get(htmx_expense_edit_form))
        .route("/expenses/item/:id", delete(htmx_expense_delete))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        expenseweb_utils::escape_html(title),
        content
    )
}

/// Check if request is from HTMX
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until the process stops.
pub async fn start_server(
    config: Config,
    session: Arc<RwLock<Session>>,
    source: SourceRef,
) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, session, source);

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting expenseweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Expense list)");
    log::info!("  - /expenses/* (HTMX fragments)");
    log::info!("  - /api/* (JSON endpoints)");

    serve_until(listener, router, shutdown_signal()).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

/// Serve `router` until `shutdown` resolves, then drain open connections
pub async fn serve_until<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenseweb_core::fake::FakeSource;

    #[tokio::test]
    async fn test_serve_until_stops_on_shutdown() {
        let config = Config::default();
        let session = Arc::new(RwLock::new(Session::new(&config)));
        let router = create_router(AppState::new(
            config,
            session,
            Arc::new(FakeSource::invalid_base()),
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(listener, router, async move {
            let _ = stopped.await;
        }));
        stop.send(()).unwrap();

        let result = server.await.unwrap();
        assert!(result.is_ok());
    }
}
