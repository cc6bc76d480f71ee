use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api;
use crate::api::routes::state::AppState;
use crate::error::PostlineError;

pub struct WebServer {
    host: String,
    port: u16,
}

impl WebServer {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    pub async fn start(&self, state: AppState) -> Result<(), PostlineError> {
        let app = Self::create_router(state);

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PostlineError::Error(format!("Invalid address: {}", e)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| PostlineError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        println!("postline serving on http://{}", addr);
        log::info!("Server ready to handle requests");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| PostlineError::Error(format!("Server error: {}", e)))?;

        log::info!("Server shutdown complete");
        Ok(())
    }

    fn create_router(state: AppState) -> Router {
        Router::new()
            // Health check
            .route("/health", get(api::app::health_check))
            // App info
            .route("/api/app-info", get(api::app::get_app_info))
            // Post endpoints
            .route("/api/posts", get(api::posts::list_posts))
            .route("/api/posts", post(api::posts::create_post))
            .route("/api/posts/{post_id}", get(api::posts::get_post))
            .route("/api/posts/{post_id}", patch(api::posts::update_post))
            .route("/api/posts/{post_id}", delete(api::posts::delete_post))
            // User endpoints
            .route("/api/users", get(api::users::list_users))
            .route("/api/users", post(api::users::create_user))
            .with_state(state)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, stopping server...");
}
