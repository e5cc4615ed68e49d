mod config;
mod routes;

use anyhow::Context as _;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use std::net::SocketAddr;
use swatch_score::ScoringPipeline;

pub use config::ServerConfig;
pub use routes::{ApiError, AppState, DebugResponse, ScoreRequest, ScoreResponse};

/// A server that is bound and accepting connections.
pub struct RunningServer {
    pub local_addr: SocketAddr,
    pub task: tokio::task::JoinHandle<()>,
}

/// The full route table: `/healthz`, `/score` and `/debug`, behind CORS and a body cap.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/score", post(routes::score))
        .route("/debug", post(routes::debug))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(routes::cors))
        .with_state(state)
}

/// Binds `cfg.bind_addr` and serves on a spawned task.
pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<RunningServer> {
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    let local_addr = listener.local_addr()?;

    let state = AppState {
        pipeline: ScoringPipeline::new(cfg.pipeline),
    };
    let app = router(state, cfg.max_body_bytes);

    tracing::info!(%local_addr, max_body_bytes = cfg.max_body_bytes, "swatch_score server listening");
    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(error = %err, "server stopped");
        }
    });

    Ok(RunningServer { local_addr, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn local_server(max_body_bytes: usize) -> RunningServer {
        let cfg = ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            max_body_bytes,
            ..ServerConfig::default()
        };
        start_server(cfg).await.expect("bind loopback")
    }

    async fn raw_request(addr: SocketAddr, request: String) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request.as_bytes()).await.expect("write request");
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.expect("read response");
        String::from_utf8_lossy(&response).into_owned()
    }

    fn post_request(path: &str, body: &str) -> String {
        format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn healthz_answers_with_cors_headers() {
        let server = local_server(1024).await;
        let response = raw_request(
            server.local_addr,
            "GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.to_ascii_lowercase().contains("access-control-allow-origin: *"), "{response}");
        server.task.abort();
    }

    #[tokio::test]
    async fn preflight_is_answered_with_no_content() {
        let server = local_server(1024).await;
        let response = raw_request(
            server.local_addr,
            "OPTIONS /score HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 204"), "{response}");
        assert!(
            response
                .to_ascii_lowercase()
                .contains("access-control-allow-methods: get, post, options"),
            "{response}"
        );
        server.task.abort();
    }

    #[tokio::test]
    async fn bad_json_is_a_400() {
        let server = local_server(1024).await;
        let response = raw_request(server.local_addr, post_request("/score", "{oops")).await;
        assert!(response.starts_with("HTTP/1.1 400"), "{response}");
        assert!(response.contains("bad json: "), "{response}");
        server.task.abort();
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let server = local_server(64).await;
        let body = format!("{{\"image_base64\":\"{}\",\"theme_hex\":\"#000000\"}}", "A".repeat(256));
        let response = raw_request(server.local_addr, post_request("/score", &body)).await;
        assert!(response.starts_with("HTTP/1.1 413"), "{response}");
        server.task.abort();
    }
}
