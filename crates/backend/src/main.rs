#![allow(
    clippy::useless_format,
    clippy::type_complexity,
    clippy::too_many_arguments,
    clippy::derivable_impls
)]

pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    // Число с разделителями триад: 1234567 -> 1.234.567
    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        for (i, ch) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push('.');
            }
            result.push(ch);
        }
        result.chars().rev().collect()
    }

    // Логирование запросов: статус, время, размер ответа
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;

        let size = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .map(format_number)
            .unwrap_or_else(|| "-".to_string());

        let status = response.status().as_u16();
        let elapsed_ms = start.elapsed().as_millis();
        if response.status().is_success() {
            tracing::info!("{} {} {} | {}ms | {} bytes", status, method, uri.path(), elapsed_ms, size);
        } else {
            tracing::warn!("{} {} {} | {}ms | {} bytes", status, method, uri.path(), elapsed_ms, size);
        }

        response
    }

    let config = shared::config::load_config()?;
    tracing::info!(
        "Question API: {} (timeout {}s), key prefix: {}",
        config.question_api.base_url,
        config.question_api.timeout_secs,
        config.import.key_prefix
    );

    let api = usecases::u501_import_questions::HttpQuestionApi::new(&config.question_api)
        .map_err(|e| anyhow::anyhow!("question API client init failed: {e}"))?;
    let executor = usecases::u501_import_questions::ImportExecutor::new(
        Arc::new(api),
        config.import.key_prefix.clone(),
    );
    let state = routes::AppState {
        executor: Arc::new(executor),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let app = routes::configure_routes(state, config.import.max_upload_bytes())
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server address: {e}"))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
