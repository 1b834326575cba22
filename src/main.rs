mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{routes as auth_routes, JwksClient, TokenAuthorizer};
use crate::features::change_events::{ChangeEventDispatcher, ChangeStreamWorker, PgChangeFeed};
use crate::features::equipment::{routes as equipment_routes, EquipmentService, PgEquipmentStore};
use crate::features::file_history::{
    routes as file_history_routes, HistoryRecorder, PgFileHistoryStore,
};
use crate::features::status_counts::{
    routes as status_counts_routes, PgStatusCountStore, StatusCounter,
};
use crate::modules::metrics::{self as app_metrics, MetricsLatencyRecorder};
use crate::modules::storage::S3StorageClient;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Prometheus recorder backing the latency samples
    let metrics_handle = app_metrics::install_prometheus_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;
    app_metrics::spawn_upkeep(metrics_handle.clone(), app_metrics::UPKEEP_INTERVAL);
    tracing::info!("Metrics recorder installed");

    // Initialize auth
    let jwks_client = JwksClient::new(&config.auth.jwks_url, config.auth.jwks_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to create JWKS client: {}", e))?;
    tracing::info!("Token authorizer using key set {}", jwks_client.jwks_url());
    let authorizer = Arc::new(TokenAuthorizer::new(Arc::new(jwks_client)));

    // Initialize attachment storage
    let storage_client = Arc::new(
        S3StorageClient::new(config.storage.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize attachment storage: {}", e))?,
    );
    tracing::info!(
        "Attachment storage initialized for bucket: {}",
        storage_client.bucket_name()
    );

    // Initialize services
    let equipment_service = Arc::new(EquipmentService::new(
        Arc::new(PgEquipmentStore::new(pool.clone())),
        storage_client,
        Arc::new(MetricsLatencyRecorder),
    ));
    let status_counter = Arc::new(StatusCounter::new(Arc::new(PgStatusCountStore::new(
        pool.clone(),
    ))));
    let history_recorder = Arc::new(HistoryRecorder::new(Arc::new(PgFileHistoryStore::new(
        pool.clone(),
    ))));
    tracing::info!("Equipment, status count and file history services initialized");

    // Spawn change stream worker
    let change_stream_worker = ChangeStreamWorker::new(
        Arc::new(PgChangeFeed::new(
            pool.clone(),
            config.change_stream.claim_timeout,
        )),
        ChangeEventDispatcher::new(status_counter.clone()),
        &config.change_stream,
    );
    tokio::spawn(async move {
        change_stream_worker.run().await;
    });
    tracing::info!("Change stream worker spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a bearer token accepted by the authorizer)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(equipment_routes::routes(Arc::clone(&equipment_service)))
        .merge(file_history_routes::routes(
            Arc::clone(&history_recorder),
            Arc::clone(&equipment_service),
        ))
        .merge(status_counts_routes::routes(status_counter))
        .route_layer(axum::middleware::from_fn_with_state(
            authorizer,
            middleware::auth_middleware,
        ));

    // Storage notifications, guarded by a shared token when one is configured
    let webhook_routes = match config.storage.webhook_token.clone() {
        Some(token) => {
            tracing::info!("Storage webhook token check enabled");
            file_history_routes::webhook_routes(history_recorder).route_layer(
                axum::middleware::from_fn_with_state(
                    Arc::new(token),
                    middleware::webhook_token_middleware,
                ),
            )
        }
        None => {
            tracing::warn!("Storage webhook token not configured, accepting all notifications");
            file_history_routes::webhook_routes(history_recorder)
        }
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(webhook_routes)
        .merge(health_route)
        .merge(app_metrics::routes(metrics_handle))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
