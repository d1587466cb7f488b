//! Campus Hub Backend Service
//!
//! Main entry point for the Campus Hub backend.
//! This service provides:
//! - gRPC API for events, hackathon groups, flat listings and user profiles
//! - WebSocket change feed so clients know when to refetch

use campus_hub::auth::IdentityVerifier;
use campus_hub::config::AppConfig;
use campus_hub::database::{create_pool, run_migrations};
use campus_hub::error::{AppError, AppResult};
use campus_hub::grpc_service::{proto, CampusGrpcService};
use campus_hub::websocket::{ChangeFeed, WebSocketServer};
use campus_hub::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("campus_hub={},sqlx=warn,tonic=info", config.log_level).into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Campus Hub Backend Starting                     ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("gRPC port: {}", config.grpc_port);
    if let Some(http_port) = config.http_port {
        info!("HTTP/WebSocket port: {}", http_port);
    }
    if config.auth.allow_unsigned {
        warn!("Unsigned identity headers are accepted (development mode)");
    }

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let feed = ChangeFeed::default();
    let app_state = Arc::new(AppState::new(pool, feed.clone()));
    app_state.database.ping().await?;
    info!("✓ Application state initialized with repositories");

    let ws_server = WebSocketServer::new(feed);
    info!("✓ WebSocket change feed initialized");

    let verifier = IdentityVerifier::new(config.auth.clone());
    info!(
        "✓ Identity verifier initialized (domain: {}, admin role: {})",
        config.auth.allowed_email_domain, config.auth.admin_role
    );

    let grpc_service = CampusGrpcService::new(app_state.clone(), verifier);
    info!("✓ gRPC service initialized");

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
        .build()
        .map_err(|e| AppError::Message(format!("Failed to build reflection service: {}", e)))?;

    // =========================================================================
    // START SERVERS
    // =========================================================================

    // Start gRPC server
    let grpc_addr: SocketAddr = format!("0.0.0.0:{}", config.grpc_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gRPC address: {}", e)))?;

    info!("Starting gRPC server on {}...", grpc_addr);

    let grpc_server = Server::builder()
        .add_service(grpc_service.into_server())
        .add_service(reflection_service)
        .serve(grpc_addr);

    let grpc_handle = tokio::spawn(async move {
        if let Err(e) = grpc_server.await {
            error!("gRPC server error: {}", e);
        }
    });

    info!("✓ gRPC server started on {}", grpc_addr);

    // Start WebSocket server (if HTTP port is configured)
    let ws_handle = if let Some(http_port) = config.http_port {
        let ws_addr: SocketAddr = format!("0.0.0.0:{}", http_port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid WebSocket address: {}", e)))?;

        info!("Starting WebSocket server on {}...", ws_addr);

        let listener = TcpListener::bind(ws_addr).await.map_err(|e| {
            AppError::Message(format!("Failed to bind WebSocket server: {}", e))
        })?;

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        info!("New WebSocket connection from {}", addr);
                        let ws = ws_server.clone();
                        tokio::spawn(async move {
                            if let Err(e) = ws.handle_connection(stream).await {
                                error!("WebSocket connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("WebSocket accept error: {}", e);
                    }
                }
            }
        });

        info!("✓ WebSocket server started on {}", ws_addr);
        Some(handle)
    } else {
        warn!("HTTP_PORT not configured - WebSocket server not started");
        None
    };

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Campus Hub Backend Ready!                       ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  gRPC API:     0.0.0.0:{}                              ║", config.grpc_port);
    if let Some(http_port) = config.http_port {
        info!("║  WebSocket:    0.0.0.0:{}                              ║", http_port);
    }
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = grpc_handle => {
            error!("gRPC server exited unexpectedly");
        }
        _ = async {
            if let Some(handle) = ws_handle {
                handle.await.ok();
            } else {
                // Never completes if WebSocket is not running
                futures::future::pending::<()>().await;
            }
        } => {
            error!("WebSocket server exited unexpectedly");
        }
    }

    app_state.database.pool().close().await;
    info!("Campus Hub backend shutdown complete");
    Ok(())
}
