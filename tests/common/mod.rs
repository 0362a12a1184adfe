//! Shared utilities for the integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use framed_rpc::config::ServerConfig;
use framed_rpc::lifecycle::Shutdown;
use framed_rpc::net::Listener;
use framed_rpc::service::{self, Service};
use framed_rpc::RpcServer;

/// Start a server on an ephemeral port exposing the named built-in service.
pub async fn start_server(service_name: &str) -> (SocketAddr, Shutdown) {
    let service = service::create(service_name).expect("built-in service");
    start_server_with(service, ServerConfig::default()).await
}

/// Start a server on an ephemeral port with an arbitrary service and config.
#[allow(dead_code)]
pub async fn start_server_with(
    service: Arc<dyn Service>,
    mut config: ServerConfig,
) -> (SocketAddr, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = RpcServer::new(config, service);
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    (addr, shutdown)
}
