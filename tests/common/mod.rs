//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use logscope::config::Config;
use logscope::http::{AppState, HttpServer};
use logscope::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A running service bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with `config` on 127.0.0.1 and an OS-assigned port.
#[allow(dead_code)]
pub async fn start_service(mut config: Config) -> TestService {
    config.server.bind_address = "127.0.0.1:0".to_string();
    let listener = TcpListener::bind(&config.server.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::from_config(&config);
    let server = HttpServer::new(&config, state.clone());
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestService { addr, state, shutdown }
}

/// HTTP client that never pools or proxies.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
