//! Test server wrapper that starts Chorus on a random port

use std::net::SocketAddr;

use chorus_config::Config;
use chorus_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config)?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Base URL of the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Create an original key via the dashboard API, returning its id
    pub async fn create_original_key(&self, name: &str, api_key: &str, endpoint: &str) -> String {
        let response = self
            .client
            .post(self.url("/dashboard/api/original-keys"))
            .header("authorization", "dashboard-access")
            .json(&serde_json::json!({"name": name, "apiKey": api_key, "endpoint": endpoint}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        body["key"]["id"].as_str().unwrap().to_string()
    }

    /// Create a custom key via the dashboard API, returning its
    /// `(id, apiKey)` pair
    pub async fn create_custom_key(&self, name: &str, original_key_id: Option<&str>) -> (String, String) {
        let mut body = serde_json::json!({"name": name});
        if let Some(id) = original_key_id {
            body["originalKeyId"] = serde_json::Value::String(id.to_string());
        }

        let response = self
            .client
            .post(self.url("/dashboard/api/keys"))
            .header("authorization", "dashboard-access")
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        (
            body["key"]["id"].as_str().unwrap().to_string(),
            body["key"]["apiKey"].as_str().unwrap().to_string(),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
