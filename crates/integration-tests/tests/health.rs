mod harness;

use harness::config::ConfigBuilder;
use harness::mock_upstream::MockUpstream;
use harness::server::TestServer;

#[tokio::test]
async fn health_endpoints_report_service_identity() {
    let mock = MockUpstream::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&mock.endpoint(), dir.path().to_path_buf()).build();

    let server = TestServer::start(config).await.unwrap();

    // No authentication required on either health route
    for path in ["/health", "/v1/health"] {
        let resp = server.client().get(server.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "chorus");
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn health_endpoints_disabled() {
    let mock = MockUpstream::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new(&mock.endpoint(), dir.path().to_path_buf())
        .without_health()
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}
