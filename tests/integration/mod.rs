//! Integration tests driving a real listener.
//!
//! Run with: cargo test --test integration

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use hostprobe::api::{create_router, AppState};
use hostprobe::host::{HostInfo, SystemHost};
use hostprobe::server::serve;
use hostprobe::status::validate;

struct TestServer {
    base: String,
    shutdown: CancellationToken,
    handle: JoinHandle<hostprobe::Result<()>>,
}

impl TestServer {
    async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, router, shutdown.clone()));

        Self {
            base,
            shutdown,
            handle,
        }
    }

    async fn system() -> Self {
        Self::start(create_router(AppState::new(Arc::new(SystemHost::new())))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not drain")
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn test_status_route() {
    let server = TestServer::system().await;

    let response = reqwest::get(server.url("/status")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"status": "ok"}));

    server.stop().await;
}

#[tokio::test]
async fn test_root_reports_process_hostname() {
    let server = TestServer::system().await;

    let body: Value = reqwest::get(server.url("/")).await.unwrap().json().await.unwrap();
    assert_eq!(body["host"], SystemHost::new().hostname().unwrap());
    assert!(body["at"].as_str().unwrap().ends_with(" GMT"));

    server.stop().await;
}

#[tokio::test]
async fn test_details_reports_real_host() {
    let server = TestServer::system().await;

    let response = reqwest::get(server.url("/details")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["cpus"].as_u64().unwrap() >= 1);
    assert!(!body["totalmem"].as_str().unwrap().is_empty());
    assert!(body["networkInterfaces"].is_object());

    server.stop().await;
}

#[tokio::test]
async fn test_forced_status_propagates_over_the_wire() {
    let server = TestServer::system().await;

    for code in [200u16, 202, 404, 418, 500, 503] {
        let response = reqwest::get(server.url(&format!("/status/{code}"))).await.unwrap();
        assert_eq!(response.status().as_u16(), code);
    }

    for raw in ["abc", "100", "101"] {
        let response = reqwest::get(server.url(&format!("/status/{raw}"))).await.unwrap();
        assert_eq!(response.status(), 400, "{raw}");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_every_accepted_code_is_sent_verbatim() {
    let server = TestServer::system().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let accepted: Vec<u16> = (1..1000u16)
        .filter(|code| validate(&code.to_string()).is_ok())
        .collect();
    assert!(accepted.contains(&200));
    assert!(accepted.contains(&511));
    assert!(!accepted.iter().any(|code| *code < 200));

    for code in accepted {
        let response = client
            .get(server.url(&format!("/status/{code}")))
            .send()
            .await
            .unwrap_or_else(|e| panic!("{code}: {e}"));
        assert_eq!(response.status().as_u16(), code);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_echo_round_trip() {
    let server = TestServer::system().await;
    let payload = json!({"a": 1, "b": [2, 3]});

    let client = reqwest::Client::new();
    let response = client
        .post(server.url("/echo"))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), payload);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_drains_in_flight_requests() {
    let router = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "done"
        }),
    );
    let server = TestServer::start(router).await;

    let url = server.url("/slow");
    let in_flight = tokio::spawn(async move { reqwest::get(url).await?.text().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let base = server.base.clone();
    server.stop().await;

    assert_eq!(in_flight.await.unwrap().unwrap(), "done");
    assert!(reqwest::get(format!("{base}/slow")).await.is_err());
}
