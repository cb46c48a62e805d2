//! `HttpCaller` against an in-process HTTP/1.1 fixture server.

use std::net::SocketAddr;

use anyhow::Result;
use blipburst_injector::{AttemptError, FailureMode, FaultInjector, InjectorOptions, NetworkCaller};
use blipburst_network::{CallerIdentity, HttpCaller};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Routes:
///   /posts/1  -> 200, JSON echoing the path and user agent
///   /garbage  -> 200, body that is not JSON
///   anything else -> 404
async fn start_fixture_server() -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                let user_agent = request
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("user-agent")
                            .then(|| value.trim().to_string())
                    })
                    .unwrap_or_default();

                let (status, body) = match path.as_str() {
                    "/posts/1" => (
                        "200 OK",
                        json!({ "id": 1, "path": path, "user_agent": user_agent }).to_string(),
                    ),
                    "/garbage" => ("200 OK", "<html>not json</html>".to_string()),
                    _ => ("404 Not Found", "{}".to_string()),
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\
                     \r\n\
                     {body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
            });
        }
    });

    Ok((addr, handle))
}

#[tokio::test]
async fn decodes_json_and_sends_user_agent() -> Result<()> {
    let (addr, server) = start_fixture_server().await?;
    let caller = HttpCaller::new(CallerIdentity {
        user_agent: "blipburst-test/1".to_string(),
        timeout_ms: Some(5_000),
    })?;

    let payload = caller.fetch_json(&format!("http://{addr}/posts/1")).await?;
    assert_eq!(payload["id"], 1);
    assert_eq!(payload["path"], "/posts/1");
    assert_eq!(payload["user_agent"], "blipburst-test/1");

    server.abort();
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_an_error() -> Result<()> {
    let (addr, server) = start_fixture_server().await?;
    let caller = HttpCaller::new(CallerIdentity::default())?;

    let err = caller
        .fetch_json(&format!("http://{addr}/missing"))
        .await
        .expect_err("404 should fail");
    assert_eq!(err.status().map(|status| status.as_u16()), Some(404));

    server.abort();
    Ok(())
}

#[tokio::test]
async fn undecodable_body_is_an_error() -> Result<()> {
    let (addr, server) = start_fixture_server().await?;
    let caller = HttpCaller::new(CallerIdentity::default())?;

    let err = caller
        .fetch_json(&format!("http://{addr}/garbage"))
        .await
        .expect_err("html body should not decode");
    assert!(err.is_decode());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn injector_surfaces_transport_errors_unchanged() -> Result<()> {
    let (addr, server) = start_fixture_server().await?;
    let caller = HttpCaller::new(CallerIdentity::default())?;
    let mut injector = FaultInjector::new(
        InjectorOptions::new()
            .frequency(0.0)
            .url(format!("http://{addr}/missing")),
        caller,
    );

    let first = injector.attempt().await.expect_err("burst failure expected");
    assert_eq!(first.simulated().map(|f| f.mode), Some(FailureMode::Burst));

    match injector.attempt().await {
        Err(AttemptError::Transport(err)) => {
            assert_eq!(err.status().map(|status| status.as_u16()), Some(404));
        }
        other => anyhow::bail!("expected transport error, got {other:?}"),
    }

    server.abort();
    Ok(())
}

#[tokio::test]
async fn injector_passes_real_payload_through() -> Result<()> {
    let (addr, server) = start_fixture_server().await?;
    let mut injector = FaultInjector::new(
        InjectorOptions::new()
            .frequency(60.0)
            .total(0)
            .url(format!("http://{addr}/posts/1")),
        HttpCaller::new(CallerIdentity::default())?,
    );

    let payload = injector.attempt().await?;
    assert_eq!(payload["id"], 1);
    assert!(payload["user_agent"]
        .as_str()
        .is_some_and(|agent| agent.starts_with("blipburst/")));

    server.abort();
    Ok(())
}
