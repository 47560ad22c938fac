//! End-to-end cache flow: a real listener, raw TCP clients, artifacts on disk.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use fscache::cache::FsCacheMiddleware;
use fscache::http::{Response, StatusCode};
use fscache::middleware::{MiddlewareHandler, from_handler, from_middleware};
use fscache::server::Server;

const PAGE: &str = "<h1>Hi</h1>";

/// Binds a server on an ephemeral port whose handler counts how often it
/// actually renders.
async fn start_server(cache_root: &TempDir, calls: Arc<AtomicUsize>) -> SocketAddr {
    let chain: Vec<MiddlewareHandler> = vec![
        from_middleware(FsCacheMiddleware::new(cache_root.path())),
        from_handler(move |_ctx| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Response::new(StatusCode::Ok)
                    .header("Content-Type", "text/html")
                    .body(PAGE)
            }
        }),
    ];

    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    tokio::spawn(server.run(chain));
    addr
}

/// One-shot GET with `Connection: close`, returning the whole response text.
async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

/// Reads from `stream` until the accumulated response ends with `body`.
async fn read_response_ending_with(stream: &mut TcpStream, body: &str) -> String {
    let mut acc = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before full response");
        acc.extend_from_slice(&chunk[..n]);
        if acc.ends_with(body.as_bytes()) {
            return String::from_utf8(acc).unwrap();
        }
    }
}

#[tokio::test]
async fn cold_then_warm_request_over_tcp() {
    let cache_root = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let addr = start_server(&cache_root, Arc::clone(&calls)).await;

    let first = get(addr, "/blog/post-1").await;
    assert!(first.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(first.contains("Content-Type: text/html\r\n"));
    assert!(first.contains("Connection: close\r\n"));
    assert!(first.ends_with(&format!("\r\n\r\n{PAGE}")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Both artifacts are on disk, byte for byte.
    let body = std::fs::read(cache_root.path().join("fscache/blog_post-1.html")).unwrap();
    assert_eq!(body, PAGE.as_bytes());
    let headers = std::fs::read(cache_root.path().join("fscache/blog_post-1.json")).unwrap();
    assert_eq!(headers, br#"{"Content-Type":["text/html"]}"#);

    let second = get(addr, "/blog/post-1").await;
    assert!(second.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(second.contains("Content-Type: text/html\r\n"));
    assert!(second.ends_with(PAGE));
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "warm request must not re-render"
    );
}

#[tokio::test]
async fn keep_alive_connection_serves_cold_then_warm() {
    let cache_root = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let addr = start_server(&cache_root, Arc::clone(&calls)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();

    for expected_renders in [1, 1] {
        stream
            .write_all(b"GET /articles/42 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let response = read_response_ending_with(&mut stream, PAGE).await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Connection: keep-alive\r\n"));
        assert_eq!(calls.load(Ordering::SeqCst), expected_renders);
    }

    assert!(cache_root.path().join("fscache/articles_42.html").is_file());
}
