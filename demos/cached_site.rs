//! A small site fronted by the disk cache.
//!
//! The blog page takes 300ms to "render". Request it twice and compare the
//! elapsed times in the log: the second hit skips the handler entirely.
//!
//! ```text
//! cargo run --example cached_site
//! curl -i http://127.0.0.1:8080/blog/post-1
//! curl -i http://127.0.0.1:8080/blog/post-1
//! ```
//!
//! Artifacts land under `./demo-cache/fscache/`. Delete them to re-render.

use std::time::Duration;

use fscache::cache::FsCacheMiddleware;
use fscache::context::Context;
use fscache::http::{Response, StatusCode};
use fscache::middleware::{LoggerMiddleware, from_handler, from_middleware};
use fscache::server::Server;

async fn render(ctx: Context) -> Response {
    match ctx.request().path() {
        "/" => Response::new(StatusCode::Ok)
            .header("Content-Type", "text/html")
            .body("<h1>Home</h1><p>Try <a href=\"/blog/post-1\">the blog</a>.</p>"),
        "/blog/post-1" => {
            // Stand-in for an expensive template render or database query.
            tokio::time::sleep(Duration::from_millis(300)).await;
            Response::new(StatusCode::Ok)
                .header("Content-Type", "text/html")
                .body("<h1>Hi</h1>")
        }
        _ => Response::new(StatusCode::NotFound).body("Not Found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fscache=debug")),
        )
        .init();

    let chain = vec![
        from_middleware(LoggerMiddleware),
        from_middleware(FsCacheMiddleware::new("./demo-cache")),
        from_handler(render),
    ];

    Server::bind("127.0.0.1:8080").await?.run(chain).await?;
    Ok(())
}
