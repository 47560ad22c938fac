//! fscache — a filesystem read-through response cache for an async
//! HTTP/1.1 server.
//!
//! The first request for a path runs the downstream handler and writes the
//! response to disk as two files: the raw body and a JSON map of the
//! headers. Every later request for that path is answered straight from
//! those files — the handler never runs again until the files are deleted.
//!
//! What's inside:
//!
//! - **Cache middleware** — [`cache::FsCacheMiddleware`], the read-through
//!   stage, backed by [`cache::DiskStore`] for atomic artifact writes.
//! - **Middleware pipeline** — [`middleware::Middleware`] and
//!   [`middleware::Next`], an ordered chain where each stage either answers
//!   or delegates.
//! - **HTTP/1.1** — request parsing over `httparse`, a response builder,
//!   persistent connections.
//! - **Server** — [`server::Server`], a Tokio TCP accept loop hosting the
//!   chain.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use fscache::cache::FsCacheMiddleware;
//! use fscache::http::{Response, StatusCode};
//! use fscache::middleware::{LoggerMiddleware, from_handler, from_middleware};
//! use fscache::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chain = vec![
//!         from_middleware(LoggerMiddleware),
//!         from_middleware(FsCacheMiddleware::new("./cache")),
//!         from_handler(|_ctx| async {
//!             Response::new(StatusCode::Ok)
//!                 .header("Content-Type", "text/html")
//!                 .body("<h1>Hi</h1>")
//!         }),
//!     ];
//!
//!     Server::bind("127.0.0.1:8080").await?.run(chain).await?;
//!     Ok(())
//! }
//! ```
//!
//! Caching is by path only: the query string is ignored, `/a/b` and
//! `/a/b/` share an entry, and entries never expire on their own.

pub mod cache;
pub mod context;
pub mod http;
pub mod middleware;
pub mod server;

pub use cache::{CacheError, DiskStore, FsCacheMiddleware};
pub use context::Context;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use middleware::{
    LoggerMiddleware, Middleware, MiddlewareHandler, Next, from_handler, from_middleware,
};
pub use server::{Server, ServerError};
