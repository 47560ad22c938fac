//! Middleware pipeline.
//!
//! A request travels through an ordered chain of middleware. Each stage
//! receives the [`Context`] and a [`Next`] cursor over the remaining chain,
//! and must produce a [`Response`] — either by calling `next.run(ctx)` to
//! delegate downstream, or by short-circuiting with its own response (the
//! cache middleware does exactly that on a hit).
//!
//! # Examples
//!
//! ```
//! use fscache::middleware::{LoggerMiddleware, MiddlewareHandler, from_handler, from_middleware};
//! use fscache::http::{Response, StatusCode};
//!
//! let chain: Vec<MiddlewareHandler> = vec![
//!     from_middleware(LoggerMiddleware),
//!     from_handler(|_ctx| async { Response::new(StatusCode::Ok).body("Hello") }),
//! ];
//! assert_eq!(chain.len(), 2);
//! ```

use std::pin::Pin;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::context::Context;
use crate::http::{Response, StatusCode};

/// A type-erased middleware stage: takes the context and the rest of the
/// chain, returns the response future.
pub type MiddlewareHandler =
    Arc<dyn Fn(Context, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Trait implemented by middleware types.
///
/// Implementors decide whether to delegate to `next` or answer directly.
pub trait Middleware: Send + Sync {
    /// Processes the request, producing a response.
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

/// Cursor over the remaining middleware chain.
///
/// `Next` is consumed by [`run`](Next::run); a middleware can therefore
/// delegate downstream at most once. If the chain is exhausted without any
/// stage producing a response, a `500` is returned.
pub struct Next {
    chain: Vec<MiddlewareHandler>,
    index: usize,
}

impl Next {
    /// Creates a cursor positioned at the start of `chain`.
    pub fn new(chain: Vec<MiddlewareHandler>) -> Self {
        Self { chain, index: 0 }
    }

    /// Invokes the next middleware in the chain.
    pub async fn run(mut self, ctx: Context) -> Response {
        if self.index < self.chain.len() {
            let handler = self.chain[self.index].clone();
            self.index += 1;
            handler(ctx, self).await
        } else {
            Response::new(StatusCode::InternalServerError)
                .body("No response generated by middleware pipeline")
        }
    }
}

/// Adapts a [`Middleware`] implementation into a chain entry.
pub fn from_middleware<M>(middleware: M) -> MiddlewareHandler
where
    M: Middleware + 'static,
{
    let middleware = Arc::new(middleware);
    Arc::new(move |ctx, next| {
        let middleware = Arc::clone(&middleware);
        Box::pin(async move { middleware.handle(ctx, next).await })
    })
}

/// Adapts a terminal async handler into a chain entry.
///
/// The handler never delegates; the rest of the chain (if any) is dropped.
/// Place it last.
pub fn from_handler<H, F>(handler: H) -> MiddlewareHandler
where
    H: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |ctx, _next| Box::pin(handler(ctx)))
}

/// Logs one line per request: method, path, status, elapsed time.
pub struct LoggerMiddleware;

impl Middleware for LoggerMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin(async move {
            let start = Instant::now();
            let method = ctx.request().method().clone();
            let path = ctx.request().path().to_string();

            let response = next.run(ctx).await;

            info!(
                "{} {} - {} ({:?})",
                method,
                path,
                response.status(),
                start.elapsed()
            );
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::http::Request;

    use super::*;

    fn ctx() -> Context {
        let raw = b"GET /demo HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (request, _) = Request::parse(raw).unwrap();
        Context::new(request)
    }

    #[tokio::test]
    async fn exhausted_chain_yields_500() {
        let response = Next::new(Vec::new()).run(ctx()).await;
        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert_eq!(
            response.body_bytes(),
            b"No response generated by middleware pipeline"
        );
    }

    #[tokio::test]
    async fn terminal_handler_produces_response() {
        let chain = vec![from_handler(|_ctx| async {
            Response::new(StatusCode::Ok).body("done")
        })];
        let response = Next::new(chain).run(ctx()).await;
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body_bytes(), b"done");
    }

    #[tokio::test]
    async fn short_circuit_skips_downstream() {
        static DOWNSTREAM: AtomicUsize = AtomicUsize::new(0);

        struct Gate;
        impl Middleware for Gate {
            fn handle(
                &self,
                _ctx: Context,
                _next: Next,
            ) -> Pin<Box<dyn Future<Output = Response> + Send>> {
                Box::pin(async { Response::new(StatusCode::Forbidden).body("no entry") })
            }
        }

        let chain = vec![
            from_middleware(Gate),
            from_handler(|_ctx| async {
                DOWNSTREAM.fetch_add(1, Ordering::SeqCst);
                Response::new(StatusCode::Ok)
            }),
        ];
        let response = Next::new(chain).run(ctx()).await;
        assert_eq!(response.status(), StatusCode::Forbidden);
        assert_eq!(DOWNSTREAM.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        struct Tag(&'static str);
        impl Middleware for Tag {
            fn handle(
                &self,
                ctx: Context,
                next: Next,
            ) -> Pin<Box<dyn Future<Output = Response> + Send>> {
                let tag = self.0;
                Box::pin(async move {
                    let mut response = next.run(ctx).await;
                    response.add_header("X-Seen-By", tag);
                    response
                })
            }
        }

        let chain = vec![
            from_middleware(Tag("outer")),
            from_middleware(Tag("inner")),
            from_handler(|_ctx| async { Response::new(StatusCode::Ok) }),
        ];
        let response = Next::new(chain).run(ctx()).await;
        // Headers are appended on the way back out, innermost first.
        let seen: Vec<_> = response.headers().get_all("x-seen-by").collect();
        assert_eq!(seen, vec!["inner", "outer"]);
    }

    #[tokio::test]
    async fn logger_passes_response_through() {
        let chain = vec![
            from_middleware(LoggerMiddleware),
            from_handler(|_ctx| async { Response::new(StatusCode::Created).body("made") }),
        ];
        let response = Next::new(chain).run(ctx()).await;
        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(response.body_bytes(), b"made");
    }
}
