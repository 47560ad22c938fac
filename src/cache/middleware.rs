//! Read-through response cache middleware.

use std::path::PathBuf;
use std::pin::Pin;

use tracing::{debug, error};

use crate::context::Context;
use crate::http::{Response, StatusCode};
use crate::middleware::{Middleware, Next};

use super::{CacheError, DiskStore, entry, key};

const BODY_EXT: &str = "html";
const HEADERS_EXT: &str = "json";

/// Caches whole responses on disk and replays them on later requests.
///
/// The first request for a path falls through to the rest of the chain and
/// the resulting response is written to two artifacts under the cache root:
/// `fscache/{stem}.html` holds the raw body bytes and `fscache/{stem}.json`
/// holds the headers (see [`key`](super::key) for how the stem is derived).
/// Every later request for the same path is answered straight from those
/// files without invoking anything downstream. A path counts as cached only
/// when both artifacts exist; headers are written after the body, so a
/// half-persisted entry is treated as a miss and rebuilt.
///
/// Two deliberate simplifications, kept for compatibility with the artifact
/// format:
///
/// - A replayed response is always `200 OK`. The original status is not
///   recorded, so a cached `404` comes back as a `200` with the same body.
/// - Repeated headers are stored as one array and replayed comma-joined:
///   two `X-Foo` values `1` and `2` come back as the single header
///   `X-Foo: 1,2`.
///
/// Entries never expire. Invalidation is deleting the artifact files.
/// Storage faults (unreadable artifacts, failed writes) turn into a `500`;
/// they are never silently treated as misses.
///
/// # Examples
///
/// ```
/// use fscache::cache::FsCacheMiddleware;
/// use fscache::http::{Response, StatusCode};
/// use fscache::middleware::{MiddlewareHandler, from_handler, from_middleware};
///
/// let chain: Vec<MiddlewareHandler> = vec![
///     from_middleware(FsCacheMiddleware::new("./cache")),
///     from_handler(|_ctx| async { Response::new(StatusCode::Ok).body("rendered") }),
/// ];
/// assert_eq!(chain.len(), 2);
/// ```
pub struct FsCacheMiddleware {
    store: DiskStore,
}

impl FsCacheMiddleware {
    /// Creates the middleware with artifacts stored under `cache_root`.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            store: DiskStore::new(cache_root),
        }
    }
}

impl Middleware for FsCacheMiddleware {
    fn handle(&self, ctx: Context, next: Next) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        let store = self.store.clone();
        Box::pin(async move {
            let path = ctx.request().path().to_string();
            let body_key = key::artifact_name(&path, BODY_EXT);
            let header_key = key::artifact_name(&path, HEADERS_EXT);

            if store.exists(&body_key).await && store.exists(&header_key).await {
                return match replay(&store, &body_key, &header_key).await {
                    Ok(response) => {
                        debug!(path = %path, "served from cache");
                        response
                    }
                    Err(err) => {
                        error!(path = %path, error = %err, "failed to replay cache entry");
                        storage_fault()
                    }
                };
            }

            debug!(path = %path, "cache miss");
            let response = next.run(ctx).await;

            if let Err(err) = persist(&store, &body_key, &header_key, &response).await {
                error!(path = %path, error = %err, "failed to persist cache entry");
                return storage_fault();
            }
            response
        })
    }
}

/// Rebuilds a response from the two artifacts of a cached path.
async fn replay(
    store: &DiskStore,
    body_key: &str,
    header_key: &str,
) -> Result<Response, CacheError> {
    let header_bytes = store.get(header_key).await?;
    let headers = entry::decode_headers(&header_bytes)?;
    let body = store.get(body_key).await?;

    let mut response = Response::new(StatusCode::Ok).body(body);
    for (name, value) in headers {
        response.add_header(name, value);
    }
    Ok(response)
}

/// Writes both artifacts for a fresh response, body first.
async fn persist(
    store: &DiskStore,
    body_key: &str,
    header_key: &str,
    response: &Response,
) -> Result<(), CacheError> {
    store.put(body_key, response.body_bytes()).await?;
    let header_bytes = entry::encode_headers(response.headers())?;
    store.put(header_key, &header_bytes).await?;
    Ok(())
}

fn storage_fault() -> Response {
    Response::new(StatusCode::InternalServerError).body("Cache storage failure")
}
