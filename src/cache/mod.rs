//! Filesystem response cache.
//!
//! Split into small layers so the persistence rules stay independent of the
//! HTTP pipeline:
//!
//! - [`key`] — turns request paths into artifact names.
//! - [`store`] — reads and writes raw bytes under the cache root.
//! - `entry` — encodes and decodes the header artifact (crate-internal).
//! - [`middleware`] — the pipeline stage tying them together.
//!
//! Only the middleware layer knows about [`Context`](crate::context::Context)
//! and [`Response`](crate::http::Response); everything below it works in
//! plain strings and bytes and can be exercised without a server.

use thiserror::Error;

pub mod key;
pub mod middleware;
pub mod store;

pub(crate) mod entry;

pub use middleware::FsCacheMiddleware;
pub use store::DiskStore;

/// Failures while reading or writing cache artifacts.
///
/// The middleware logs these and answers `500`; they never escape into the
/// pipeline, which deals only in responses.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The byte store could not be read or written.
    #[error("cache store I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The header artifact exists but does not parse as `name -> [values]`.
    #[error("invalid header artifact: {0}")]
    Headers(#[from] serde_json::Error),
}
