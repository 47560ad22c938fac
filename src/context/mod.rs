//! Per-request context passed through the middleware pipeline.
//!
//! A [`Context`] owns the parsed [`Request`] plus a type-keyed extension map
//! that middleware can use to hand data to downstream stages (an auth layer
//! inserting the authenticated user, for example). The context is moved
//! through the chain; each stage either consumes it by producing a
//! [`Response`](crate::http::Response) or forwards it to the next stage.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::http::Request;

/// Type-keyed storage for values attached to a request in flight.
///
/// Each type can be stored at most once; inserting a second value of the
/// same type replaces the first.
#[derive(Debug, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Creates an empty extension map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same type if present.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Returns a reference to the value of type `T`, if one was inserted.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Removes and returns the value of type `T`, if one was inserted.
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }
}

/// Everything a middleware or handler needs to service one request.
///
/// # Examples
///
/// ```
/// use fscache::context::Context;
/// use fscache::http::Request;
///
/// let raw = b"GET /blog/post-1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
/// let (request, _) = Request::parse(raw).unwrap();
/// let ctx = Context::new(request);
/// assert_eq!(ctx.request().path(), "/blog/post-1");
/// ```
#[derive(Debug)]
pub struct Context {
    request: Request,
    extensions: Extensions,
}

impl Context {
    /// Wraps a parsed request in a fresh context with no extensions.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            extensions: Extensions::new(),
        }
    }

    /// Returns the request being serviced.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the extension map.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the extension map mutably, for middleware that attaches data.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Deserializes the request body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.request.body())
    }
}
