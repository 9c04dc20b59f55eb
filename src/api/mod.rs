//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a value with optional TTL/priority/tags
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /has/:key` - Existence peek without touching statistics
//! - `DELETE /del/:key` - Delete a key
//! - `POST /invalidate/tags` - Remove entries sharing any given tag
//! - `POST /invalidate/pattern` - Remove entries whose key matches a regex
//! - `POST /clear` - Clear one backend, or all with `?all=true`
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
