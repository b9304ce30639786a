//! Collection resource clients for the `/posts` endpoint.

/// HTTP client backed by `reqwest`.
pub mod http;
/// In-memory client for tests and offline demos.
pub mod mock;

pub use http::HttpPostCollection;
pub use mock::MockPostCollection;
