//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (catalog and checkout API)
//! 5. CORS (import API)
//! 6. Rate limiting (governor)

pub mod cors;
pub mod import_auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use cors::import_cors_middleware;
pub use import_auth::{API_KEY_HEADER, ImportApiKey};
pub use rate_limit::{api_rate_limiter, checkout_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
