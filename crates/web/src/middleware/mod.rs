//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//! 4. CSP nonce (per-request nonce in request extensions)
//! 5. Security headers (CSP built with that nonce, isolation headers)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Session refresh (renews expiring access tokens)
//! 8. Rate limiting on signup/login POSTs (governor)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, CurrentSession, RequestKind, RequireSession, SIGNUP_PATH, clear_auth, set_auth,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, refresh_session_middleware};
