//! Utility modules: timeout, rate limiting, logging.

pub mod logging;
pub mod rate_limit;
pub mod timeout;

pub use rate_limit::RateLimiter;
pub use timeout::with_timeout;
