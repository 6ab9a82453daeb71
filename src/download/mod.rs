//! Post resolution and media relay

pub mod error;
pub mod http;
pub mod relay;
pub mod resolver;
pub mod source;

// Re-exports for convenience
pub use error::{RelayError, ResolveError, StrategyError};
pub use relay::{ProxyPolicy, VideoRelay};
pub use resolver::{InstagramEndpoints, InstagramResolver};
