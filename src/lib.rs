//! reelgrab - resolve public Instagram posts, reels and IGTV links into direct video downloads
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, metrics, URL validation, rate limiting and the HTTP service
//! - `download`: the multi-strategy resolution pipeline and the CDN download relay
//! - `cli`: command line interface for the `reelgrab` binary

pub mod cli;
pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use core::error::{AppError, AppResult};
pub use core::types::{PostReference, VideoAsset};
pub use download::{InstagramEndpoints, InstagramResolver, ResolveError};
