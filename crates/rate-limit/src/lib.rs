//! Rate limiting functionality for Datagate.
//!
//! Admission is decided per client with a sliding window log: the exact
//! timestamps of recently admitted requests are kept, so the limit applies
//! to any rolling window and a client cannot double its effective rate by
//! timing requests across a fixed-window boundary.

#![deny(missing_docs)]

mod error;
mod manager;

pub use error::RateLimitError;
pub use manager::RateLimitManager;
