//! Search orchestration
//!
//! Turns raw query-string parameters into a validated [`SearchRequest`],
//! runs admission control before any engine work, resolves node names,
//! dispatches the compiled query and normalizes what comes back.
//!
//! [`SearchRequest`]: crate::query::SearchRequest

pub mod error;
pub mod pagination;
pub mod params;
pub mod result;
pub mod service;

pub use error::SearchError;
pub use params::SearchParams;
pub use result::SearchResult;
pub use service::{PageView, SearchLimits, SearchService};
