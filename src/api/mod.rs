//! Image-builder and content-sources API access
//!
//! - `models` - serde wire types
//! - `client` - backend traits and the HTTP implementation
//! - `cache` - tag-indexed query cache
//! - `dispatch` - blueprint mutations with invalidation and status tracking

pub mod cache;
pub mod client;
pub mod dispatch;
pub mod models;

pub use cache::{CacheTag, QueryCache};
pub use client::{BlueprintBackend, HttpBackend, RepositoryBackend};
pub use dispatch::{MutationDispatcher, MutationKind, MutationStatus};
