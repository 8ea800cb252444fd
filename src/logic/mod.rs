//! Logic modules: translation between the wizard state and the wire payload.
//!
//! # Modules
//!
//! - `mapper` - wizard state to create/update request
//! - `hydrate` - fetched blueprint back to an edit-mode wizard state

pub mod hydrate;
pub mod mapper;

pub use hydrate::map_request_to_state;
pub use mapper::{map_request_from_state, ServerContext};
