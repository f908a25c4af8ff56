//! Request handler module
//!
//! Request entry point plus the four wiki page handlers.

pub mod router;
pub mod wiki;

// Re-export main entry point
pub use router::{dispatch, handle_request, RequestContext};
