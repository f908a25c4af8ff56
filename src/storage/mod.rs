//! Page storage module
//!
//! Page model and the file-backed store that persists it.

mod page;
mod store;

pub use page::{Page, Route, Title};
pub use store::PageStore;
