//! wikid: a small wiki server storing each page as `<title>.txt`.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod storage;
pub mod template;

pub use error::WikiError;
