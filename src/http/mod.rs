//! HTTP protocol layer module
//!
//! Response builders and form decoding, decoupled from wiki logic.

pub mod form;
pub mod response;

pub use response::{
    build_404_response, build_405_response, build_413_response, build_html_response,
    build_redirect_response, build_text_response, set_server_header,
};
