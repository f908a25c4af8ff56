//! Wiki error taxonomy
//!
//! Every failure is terminal for the request that hit it; the handler layer
//! maps each variant to a status code.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiError {
    /// Page file missing or unreadable
    #[error("page not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] tera::Error),

    #[error("template '{name}' could not be loaded: {source}")]
    TemplateLoad {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed form body: {0}")]
    Form(String),

    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),
}

impl WikiError {
    /// Status code sent to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Io(_) | Self::Render(_) | Self::TemplateLoad { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
