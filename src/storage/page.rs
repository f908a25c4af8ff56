//! Page model
//!
//! A page is a title plus a body of raw bytes. The title doubles as the
//! filename stem, so it is validated once at construction and carried as a
//! newtype from then on.

use std::fmt;

/// Alphanumeric page identifier (`[a-zA-Z0-9]+`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Validate `raw` as a page title
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name holding this page's body
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.0)
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Presentation a page is rendered for. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    View,
    Edit,
    CreatePage,
}

impl Route {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::CreatePage => "createPage",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
    pub route: Route,
}

impl Page {
    pub const fn new(title: Title, body: Vec<u8>) -> Self {
        Self {
            title,
            body,
            route: Route::View,
        }
    }

    /// Empty page used as the landing form for a title with no file yet
    pub const fn blank(title: Title) -> Self {
        Self {
            title,
            body: Vec::new(),
            route: Route::CreatePage,
        }
    }

    #[must_use]
    pub const fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    /// Body as text for rendering; invalid UTF-8 is replaced
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
