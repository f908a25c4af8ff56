//! Template rendering module
//!
//! `view.html` and `edit.html` are compiled once at startup into an
//! immutable [`Templates`] set. Tera auto-escapes `.html` templates, so page
//! content can't inject markup.

use std::path::Path;
use tera::{Context, Tera};

use crate::error::WikiError;
use crate::storage::Page;

const BUILTIN_VIEW: &str = include_str!("../templates/view.html");
const BUILTIN_EDIT: &str = include_str!("../templates/edit.html");

/// Logical template selected by a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    View,
    Edit,
}

impl TemplateName {
    pub const ALL: [Self; 2] = [Self::View, Self::Edit];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::View => "view.html",
            Self::Edit => "edit.html",
        }
    }
}

/// Compiled, read-only template set
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates compiled into the binary
    pub fn builtin() -> Result<Self, WikiError> {
        Self::from_sources(BUILTIN_VIEW, BUILTIN_EDIT)
    }

    pub fn from_sources(view: &str, edit: &str) -> Result<Self, WikiError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (TemplateName::View.file_name(), view),
            (TemplateName::Edit.file_name(), edit),
        ])?;
        Ok(Self { tera })
    }

    /// Load `view.html` and `edit.html` from `dir`
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, WikiError> {
        let dir = dir.as_ref();
        let mut files = Vec::with_capacity(TemplateName::ALL.len());
        for name in TemplateName::ALL {
            let path = dir.join(name.file_name());
            if let Err(source) = std::fs::metadata(&path) {
                return Err(WikiError::TemplateLoad {
                    name: path.display().to_string(),
                    source,
                });
            }
            files.push((path, Some(name.file_name())));
        }

        let mut tera = Tera::default();
        tera.add_template_files(files)?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: TemplateName, page: &Page) -> Result<String, WikiError> {
        let mut context = Context::new();
        context.insert("title", page.title.as_str());
        context.insert("body", &page.body_text());
        context.insert("route", page.route.as_str());
        Ok(self.tera.render(name.file_name(), &context)?)
    }
}
