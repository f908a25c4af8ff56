//! Wiki page handlers
//!
//! view, edit, save and createNewPage. Each one is a single linear pass:
//! load or store one page, then render or redirect.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::error::WikiError;
use crate::handler::router::RequestContext;
use crate::http::{self, form};
use crate::logger;
use crate::routing::RouteKind;
use crate::storage::{Page, Route, Title};
use crate::template::TemplateName;

/// Show a page, or send the client to the create flow if it doesn't exist
pub async fn view(state: &AppState, title: Title, is_head: bool) -> Response<Full<Bytes>> {
    load_and_render(state, title, Route::View, TemplateName::View, is_head).await
}

/// Edit form for an existing page; missing pages go to the create flow
pub async fn edit(state: &AppState, title: Title, is_head: bool) -> Response<Full<Bytes>> {
    load_and_render(state, title, Route::Edit, TemplateName::Edit, is_head).await
}

/// Persist the form's `body` field as the page's new content
pub async fn save(
    state: &AppState,
    title: Title,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let body = match form_value(ctx, "body") {
        Ok(body) => body.unwrap_or_default(),
        Err(e) => return error_response(&e),
    };

    let page = Page::new(title, body);
    if let Err(e) = state.store.save(&page).await {
        logger::log_error(&format!("Failed to save page '{}': {e}", page.title));
        return error_response(&e);
    }

    logger::log_page_saved(page.title.as_str(), page.body.len());
    http::build_redirect_response(&RouteKind::View.path_for(&page.title))
}

/// Empty edit form for a title that has no page yet. Storage is not touched.
pub fn create_new_page(state: &AppState, title: Title, is_head: bool) -> Response<Full<Bytes>> {
    render(state, TemplateName::Edit, &Page::blank(title), is_head)
}

/// Field from a urlencoded body, falling back to the query string
fn form_value(ctx: &RequestContext<'_>, name: &str) -> Result<Option<Vec<u8>>, WikiError> {
    if !form::is_urlencoded(ctx.content_type) {
        return Err(WikiError::UnsupportedMediaType(
            ctx.content_type.unwrap_or_default().to_string(),
        ));
    }
    if let Some(value) = form::field(ctx.body, name)? {
        return Ok(Some(value));
    }
    ctx.query
        .map_or(Ok(None), |query| form::field(query.as_bytes(), name))
}

async fn load_and_render(
    state: &AppState,
    title: Title,
    route: Route,
    template: TemplateName,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match state.store.load(&title).await {
        Ok(page) => render(state, template, &page.with_route(route), is_head),
        Err(WikiError::NotFound(_)) => {
            http::build_redirect_response(&RouteKind::CreateNewPage.path_for(&title))
        }
        Err(e) => error_response(&e),
    }
}

fn render(
    state: &AppState,
    template: TemplateName,
    page: &Page,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match state.templates.render(template, page) {
        Ok(html) => http::build_html_response(html, is_head),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to render {} for '{}': {e}",
                template.file_name(),
                page.title
            ));
            error_response(&e)
        }
    }
}

/// Plain-text response exposing the raw error text
fn error_response(err: &WikiError) -> Response<Full<Bytes>> {
    http::build_text_response(err.status(), &err.to_string())
}
