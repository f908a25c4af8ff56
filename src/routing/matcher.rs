//! Route matching module
//!
//! Matches `/<action>/<title>` against the wiki route table and parses the
//! title parameter.

use hyper::Method;

use crate::storage::Title;

/// Handler bound to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    View,
    Edit,
    Save,
    CreateNewPage,
}

impl RouteKind {
    /// Path segment selecting this route
    pub const fn action(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::CreateNewPage => "createNewPage",
        }
    }

    /// Value of the `Allow` header for this route
    pub const fn allowed_methods(self) -> &'static str {
        match self {
            Self::Save => "POST",
            Self::View | Self::Edit | Self::CreateNewPage => "GET, HEAD",
        }
    }

    pub fn allows(self, method: &Method) -> bool {
        match self {
            Self::Save => method == Method::POST,
            Self::View | Self::Edit | Self::CreateNewPage => {
                method == Method::GET || method == Method::HEAD
            }
        }
    }

    /// Path for `title` under this route
    pub fn path_for(self, title: &Title) -> String {
        format!("/{}/{title}", self.action())
    }
}

/// Route table, matched in order
pub const ROUTES: [RouteKind; 4] = [
    RouteKind::View,
    RouteKind::Edit,
    RouteKind::Save,
    RouteKind::CreateNewPage,
];

/// A path that matched the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub kind: RouteKind,
    pub title: Title,
}

/// Match `path` against the route table.
///
/// The path must be exactly `/<action>/<title>`; a trailing slash, extra
/// segments or an invalid title are all misses.
pub fn match_route(path: &str) -> Option<RouteMatch> {
    let rest = path.strip_prefix('/')?;
    let (action, raw_title) = rest.split_once('/')?;
    let kind = ROUTES.into_iter().find(|k| k.action() == action)?;
    let title = Title::parse(raw_title)?;
    Some(RouteMatch { kind, title })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(path: &str) -> Option<(RouteKind, String)> {
        match_route(path).map(|m| (m.kind, m.title.to_string()))
    }

    #[test]
    fn test_match_each_route() {
        assert_eq!(
            matched("/view/Home"),
            Some((RouteKind::View, "Home".to_string()))
        );
        assert_eq!(
            matched("/edit/Home"),
            Some((RouteKind::Edit, "Home".to_string()))
        );
        assert_eq!(
            matched("/save/Test1"),
            Some((RouteKind::Save, "Test1".to_string()))
        );
        assert_eq!(
            matched("/createNewPage/doesNotExist123"),
            Some((RouteKind::CreateNewPage, "doesNotExist123".to_string()))
        );
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(matched("/foo/bar"), None);
        assert_eq!(matched("/View/Home"), None);
        assert_eq!(matched("/doCreate/Home"), None);
    }

    #[test]
    fn test_invalid_title() {
        assert_eq!(matched("/view/bad!title"), None);
        assert_eq!(matched("/view/"), None);
        assert_eq!(matched("/view/a.txt"), None);
        assert_eq!(matched("/view/..%2Fetc"), None);
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(matched("/"), None);
        assert_eq!(matched(""), None);
        assert_eq!(matched("/view"), None);
        assert_eq!(matched("/view/Home/"), None);
        assert_eq!(matched("/view/Home/extra"), None);
        assert_eq!(matched("view/Home"), None);
        assert_eq!(matched("//view/Home"), None);
    }

    #[test]
    fn test_methods() {
        assert!(RouteKind::View.allows(&Method::GET));
        assert!(RouteKind::View.allows(&Method::HEAD));
        assert!(!RouteKind::View.allows(&Method::POST));
        assert!(RouteKind::Save.allows(&Method::POST));
        assert!(!RouteKind::Save.allows(&Method::GET));
        assert_eq!(RouteKind::Save.allowed_methods(), "POST");
    }

    #[test]
    fn test_path_for() {
        let title = Title::parse("Test1").unwrap();
        assert_eq!(RouteKind::View.path_for(&title), "/view/Test1");
        assert_eq!(
            RouteKind::CreateNewPage.path_for(&title),
            "/createNewPage/Test1"
        );
    }
}
