//! Route descriptors and the compiled route table.
//!
//! Routes are declared as a tree of [`RouteDescriptor`]s and compiled once
//! into a [`RouteTable`]. Descriptors are immutable after that; nothing in
//! the navigation path mutates them.
//!
//! Path rules:
//!
//! - a child path that doesn't start with `/` is joined onto its parent
//!   (`/user` + `admin` → `/user/admin`)
//! - `:name` segments match any single non-empty segment and capture it
//! - `*` matches anything and is always tried last

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// RouteDescriptor
// ---------------------------------------------------------------------------

/// One node of the route tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    /// Left out of the navigation menu, still routable.
    pub hidden: bool,
    /// Where to go instead when this route is the target.
    pub redirect: Option<String>,
    pub children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn child(mut self, child: RouteDescriptor) -> Self {
        self.children.push(child);
        self
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
enum Pattern {
    Segments(Vec<Segment>),
    Wildcard,
}

impl Pattern {
    fn compile(full_path: &str) -> Self {
        if full_path == "*" || full_path == "/*" {
            return Self::Wildcard;
        }
        let segments = split(full_path)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self::Segments(segments)
    }

    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let segments = match self {
            Self::Wildcard => return Some(HashMap::new()),
            Self::Segments(segments) => segments,
        };
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, part) in segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') || child == "*" {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}/{child}", parent.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CompiledRoute {
    full_path: String,
    pattern: Pattern,
    name: Option<String>,
    title: Option<String>,
    redirect: Option<String>,
    hidden: bool,
}

/// The outcome of matching a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// The declared full path that matched (e.g. `/heritage/edit/:id`).
    pub pattern: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub redirect: Option<String>,
    pub hidden: bool,
    pub params: HashMap<String, String>,
}

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub children: Vec<MenuEntry>,
}

/// A compiled, immutable route tree.
#[derive(Debug, Clone)]
pub struct RouteTable {
    tree: Vec<RouteDescriptor>,
    compiled: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        let mut compiled = Vec::new();
        for route in &routes {
            compile_into(&mut compiled, "", route);
        }
        // Wildcards only catch what nothing else claimed.
        compiled.sort_by_key(|r| matches!(r.pattern, Pattern::Wildcard));
        tracing::debug!(routes = compiled.len(), "route table compiled");
        Self {
            tree: routes,
            compiled,
        }
    }

    /// The declared route tree.
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.tree
    }

    /// Finds the route for `path`. A trailing slash is ignored.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        self.compiled.iter().find_map(|route| {
            let params = route.pattern.matches(path)?;
            Some(ResolvedRoute {
                pattern: route.full_path.clone(),
                name: route.name.clone(),
                title: route.title.clone(),
                redirect: route.redirect.clone(),
                hidden: route.hidden,
                params,
            })
        })
    }

    /// The title of the route `path` resolves to, if it has one.
    pub fn title_for(&self, path: &str) -> Option<String> {
        self.resolve(path).and_then(|r| r.title)
    }

    /// The visible part of the tree, for rendering a sidebar.
    pub fn menu(&self) -> Vec<MenuEntry> {
        menu_level("", &self.tree)
    }
}

// Children go first so a parent with the same full path as its index
// child (`/` with child `''`) resolves to the child.
fn compile_into(out: &mut Vec<CompiledRoute>, parent: &str, route: &RouteDescriptor) {
    let full_path = join(parent, &route.path);
    for child in &route.children {
        compile_into(out, &full_path, child);
    }
    let redirect = route.redirect.as_deref().map(|r| join(&full_path, r));
    out.push(CompiledRoute {
        pattern: Pattern::compile(&full_path),
        full_path,
        name: route.name.clone(),
        title: route.title.clone(),
        redirect,
        hidden: route.hidden,
    });
}

fn menu_level(parent: &str, routes: &[RouteDescriptor]) -> Vec<MenuEntry> {
    routes
        .iter()
        .filter(|r| !r.hidden)
        .map(|r| {
            let path = join(parent, &r.path);
            MenuEntry {
                children: menu_level(&path, &r.children),
                name: r.name.clone(),
                title: r.title.clone(),
                icon: r.icon.clone(),
                path,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteDescriptor::new("/login").hidden(),
            RouteDescriptor::new("/")
                .redirect("/dashboard")
                .child(RouteDescriptor::new("dashboard").name("Dashboard").title("首页")),
            RouteDescriptor::new("/heritage")
                .redirect("list")
                .title("数据管理")
                .child(RouteDescriptor::new("list").title("文物列表"))
                .child(RouteDescriptor::new("edit/:id").title("编辑文物").hidden()),
            RouteDescriptor::new("*").redirect("/404").hidden(),
            RouteDescriptor::new("/404").hidden(),
        ])
    }

    // =====================================================================
    // resolve()
    // =====================================================================

    #[test]
    fn test_resolve_child_path_joined_onto_parent() {
        let route = table().resolve("/dashboard").unwrap();

        assert_eq!(route.pattern, "/dashboard");
        assert_eq!(route.title.as_deref(), Some("首页"));
        assert_eq!(route.name.as_deref(), Some("Dashboard"));
    }

    #[test]
    fn test_resolve_root_carries_redirect() {
        let route = table().resolve("/").unwrap();

        assert_eq!(route.redirect.as_deref(), Some("/dashboard"));
    }

    #[test]
    fn test_resolve_relative_redirect_joined_onto_route() {
        let route = table().resolve("/heritage").unwrap();

        assert_eq!(route.redirect.as_deref(), Some("/heritage/list"));
    }

    #[test]
    fn test_resolve_param_segment_captured() {
        let route = table().resolve("/heritage/edit/42").unwrap();

        assert_eq!(route.pattern, "/heritage/edit/:id");
        assert_eq!(route.params.get("id").map(String::as_str), Some("42"));
        assert!(route.hidden);
    }

    #[test]
    fn test_resolve_trailing_slash_ignored() {
        assert_eq!(table().resolve("/heritage/list/").unwrap().pattern, "/heritage/list");
    }

    #[test]
    fn test_resolve_wildcard_tried_last() {
        // `/404` is declared after `*` and must still win.
        let t = table();

        assert_eq!(t.resolve("/404").unwrap().pattern, "/404");
        let fallback = t.resolve("/no/such/page").unwrap();
        assert_eq!(fallback.pattern, "*");
        assert_eq!(fallback.redirect.as_deref(), Some("/404"));
    }

    #[test]
    fn test_resolve_without_wildcard_returns_none() {
        let t = RouteTable::new(vec![RouteDescriptor::new("/login")]);

        assert!(t.resolve("/elsewhere").is_none());
        assert!(t.resolve("/login/extra").is_none());
    }

    #[test]
    fn test_title_for_untitled_route_is_none() {
        assert_eq!(table().title_for("/login"), None);
        assert_eq!(table().title_for("/heritage/list").as_deref(), Some("文物列表"));
    }

    // =====================================================================
    // menu()
    // =====================================================================

    #[test]
    fn test_menu_skips_hidden_routes_at_every_level() {
        let menu = table().menu();

        let paths: Vec<_> = menu.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/heritage"]);

        let heritage = &menu[1];
        assert_eq!(heritage.children.len(), 1);
        assert_eq!(heritage.children[0].path, "/heritage/list");
    }
}
