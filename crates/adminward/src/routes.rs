//! The console's built-in route tree.

use adminward_router::{RouteDescriptor, RouteTable};

/// The route tree of the heritage administration console.
///
/// `/login` and `/404` are hidden; `*` sends everything unmatched to
/// `/404`. Section roots redirect to their first page.
pub fn console_routes() -> RouteTable {
    RouteTable::new(vec![
        RouteDescriptor::new("/login").hidden(),
        RouteDescriptor::new("/404").hidden(),
        RouteDescriptor::new("/").redirect("/dashboard").child(
            RouteDescriptor::new("dashboard")
                .name("Dashboard")
                .title("首页")
                .icon("el-icon-s-home"),
        ),
        RouteDescriptor::new("/user")
            .redirect("/user/admin")
            .name("User")
            .title("用户管理")
            .icon("el-icon-user-solid")
            .child(page("admin", "AdminUser", "管理员用户", "el-icon-s-check"))
            .child(page("mobile", "MobileUser", "移动端用户", "el-icon-mobile-phone"))
            .child(page("web", "WebUser", "网页端用户", "el-icon-monitor")),
        RouteDescriptor::new("/heritage")
            .redirect("/heritage/list")
            .name("Heritage")
            .title("数据管理")
            .icon("el-icon-s-data")
            .child(RouteDescriptor::new("list").name("HeritageList").title("文物列表"))
            .child(page("edit/:id", "HeritageEdit", "编辑文物", "el-icon-edit").hidden()),
        RouteDescriptor::new("/reviews")
            .redirect("/reviews/comments")
            .name("Reviews")
            .title("信息审核")
            .icon("el-icon-s-check")
            .child(page("comments", "CommentReview", "评论审核", "el-icon-chat-dot-square")),
        RouteDescriptor::new("/backup")
            .redirect("/backup/list")
            .name("Backup")
            .title("备份管理")
            .icon("el-icon-folder")
            .child(page("list", "BackupList", "备份列表", "el-icon-document-copy")),
        RouteDescriptor::new("/log")
            .redirect("/log/list")
            .name("Log")
            .title("日志管理")
            .icon("el-icon-document")
            .child(page("list", "LogList", "操作日志", "el-icon-tickets")),
        RouteDescriptor::new("*").redirect("/404").hidden(),
    ])
}

fn page(path: &str, name: &str, title: &str, icon: &str) -> RouteDescriptor {
    RouteDescriptor::new(path).name(name).title(title).icon(icon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_routes_section_roots_redirect() {
        let routes = console_routes();

        for (root, first) in [
            ("/", "/dashboard"),
            ("/user", "/user/admin"),
            ("/heritage", "/heritage/list"),
            ("/backup", "/backup/list"),
            ("/log", "/log/list"),
        ] {
            let route = routes.resolve(root).unwrap();
            assert_eq!(route.redirect.as_deref(), Some(first), "for {root}");
        }
    }

    #[test]
    fn test_console_routes_edit_page_is_routable_but_hidden() {
        let routes = console_routes();

        let edit = routes.resolve("/heritage/edit/17").unwrap();
        assert_eq!(edit.name.as_deref(), Some("HeritageEdit"));
        assert!(edit.hidden);

        let heritage = routes.menu().into_iter().find(|m| m.path == "/heritage").unwrap();
        let children: Vec<_> = heritage.children.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(children, vec!["/heritage/list"]);
    }

    #[test]
    fn test_console_routes_menu_has_no_hidden_entries() {
        let paths: Vec<_> = console_routes().menu().into_iter().map(|m| m.path).collect();

        assert_eq!(paths, vec!["/", "/user", "/heritage", "/reviews", "/backup", "/log"]);
    }
}
