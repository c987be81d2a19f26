//! End-to-end tests: a wired console over a scripted backend.

use std::sync::{Arc, Mutex};

use adminward::prelude::*;
use adminward::{LOGIN_PATH, PROFILE_PATH};
use adminward_session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionError,
};
use adminward_transport::TransportError;

// =========================================================================
// Test doubles
// =========================================================================

type Reply = Result<HttpResponse, TransportError>;

/// A tiny backend: one account, `alice` / `pw`, issuing `tok-1`.
struct Backend {
    profile: fn(&HttpRequest) -> Reply,
    seen: Mutex<Vec<HttpRequest>>,
}

impl Backend {
    fn new() -> Self {
        Self::with_profile(|req| match req.header("Authorization") {
            Some("Bearer tok-1") => Ok(HttpResponse::new(
                200,
                r#"{"username":"alice","role":"admin","email":"alice@example.org","id":3}"#,
            )),
            _ => unauthorized(),
        })
    }

    fn with_profile(profile: fn(&HttpRequest) -> Reply) -> Self {
        Self {
            profile,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }
}

impl HttpTransport for Backend {
    async fn send(&self, request: HttpRequest) -> Reply {
        self.seen.lock().unwrap().push(request.clone());
        match request.path.as_str() {
            LOGIN_PATH => {
                let body: serde_json::Value =
                    serde_json::from_slice(request.body.as_deref().unwrap_or_default())
                        .unwrap_or_default();
                if body["username"] == "alice" && body["password"] == "pw" {
                    Ok(HttpResponse::new(201, r#"{"access_token":"tok-1","message":"ok"}"#))
                } else {
                    unauthorized()
                }
            }
            PROFILE_PATH => (self.profile)(&request),
            _ => Err(TransportError::Status {
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

fn unauthorized() -> Reply {
    Err(TransportError::Status {
        status: 401,
        body: Vec::new(),
    })
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    async fn confirm(&self, _prompt: &Prompt) -> bool {
        true
    }
}

// =========================================================================
// Fixture
// =========================================================================

struct Fixture {
    console: Console<Backend, SharedNotifier>,
    notifier: Arc<RecordingNotifier>,
}

// The console owns its notifier; this one forwards to a shared recorder.
struct SharedNotifier(Arc<RecordingNotifier>);

impl Notifier for SharedNotifier {
    fn notify(&self, notice: Notice) {
        self.0.notify(notice);
    }

    async fn confirm(&self, prompt: &Prompt) -> bool {
        self.0.confirm(prompt).await
    }
}

fn wired(builder: ConsoleBuilder, backend: Backend) -> Fixture {
    let notifier = Arc::new(RecordingNotifier::default());
    let console = builder.build_with(backend, SharedNotifier(Arc::clone(&notifier)));
    Fixture { console, notifier }
}

fn fixture(backend: Backend) -> Fixture {
    wired(ConsoleBuilder::new(), backend)
}

fn loc(s: &str) -> Location {
    Location::parse(s).unwrap()
}

// =========================================================================
// Login and navigation
// =========================================================================

#[tokio::test]
async fn test_console_logged_out_navigation_goes_to_login() {
    let f = fixture(Backend::new());

    let nav = f.console.navigate("/heritage/list", &loc("/")).await.unwrap();

    assert_eq!(nav.location().to_string(), "/login?redirect=/heritage/list");
    assert!(f.console.client().transport().paths().is_empty());
}

#[tokio::test]
async fn test_console_login_then_navigate_loads_identity() {
    let f = fixture(Backend::new());
    let login_page = loc("/login?redirect=/heritage/list");

    f.console.login(" alice ", "pw").await.unwrap();
    let target = f.console.return_target(&login_page);
    let nav = f.console.navigate(&target.to_string(), &login_page).await.unwrap();

    assert_eq!(
        nav,
        Navigation::Proceed {
            to: loc("/heritage/list"),
            title: "文物列表".into(),
        }
    );
    let identity = f.console.session().identity().unwrap();
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.role, Role::ADMIN);
    assert_eq!(identity.extra["id"], 3);
    assert!(f.console.has_permission(&Capability::DATA_MANAGE));
    assert_eq!(
        f.console.client().transport().paths(),
        vec![LOGIN_PATH, PROFILE_PATH]
    );
}

#[tokio::test]
async fn test_console_root_follows_route_redirect_after_login() {
    let f = fixture(Backend::new());
    f.console.login("alice", "pw").await.unwrap();

    let nav = f.console.navigate("/", &loc("/login")).await.unwrap();

    assert_eq!(nav.location().path(), "/dashboard");
    assert!(!nav.is_redirect());
}

#[tokio::test]
async fn test_console_logged_in_visiting_login_goes_home() {
    let f = fixture(Backend::new());
    f.console.login("alice", "pw").await.unwrap();

    let nav = f.console.navigate("/login", &loc("/dashboard")).await.unwrap();

    assert_eq!(nav, Navigation::Redirect { to: loc("/") });
}

#[tokio::test]
async fn test_console_wrong_password_is_invalid_credentials() {
    let f = fixture(Backend::new());
    let mut events = f.console.subscribe_invalidations();

    let err = f.console.login("alice", "nope").await.unwrap_err();

    assert!(matches!(
        err,
        AdminwardError::Session(SessionError::InvalidCredentials(_))
    ));
    assert_eq!(f.console.session().phase(), SessionPhase::NoToken);
    assert!(events.try_recv().is_err(), "no session existed to invalidate");
    assert_eq!(f.notifier.messages(), vec!["未经授权，请重新登录"]);
}

#[tokio::test]
async fn test_console_logout_then_navigation_goes_to_login() {
    let f = fixture(Backend::new());
    f.console.login("alice", "pw").await.unwrap();
    f.console.navigate("/dashboard", &loc("/login")).await.unwrap();

    f.console.logout();
    let nav = f.console.navigate("/dashboard", &loc("/")).await.unwrap();

    assert!(nav.is_redirect());
    assert!(!f.console.has_permission(&Capability::LOG_VIEW));
    assert!(f.console.context().credentials().get().is_none());
}

// =========================================================================
// Expired sessions
// =========================================================================

#[tokio::test]
async fn test_console_restored_token_rejected_by_profile_returns_to_login() {
    let creds = Arc::new(MemoryCredentialStore::new());
    creds.set(&Token::new("tok-expired"));
    let f = wired(
        ConsoleBuilder::new().credential_store(creds.clone()),
        Backend::new(),
    );
    let mut events = f.console.subscribe_invalidations();

    let nav = f.console.navigate("/backup/list", &loc("/")).await.unwrap();

    assert_eq!(nav.location().to_string(), "/login?redirect=/backup/list");
    assert!(creds.get().is_none());
    assert_eq!(
        events.try_recv().unwrap().cause,
        InvalidationCause::Unauthorized
    );
    assert!(events.try_recv().is_err());
    assert_eq!(
        f.notifier.messages(),
        vec![
            "未经授权，请重新登录",
            "session expired or invalid: server responded with status 401",
        ]
    );
}

#[tokio::test]
async fn test_console_empty_profile_returns_to_login() {
    let f = fixture(Backend::with_profile(|_| Ok(HttpResponse::new(200, ""))));
    f.console.login("alice", "pw").await.unwrap();

    let nav = f.console.navigate("/dashboard", &loc("/login")).await.unwrap();

    assert!(nav.is_redirect());
    assert_eq!(f.console.session().phase(), SessionPhase::NoToken);
    assert_eq!(
        f.notifier.messages(),
        vec!["session expired or invalid: profile response was empty"]
    );
}

// =========================================================================
// Durable storage
// =========================================================================

#[tokio::test]
async fn test_console_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConsoleConfig {
        storage_dir: Some(dir.path().to_path_buf()),
        ..ConsoleConfig::default()
    };

    let first = fixture_with_config(config.clone());
    first.login("alice", "pw").await.unwrap();
    first.navigate("/dashboard", &loc("/login")).await.unwrap();
    drop(first);

    let store = FileCredentialStore::new(dir.path());
    assert_eq!(store.get(), Some(Token::new("tok-1")));
    assert_eq!(store.cached_identity().unwrap().username, "alice");

    let second = fixture_with_config(config);
    assert_eq!(second.session().phase(), SessionPhase::TokenNoIdentity);
    assert!(
        second.has_permission(&Capability::USER_MANAGE),
        "cached identity answers permission checks before the refetch"
    );
    let nav = second.navigate("/user/admin", &loc("/")).await.unwrap();
    assert!(!nav.is_redirect());
    assert_eq!(second.session().phase(), SessionPhase::TokenWithIdentity);
}

fn fixture_with_config(config: ConsoleConfig) -> Console<Backend, RecordingNotifier> {
    ConsoleBuilder::new()
        .config(config)
        .build_with(Backend::new(), RecordingNotifier::default())
}

// =========================================================================
// Menu and observation
// =========================================================================

#[tokio::test]
async fn test_console_menu_lists_visible_sections() {
    let f = fixture(Backend::new());

    let menu = f.console.menu();

    let titles: Vec<_> = menu.iter().filter_map(|m| m.title.as_deref()).collect();
    assert_eq!(
        titles,
        vec!["用户管理", "数据管理", "信息审核", "备份管理", "日志管理"]
    );
    let users = menu.iter().find(|m| m.path == "/user").unwrap();
    assert_eq!(users.children.len(), 3);
}

#[tokio::test]
async fn test_console_subscribe_sees_login_and_logout() {
    let f = fixture(Backend::new());
    let mut state = f.console.subscribe();

    f.console.login("alice", "pw").await.unwrap();
    state.changed().await.unwrap();
    assert!(state.borrow_and_update().token().is_some());

    f.console.logout();
    state.changed().await.unwrap();
    assert!(state.borrow_and_update().token().is_none());
}
