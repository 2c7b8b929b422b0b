// ── Navigation seam ──
//
// The session layer needs to know where the user currently is (to decide
// whether a 401 should open the login prompt, and where to return after
// an external login) and to move them elsewhere. Hosts plug in their own
// `Navigator`; `MemoryNavigator` covers headless runs and tests.

use std::sync::Mutex;

use url::Url;

/// Route prefixes on which an auth failure never opens the login prompt.
const AUTH_ROUTES: &[&str] = &["/login", "/join", "/auth"];

/// Whether `path` is one of the login/registration/callback routes.
///
/// Matches `/login`, `/join` and `/auth` exactly or followed by a `/`
/// segment. `/authors` is not an auth route.
pub fn is_auth_route(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    AUTH_ROUTES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Whether `target` is safe to navigate to after login: a same-origin
/// absolute path, never a scheme-relative `//host` URL.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

pub trait Navigator: Send + Sync {
    /// Path of the current location, without query string.
    fn current_path(&self) -> String;

    fn query_param(&self, name: &str) -> Option<String>;

    /// Navigate to `url`, which may be absolute or a local path.
    fn assign(&self, url: &str);

    /// Navigate to `path` discarding all in-memory page state.
    fn reload(&self, path: &str);
}

/// Kind of navigation performed through a `MemoryNavigator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Assign,
    Reload,
}

/// In-process navigator that tracks a current route and records every
/// navigation it is asked to perform.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug, Default)]
struct NavState {
    path: String,
    query: Vec<(String, String)>,
    history: Vec<(NavigationKind, String)>,
}

impl MemoryNavigator {
    /// Start at `route`, e.g. `/posts/42` or `/login?next=/posts/42`.
    pub fn new(route: &str) -> Self {
        let nav = Self {
            state: Mutex::new(NavState::default()),
        };
        nav.set_route(route);
        nav
    }

    /// Move to `route` without recording a navigation.
    pub fn set_route(&self, route: &str) {
        let (path, query) = split_route(route);
        let mut state = self.state.lock().expect("navigator lock poisoned");
        state.path = path;
        state.query = query;
    }

    /// Every `assign`/`reload` performed so far, oldest first.
    pub fn history(&self) -> Vec<(NavigationKind, String)> {
        self.state
            .lock()
            .expect("navigator lock poisoned")
            .history
            .clone()
    }

    pub fn last_navigation(&self) -> Option<(NavigationKind, String)> {
        self.state
            .lock()
            .expect("navigator lock poisoned")
            .history
            .last()
            .cloned()
    }

    fn record(&self, kind: NavigationKind, target: &str) {
        let mut state = self.state.lock().expect("navigator lock poisoned");
        state.history.push((kind, target.to_owned()));
        // Local targets become the new current route.
        if is_local_path(target) {
            let (path, query) = split_route(target);
            state.path = path;
            state.query = query;
        }
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .expect("navigator lock poisoned")
            .path
            .clone()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .expect("navigator lock poisoned")
            .query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn assign(&self, url: &str) {
        self.record(NavigationKind::Assign, url);
    }

    fn reload(&self, path: &str) {
        self.record(NavigationKind::Reload, path);
    }
}

fn split_route(route: &str) -> (String, Vec<(String, String)>) {
    let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(route)) else {
        return ("/".to_owned(), Vec::new());
    };
    let query = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    (url.path().to_owned(), query)
}
