// Terminal navigator: there is no browser to redirect, so navigations are
// printed as links. Route state lives in a `MemoryNavigator`.

use solvr_core::navigator::is_local_path;
use solvr_core::{MemoryNavigator, Navigator};
use tracing::debug;
use url::Url;

use crate::output::highlight;

pub struct TerminalNavigator {
    route: MemoryNavigator,
    frontend: Url,
    color: bool,
    quiet: bool,
}

impl TerminalNavigator {
    pub fn new(route: &str, frontend: Url, color: bool, quiet: bool) -> Self {
        Self {
            route: MemoryNavigator::new(route),
            frontend,
            color,
            quiet,
        }
    }

    /// Local routes become links on the web frontend.
    fn absolute(&self, target: &str) -> String {
        if is_local_path(target) {
            self.frontend
                .join(target)
                .map_or_else(|_| target.to_owned(), String::from)
        } else {
            target.to_owned()
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.route.current_path()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.route.query_param(name)
    }

    fn assign(&self, url: &str) {
        self.route.assign(url);
        if !self.quiet {
            eprintln!("Open: {}", highlight(&self.absolute(url), self.color));
        }
    }

    fn reload(&self, path: &str) {
        self.route.reload(path);
        debug!(path, "reload requested");
    }
}
