use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Route {
    Login,
    SignUp,
    Home,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::Home => "/",
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync + 'static {
    /// Replaces the current entry, so going back does not return to it.
    fn replace(&self, route: Route);
    fn push(&self, route: Route);
}

/// Keeps the visited routes in memory, oldest first.
#[derive(Clone)]
pub struct HistoryNavigator {
    entries: Arc<RwLock<Vec<Route>>>,
}

impl HistoryNavigator {
    pub fn new(initial: Route) -> Self {
        Self {
            entries: Arc::new(RwLock::new(vec![initial])),
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.entries().last().copied()
    }

    pub fn entries(&self) -> Vec<Route> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn with_entries(&self, f: impl FnOnce(&mut Vec<Route>)) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut entries);
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Navigator for HistoryNavigator {
    fn replace(&self, route: Route) {
        self.with_entries(|entries| {
            entries.pop();
            entries.push(route);
        });
    }

    fn push(&self, route: Route) {
        self.with_entries(|entries| entries.push(route));
    }
}
