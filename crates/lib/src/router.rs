//! View routing: location path -> view, with redirects and an explicit unmatched policy.
//!
//! The table is static data: an ordered list of (path, name, view) routes plus redirect rules.
//! Matching ignores query string and fragment, treats one trailing slash as optional, and is
//! case-insensitive. [`History`] is the navigation stack that swaps the displayed view.

use serde::{Deserialize, Serialize};

/// Maximum redirects followed for one navigation before giving up.
const MAX_REDIRECTS: usize = 8;

/// Views the application can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    FaultDetection,
    RoutePlanning,
    CleaningStrategy,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::FaultDetection => "FaultDetection",
            View::RoutePlanning => "RoutePlanning",
            View::CleaningStrategy => "CleaningStrategy",
        }
    }
}

/// One declared route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

/// Redirect rule: navigating to `from` continues at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub from: &'static str,
    pub to: &'static str,
}

pub const ROUTES: &[Route] = &[
    Route {
        path: "/fault-detection",
        name: "FaultDetection",
        view: View::FaultDetection,
    },
    Route {
        path: "/route-planning",
        name: "RoutePlanning",
        view: View::RoutePlanning,
    },
    Route {
        path: "/cleaning-strategy",
        name: "CleaningStrategy",
        view: View::CleaningStrategy,
    },
];

pub const REDIRECTS: &[Redirect] = &[Redirect {
    from: "/",
    to: "/fault-detection",
}];

/// What a path outside the declared routes resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Unmatched {
    /// No view; the caller shows its not-found page.
    #[default]
    NotFound,
    /// Continue navigation at this path.
    Redirect(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("too many redirects resolving {path}")]
    RedirectLoop { path: String },
    #[error("unmatched-path redirect target {target} is not a declared route")]
    UnmatchedTarget { target: String },
}

/// Outcome of resolving a path: the final location and the matched route, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub location: String,
    pub route: Option<Route>,
}

impl Resolved {
    pub fn view(&self) -> Option<View> {
        self.route.map(|r| r.view)
    }

    pub fn is_not_found(&self) -> bool {
        self.route.is_none()
    }
}

/// Static route table plus the unmatched-path policy.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    redirects: Vec<Redirect>,
    unmatched: Unmatched,
}

impl RouteTable {
    /// The application's declared routes. The unmatched policy has no default here; the caller decides.
    pub fn new(unmatched: Unmatched) -> Self {
        Self::from_parts(ROUTES.to_vec(), REDIRECTS.to_vec(), unmatched)
    }

    pub fn from_parts(routes: Vec<Route>, redirects: Vec<Redirect>, unmatched: Unmatched) -> Self {
        Self {
            routes,
            redirects,
            unmatched,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn redirects(&self) -> &[Redirect] {
        &self.redirects
    }

    pub fn unmatched(&self) -> &Unmatched {
        &self.unmatched
    }

    /// Path of the route with this name (exact, case-sensitive).
    pub fn path_for(&self, name: &str) -> Option<&'static str> {
        self.routes.iter().find(|r| r.name == name).map(|r| r.path)
    }

    /// Resolve a location to its view, following redirects and the unmatched policy.
    pub fn resolve(&self, path: &str) -> Result<Resolved, RouteError> {
        let mut location = normalize(path);
        let mut fell_back = false;
        for _ in 0..=MAX_REDIRECTS {
            if let Some(r) = self.redirects.iter().find(|r| same_path(r.from, &location)) {
                log::debug!("router: redirect {} -> {}", location, r.to);
                location = normalize(r.to);
                continue;
            }
            if let Some(route) = self.routes.iter().find(|r| same_path(r.path, &location)) {
                return Ok(Resolved {
                    location: route.path.to_string(),
                    route: Some(*route),
                });
            }
            match &self.unmatched {
                Unmatched::NotFound => {
                    log::debug!("router: no route for {}", location);
                    return Ok(Resolved {
                        location,
                        route: None,
                    });
                }
                Unmatched::Redirect(to) => {
                    if fell_back {
                        return Err(RouteError::UnmatchedTarget { target: to.clone() });
                    }
                    fell_back = true;
                    log::debug!("router: no route for {}, redirecting to {}", location, to);
                    location = normalize(to);
                }
            }
        }
        Err(RouteError::RedirectLoop {
            path: path.to_string(),
        })
    }
}

/// Strip query and fragment, ensure a leading slash, drop one trailing slash.
fn normalize(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let p = path[..end].trim();
    let mut out = if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{}", p)
    };
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

fn same_path(declared: &str, location: &str) -> bool {
    declared.eq_ignore_ascii_case(location)
}

/// Navigation history: a stack of resolved entries with a cursor, like browser history.
#[derive(Debug, Clone)]
pub struct History {
    table: RouteTable,
    entries: Vec<Resolved>,
    index: usize,
}

impl History {
    pub fn new(table: RouteTable, initial: &str) -> Result<Self, RouteError> {
        let first = table.resolve(initial)?;
        Ok(Self {
            table,
            entries: vec![first],
            index: 0,
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current(&self) -> &Resolved {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Navigate to a new location, discarding any forward entries.
    pub fn push(&mut self, path: &str) -> Result<&Resolved, RouteError> {
        let next = self.table.resolve(path)?;
        self.entries.truncate(self.index + 1);
        self.entries.push(next);
        self.index = self.entries.len() - 1;
        Ok(self.current())
    }

    /// Replace the current entry without adding to history.
    pub fn replace(&mut self, path: &str) -> Result<&Resolved, RouteError> {
        let next = self.table.resolve(path)?;
        self.entries[self.index] = next;
        Ok(self.current())
    }

    /// Step back one entry. None when already at the oldest entry.
    pub fn back(&mut self) -> Option<&Resolved> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward one entry. None when already at the newest entry.
    pub fn forward(&mut self) -> Option<&Resolved> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }
}
