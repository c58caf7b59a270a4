use std::collections::BTreeSet;

/// Route reached by unauthenticated users
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Landing route for authenticated users
pub const DEFAULT_HOME_ROUTE: &str = "/";

/// Static classification of routes into public and protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public: BTreeSet<String>,
    login_route: String,
    home_route: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new([DEFAULT_LOGIN_ROUTE], DEFAULT_LOGIN_ROUTE, DEFAULT_HOME_ROUTE)
    }
}

impl RouteTable {
    pub fn new<I, S>(public: I, login_route: &str, home_route: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            public: public
                .into_iter()
                .map(|route| normalize(route.as_ref()).to_string())
                .collect(),
            login_route: normalize(login_route).to_string(),
            home_route: normalize(home_route).to_string(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn home_route(&self) -> &str {
        &self.home_route
    }

    pub fn is_public(&self, route: &str) -> bool {
        self.public.contains(normalize(route))
    }

    /// Every route not explicitly public requires a session
    pub fn is_protected(&self, route: &str) -> bool {
        !self.is_public(route)
    }

    pub fn is_login_route(&self, route: &str) -> bool {
        normalize(route) == self.login_route
    }
}

/// Reduce a destination to its path: query and fragment dropped, trailing
/// slash removed except on the root.
pub fn normalize(route: &str) -> &str {
    let end = route.find(|c: char| c == '?' || c == '#').unwrap_or(route.len());
    let path = route[..end].trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/login"), "/login");
        assert_eq!(normalize("/login/"), "/login");
        assert_eq!(normalize("/login?next=/x"), "/login");
        assert_eq!(normalize("/login#top"), "/login");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/?q=1"), "/");
    }

    #[test]
    fn test_default_table() {
        let table = RouteTable::default();
        assert!(table.is_public("/login"));
        assert!(table.is_protected("/"));
        assert!(table.is_protected("/dashboard"));
        assert!(table.is_protected("/search"));
        assert_eq!(table.login_route(), "/login");
        assert_eq!(table.home_route(), "/");
    }

    #[test]
    fn test_lookup_ignores_query_and_trailing_slash() {
        let table = RouteTable::default();
        assert!(table.is_public("/login/"));
        assert!(table.is_public("/login?redirect=/dashboard"));
        assert!(table.is_login_route("/login?redirect=/dashboard"));
        assert!(!table.is_login_route("/login/extra"));
    }

    #[test]
    fn test_custom_public_routes() {
        let table = RouteTable::new(["/login", "/about/", "/help"], "/login", "/home");
        assert!(table.is_public("/about"));
        assert!(table.is_public("/help"));
        assert!(table.is_protected("/settings"));
        assert_eq!(table.home_route(), "/home");
    }
}
