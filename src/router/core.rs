use crate::error::RegistrationError;
use crate::handlers::HandlerDescriptor;
use crate::security::{AccessRule, DEFAULT_SESSION_KEY};
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of path variables before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path variables, in template order.
///
/// Names are shared with the route entry; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Verb filter of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Matches every method
    Any,
    Exact(Method),
}

impl Verb {
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            Verb::Any => true,
            Verb::Exact(m) => m == method,
        }
    }

    /// Whether some method is accepted by both filters.
    #[must_use]
    pub fn overlaps(&self, other: &Verb) -> bool {
        match (self, other) {
            (Verb::Any, _) | (_, Verb::Any) => true,
            (Verb::Exact(a), Verb::Exact(b)) => a == b,
        }
    }
}

impl From<Method> for Verb {
    fn from(method: Method) -> Self {
        Verb::Exact(method)
    }
}

impl FromStr for Verb {
    type Err = http::method::InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ANY") {
            return Ok(Verb::Any);
        }
        Method::from_bytes(s.to_ascii_uppercase().as_bytes()).map(Verb::Exact)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Any => f.write_str("ANY"),
            Verb::Exact(m) => write!(f, "{m}"),
        }
    }
}

/// Registration-time configuration of a route.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    verb: Verb,
    roles: Vec<String>,
    session_key: Option<String>,
}

impl Route {
    #[must_use]
    pub fn new(pattern: impl Into<String>, verb: Verb) -> Self {
        Self {
            pattern: pattern.into(),
            verb,
            roles: Vec::new(),
            session_key: None,
        }
    }

    #[must_use]
    pub fn get(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Verb::Exact(Method::GET))
    }

    #[must_use]
    pub fn post(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Verb::Exact(Method::POST))
    }

    #[must_use]
    pub fn any(pattern: impl Into<String>) -> Self {
        Self::new(pattern, Verb::Any)
    }

    /// Restrict the route to clients whose session role is one of `roles`.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Session key holding the client's role for this route.
    #[must_use]
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }
}

/// One compiled registration.
#[derive(Debug)]
pub struct RouteEntry {
    template: String,
    matcher: Regex,
    variables: Vec<Arc<str>>,
    verb: Verb,
    handler: HandlerDescriptor,
    access: AccessRule,
}

impl RouteEntry {
    /// Template as registered, base path included.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Variable names in the order they appear in the template.
    #[must_use]
    pub fn variables(&self) -> &[Arc<str>] {
        &self.variables
    }

    #[must_use]
    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerDescriptor {
        &self.handler
    }

    #[must_use]
    pub fn access(&self) -> &AccessRule {
        &self.access
    }

    fn capture(&self, path: &str) -> Option<ParamVec> {
        let caps = self.matcher.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.variables.iter().enumerate() {
            let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
            params.push((Arc::clone(name), value.to_string()));
        }
        Some(params)
    }
}

/// A successful lookup: the matched entry and its captured variables.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub entry: &'a RouteEntry,
    pub variables: ParamVec,
}

impl MatchResult<'_> {
    /// Value of a path variable.
    ///
    /// When a template repeats a name (`/org/{id}/user/{id}`) the first
    /// occurrence is returned. Every occurrence stays in `variables`.
    #[inline]
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// No route accepts the request path and verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matches {method} {path}")]
pub struct RouteNotFound {
    pub method: Method,
    pub path: String,
}

impl RouteNotFound {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Collects registrations and produces an immutable [`RouteTable`].
#[derive(Debug)]
pub struct RouteTableBuilder {
    base_path: String,
    default_role_key: String,
    entries: Vec<RouteEntry>,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_path: String::new(),
            default_role_key: DEFAULT_SESSION_KEY.to_string(),
            entries: Vec::new(),
        }
    }

    /// Prefix every template registered after this call (e.g. `/app`).
    #[must_use]
    pub fn base_path(mut self, prefix: &str) -> Self {
        self.base_path = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Session key used by routes that set roles without naming one.
    #[must_use]
    pub fn default_role_key(mut self, key: impl Into<String>) -> Self {
        self.default_role_key = key.into();
        self
    }

    /// Compile `route` and append it. Registration order is match order.
    pub fn register(
        mut self,
        route: Route,
        handler: HandlerDescriptor,
    ) -> Result<Self, RegistrationError> {
        let template = format!("{}{}", self.base_path, route.pattern);
        let (matcher, variables) =
            path_to_regex(&template).map_err(|source| RegistrationError::InvalidTemplate {
                template: template.clone(),
                source,
            })?;
        let access = if route.roles.is_empty() {
            AccessRule::open()
        } else {
            AccessRule::roles(route.roles).with_session_key(
                route
                    .session_key
                    .unwrap_or_else(|| self.default_role_key.clone()),
            )
        };

        // RT0: Route registered
        debug!(
            verb = %route.verb,
            template = %template,
            regex = %matcher.as_str(),
            variables = ?variables,
            handler_name = %handler.name(),
            "Route registered"
        );

        self.entries.push(RouteEntry {
            template,
            matcher,
            variables,
            verb: route.verb,
            handler,
            access,
        });
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> RouteTable {
        let table = RouteTable {
            entries: self.entries,
            base_path: self.base_path,
        };

        for (earlier, later) in table.shadowed_routes() {
            let (a, b) = (&table.entries[earlier], &table.entries[later]);
            warn!(
                earlier = %format_args!("{} {}", a.verb, a.template),
                later = %format_args!("{} {}", b.verb, b.template),
                "Route is shadowed by an earlier registration"
            );
        }

        // RT5: Routing table loaded
        info!(
            routes_count = table.entries.len(),
            base_path = %table.base_path,
            "Routing table loaded"
        );
        table
    }
}

/// Immutable, insertion-ordered route registry.
///
/// Built once at startup and shared by reference; lookups take `&self` only.
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    base_path: String,
}

impl RouteTable {
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Find the first entry, in registration order, whose template matches
    /// the whole `path` and whose verb accepts `method`.
    pub fn resolve(&self, path: &str, method: &Method) -> Result<MatchResult<'_>, RouteNotFound> {
        // RT1: Route match attempt
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        for entry in &self.entries {
            if !entry.verb.accepts(method) {
                continue;
            }
            let Some(variables) = entry.capture(path) else {
                continue;
            };
            let match_duration = match_start.elapsed();

            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    handler_name = %entry.handler.name(),
                    route_pattern = %entry.template,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                // RT3: Route matched
                info!(
                    method = %method,
                    path = %path,
                    handler_name = %entry.handler.name(),
                    route_pattern = %entry.template,
                    path_params = ?variables,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }
            return Ok(MatchResult { entry, variables });
        }

        // RT4: No route found
        warn!(
            method = %method,
            path = %path,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        Err(RouteNotFound::new(method.clone(), path))
    }

    /// Pairs `(earlier, later)` of entry indices where the earlier entry
    /// captures the later template's own literal path for some shared verb,
    /// so the later entry can never serve that path.
    #[must_use]
    pub fn shadowed_routes(&self) -> Vec<(usize, usize)> {
        let mut shadowed = Vec::new();
        for (j, later) in self.entries.iter().enumerate() {
            let literal = later.template.replace(['{', '}'], "");
            if let Some(i) = self.entries[..j].iter().position(|earlier| {
                earlier.verb.overlaps(&later.verb) && earlier.matcher.is_match(&literal)
            }) {
                shadowed.push((i, j));
            }
        }
        shadowed
    }

    /// Log every registration at info level, in match order.
    pub fn dump_routes(&self) {
        info!(
            base_path = %self.base_path,
            count = self.entries.len(),
            "Registered routes"
        );
        for (index, entry) in self.entries.iter().enumerate() {
            info!(
                index,
                verb = %entry.verb,
                template = %entry.template,
                handler_name = %entry.handler.name(),
                roles = ?entry.access.required_roles(),
                "Route"
            );
        }
    }
}

/// Compile a `{name}` template to an anchored regex plus its variable names.
///
/// Each `{name}` becomes one capture group matching a single non-empty path
/// segment; all other text is matched literally.
pub(crate) fn path_to_regex(template: &str) -> Result<(Regex, Vec<Arc<str>>), regex::Error> {
    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');
    let mut names: Vec<Arc<str>> = Vec::with_capacity(template.matches('{').count());

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                pattern.push_str(&regex::escape(&rest[..open]));
                pattern.push_str("([^/]+)");
                names.push(Arc::from(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                pattern.push_str(&regex::escape(&rest[..=open]));
                rest = after;
            }
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Ok((Regex::new(&pattern)?, names))
}
