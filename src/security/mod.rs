//! # Security Module
//!
//! Role-based access checks for routes.
//!
//! A route may carry an [`AccessRule`]: a set of allowed roles and the session
//! key holding the client's role (`"profile"` unless configured otherwise).
//! The rule is evaluated before any argument is resolved, against a
//! [`SessionReader`] that can read the client's session without creating one.
//!
//! ## Decision
//!
//! - No required roles: always [`AccessDecision::Allowed`]
//! - Session value equal (as a string) to one of the roles: allowed
//! - Missing session, missing key, or any other value: [`AccessDecision::Denied`],
//!   carrying the required roles so the forbidden response can list them
//!
//! ```rust
//! use frontdispatch::security::{AccessDecision, AccessRule};
//! use serde_json::{json, Map, Value};
//!
//! let rule = AccessRule::roles(["admin"]);
//! let mut session = Map::new();
//! session.insert("profile".to_string(), json!("user"));
//! assert!(!rule.authorize(&session).is_allowed());
//! session.insert("profile".to_string(), json!("admin"));
//! assert_eq!(rule.authorize(&session), AccessDecision::Allowed);
//! assert!(!rule.authorize(&None::<Map<String, Value>>).is_allowed());
//! ```

use serde_json::{Map, Value};
use tracing::debug;

/// Session key read by rules that do not name one.
pub const DEFAULT_SESSION_KEY: &str = "profile";

/// Read-only access to the attributes of one client's session.
pub trait SessionReader {
    /// Current value of `key`, or `None` when there is no session or no such key.
    fn read(&self, key: &str) -> Option<Value>;
}

impl SessionReader for Map<String, Value> {
    fn read(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl<R: SessionReader> SessionReader for Option<R> {
    fn read(&self, key: &str) -> Option<Value> {
        self.as_ref().and_then(|r| r.read(key))
    }
}

impl<R: SessionReader + ?Sized> SessionReader for &R {
    fn read(&self, key: &str) -> Option<Value> {
        (**self).read(key)
    }
}

/// Outcome of a role check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied { required: Vec<String> },
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Roles allowed on a route and the session key holding the client's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    roles: Vec<String>,
    session_key: String,
}

impl Default for AccessRule {
    fn default() -> Self {
        Self::open()
    }
}

impl AccessRule {
    /// A rule without role requirement.
    #[must_use]
    pub fn open() -> Self {
        Self {
            roles: Vec::new(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }

    /// Require one of `roles`, read from the default session key.
    #[must_use]
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    #[must_use]
    pub fn required_roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.roles.is_empty()
    }

    /// Check the client's role against this rule.
    pub fn authorize<R: SessionReader + ?Sized>(&self, session: &R) -> AccessDecision {
        if self.is_open() {
            return AccessDecision::Allowed;
        }
        let role = session.read(&self.session_key).map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        });
        match role {
            Some(role) if self.roles.iter().any(|r| *r == role) => AccessDecision::Allowed,
            role => {
                debug!(
                    session_key = %self.session_key,
                    role = ?role,
                    required = ?self.roles,
                    "Role check failed"
                );
                AccessDecision::Denied {
                    required: self.roles.clone(),
                }
            }
        }
    }
}
