use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DistributionError, DistributionResult};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("oci-distribution/", env!("CARGO_PKG_VERSION"));

static HTTP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[a-zA-Z0-9$\-_@.&+!*(),]|%[0-9a-fA-F]{2})+")
        .expect("http address regex is valid")
});

/// Settings for a registry [`Client`](crate::Client).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Registry base address, `http://` or `https://`.
    pub address: String,
    /// Repository name used when a request does not name one.
    pub default_name: Option<String>,
    pub user_agent: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Overrides the scope offered by the authorization server.
    pub auth_scope: Option<String>,
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            default_name: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            username: None,
            password: None,
            auth_scope: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_username_password(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_default_name(mut self, name: &str) -> Self {
        self.default_name = Some(name.to_string());
        self
    }

    pub fn with_auth_scope(mut self, scope: &str) -> Self {
        self.auth_scope = Some(scope.to_string());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check required settings and the address format.
    pub fn validate(&self) -> DistributionResult<()> {
        if self.address.is_empty() {
            return Err(DistributionError::InvalidConfig("address is required".into()));
        }
        if self.user_agent.is_empty() {
            return Err(DistributionError::InvalidConfig("user agent is required".into()));
        }
        if !HTTP_ADDRESS.is_match(&self.address) {
            return Err(DistributionError::InvalidAddress(self.address.clone()));
        }
        Ok(())
    }
}
