use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DistributionError, DistributionResult};

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(bearer|basic)\b").expect("auth scheme regex is valid"));

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z]+)="(.+?)""#).expect("auth param regex is valid"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer => f.write_str("Bearer"),
            Self::Basic => f.write_str("Basic"),
        }
    }
}

/// A parsed `WWW-Authenticate` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChallenge {
    pub scheme: AuthScheme,
    pub realm: Option<String>,
    pub service: Option<String>,
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parse a header such as
    /// `Bearer realm="https://auth.example.com/token",service="registry",scope="repository:foo:pull"`.
    pub fn parse(header: &str) -> DistributionResult<Self> {
        let scheme = match SCHEME.captures(header) {
            Some(caps) if caps[1].eq_ignore_ascii_case("bearer") => AuthScheme::Bearer,
            Some(_) => AuthScheme::Basic,
            None => return Err(DistributionError::MalformedChallenge(header.to_string())),
        };
        let mut challenge = Self {
            scheme,
            realm: None,
            service: None,
            scope: None,
        };
        for caps in PARAM.captures_iter(header) {
            let value = Some(caps[2].to_string());
            match &caps[1] {
                "realm" => challenge.realm = value,
                "service" => challenge.service = value,
                "scope" => challenge.scope = value,
                _ => {}
            }
        }
        if challenge.scheme == AuthScheme::Bearer && challenge.realm.is_none() {
            return Err(DistributionError::MalformedChallenge(header.to_string()));
        }
        Ok(challenge)
    }
}
