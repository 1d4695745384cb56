use std::fmt;
use std::str::FromStr;

use base64::Engine;
use url::Url;

use crate::error::{DistributionError, DistributionResult};

/// HTTP methods a registry request may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HEAD" => Ok(Self::Head),
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            other => Err(DistributionError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Per-request values substituted into a path template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub name: Option<String>,
    pub reference: Option<String>,
    /// Checked as a digest before substitution.
    pub digest: Option<String>,
    pub session_id: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn digest(mut self, digest: impl fmt::Display) -> Self {
        self.digest = Some(digest.to_string());
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }
}

/// A prepared registry request. Sending it is the caller's business.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query parameter lookup.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Set a header, replacing any header of the same name.
    pub fn set_header(mut self, name: &str, value: &str) -> Self {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// Set a query parameter, replacing any previous value.
    pub fn set_query_param(mut self, name: &str, value: &str) -> Self {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != name)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        {
            let mut pairs = self.url.query_pairs_mut();
            pairs.clear();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(name, value);
        }
        self
    }

    pub fn clear_query(&mut self) {
        self.url.set_query(None);
    }

    pub fn set_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `Authorization: Basic` with base64 of `username:password`.
    pub fn set_basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        self.set_header("Authorization", &format!("Basic {encoded}"))
    }

    /// `Authorization: Bearer`.
    pub fn set_auth_token(self, token: &str) -> Self {
        self.set_header("Authorization", &format!("Bearer {token}"))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(Method::Put, Url::parse("http://localhost:5000/a/b/c").unwrap())
    }

    #[test]
    fn methods_parse() {
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert!(matches!(
            "TRACE".parse::<Method>(),
            Err(DistributionError::UnsupportedMethod(_))
        ));
        assert_eq!(Method::Head.to_string(), "HEAD");
    }

    #[test]
    fn headers_and_body() {
        let req = request()
            .set_header("Content-Length", "3")
            .set_header("Content-Range", "0-2")
            .set_header("Content-Type", "application/octet-stream")
            .set_header("content-type", "text/plain")
            .set_body(b"abc".to_vec());
        assert_eq!(req.headers().len(), 3);
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.body(), Some(&b"abc"[..]));
    }

    #[test]
    fn query_params_replace() {
        let req = request()
            .set_query_param("digest", "xyz")
            .set_query_param("scope", "repository:foo:pull,push")
            .set_query_param("digest", "abc");
        assert_eq!(req.query_param("digest").as_deref(), Some("abc"));
        assert_eq!(req.query_param("scope").as_deref(), Some("repository:foo:pull,push"));
        let mut req = req;
        req.clear_query();
        assert!(req.url().query().is_none());
    }

    #[test]
    fn auth_headers() {
        let req = request().set_basic_auth("testuser", "testpass");
        assert_eq!(req.header("Authorization"), Some("Basic dGVzdHVzZXI6dGVzdHBhc3M="));
        let req = req.set_auth_token("abc123");
        assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
        assert_eq!(req.headers().len(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(request().to_string(), "[PUT] http://localhost:5000/a/b/c");
    }
}
