use oci_struct::Document;

use crate::auth::AuthChallenge;
use crate::documents::ErrorResponse;
use crate::error::DistributionResult;

/// A registry response as received by whatever transport sent the request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// The `Location` header as sent.
    pub fn absolute_location(&self) -> Option<&str> {
        self.header("Location")
    }

    /// The path component of the `Location` header.
    pub fn relative_location(&self) -> Option<String> {
        let location = self.header("Location")?;
        if location.starts_with("http") {
            let path: Vec<&str> = location.split('/').skip(3).collect();
            Some(format!("/{}", path.join("/")))
        } else {
            Some(location.to_string())
        }
    }

    /// Registry errors carried in the body, if it holds an error document.
    pub fn errors(&self) -> Option<ErrorResponse> {
        let text = std::str::from_utf8(&self.body).ok()?;
        match ErrorResponse::from_json(text) {
            Ok(errors) => Some(errors),
            Err(err) => {
                tracing::debug!(error = %err, "response body is not an error document");
                None
            }
        }
    }

    /// The authentication challenge of a 401 response.
    pub fn auth_challenge(&self) -> Option<DistributionResult<AuthChallenge>> {
        if !self.is_unauthorized() {
            return None;
        }
        self.header("WWW-Authenticate").map(AuthChallenge::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScheme;

    #[test]
    fn locations() {
        let r = Response::new(202).with_header("Location", "http://localhost:5000/v2/foo/blobs/uploads/abc");
        assert_eq!(r.relative_location().as_deref(), Some("/v2/foo/blobs/uploads/abc"));
        assert_eq!(r.absolute_location(), Some("http://localhost:5000/v2/foo/blobs/uploads/abc"));

        let r = Response::new(202).with_header("location", "/v2/foo/blobs/uploads/abc");
        assert_eq!(r.relative_location().as_deref(), Some("/v2/foo/blobs/uploads/abc"));
        assert_eq!(Response::new(200).relative_location(), None);
    }

    #[test]
    fn error_bodies() {
        let r = Response::new(404).with_body(
            r#"{"errors":[{"code":"NAME_UNKNOWN","message":"repository name not known","detail":"witherrors"}]}"#,
        );
        let errors = r.errors().unwrap().errors();
        assert_eq!(errors[0].code(), "NAME_UNKNOWN");
        assert!(Response::new(200).with_body("{}").errors().is_none());
        assert!(Response::new(500).with_body("oops").errors().is_none());
    }

    #[test]
    fn challenges_only_on_401() {
        let r = Response::new(401).with_header("Www-Authenticate", r#"Basic realm="r""#);
        assert_eq!(r.auth_challenge().unwrap().unwrap().scheme, AuthScheme::Basic);
        assert!(Response::new(200)
            .with_header("Www-Authenticate", r#"Basic realm="r""#)
            .auth_challenge()
            .is_none());
        assert!(Response::new(401).auth_challenge().is_none());
    }
}
