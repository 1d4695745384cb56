use std::sync::{Arc, LazyLock};

use oci_digest::AlgorithmRegistry;
use regex::Regex;
use url::Url;

use crate::auth::{AuthChallenge, AuthScheme};
use crate::config::ClientConfig;
use crate::error::{DistributionError, DistributionResult};
use crate::request::{Method, Request, RequestOptions};
use crate::response::Response;

static UNFILLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<name>|<reference>|<digest>|<session_id>").expect("placeholder regex is valid")
});

/// Builds requests against one registry.
///
/// The client prepares [`Request`] values and interprets [`Response`] values;
/// it performs no I/O.
#[derive(Clone, Debug)]
pub struct Client {
    config: ClientConfig,
    base: Url,
    registry: Option<Arc<AlgorithmRegistry>>,
}

impl Client {
    pub fn new(config: ClientConfig) -> DistributionResult<Self> {
        config.validate()?;
        let base = Url::parse(&config.address)
            .map_err(|_| DistributionError::InvalidAddress(config.address.clone()))?;
        Ok(Self {
            config,
            base,
            registry: None,
        })
    }

    /// Parse request digests against `registry` instead of the standard one.
    pub fn with_registry(mut self, registry: Arc<AlgorithmRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        self.registry.as_deref().unwrap_or(AlgorithmRegistry::standard())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_default_name(&mut self, name: &str) {
        self.config.default_name = Some(name.to_string());
    }

    /// Prepare a request for a path template such as
    /// `/v2/<name>/blobs/<digest>`.
    ///
    /// The digest option must parse as a digest supported by the client's
    /// registry. Any placeholder
    /// left unfilled, or an empty path segment, rejects the request.
    pub fn new_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> DistributionResult<Request> {
        let digest = options
            .digest
            .as_deref()
            .map(|d| self.registry().parse(d))
            .transpose()?
            .map(String::from);
        let name = options.name.or_else(|| self.config.default_name.clone());

        let mut resolved = path.to_string();
        for (placeholder, value) in [
            ("<name>", name),
            ("<reference>", options.reference),
            ("<digest>", digest),
            ("<session_id>", options.session_id),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                resolved = resolved.replace(placeholder, &value);
            }
        }

        if let Some(m) = UNFILLED.find(&resolved) {
            return Err(DistributionError::InvalidPath {
                path: resolved.clone(),
                reason: format!("{} was not provided", m.as_str()),
            });
        }
        if resolved.contains("//") {
            return Err(DistributionError::InvalidPath {
                path: resolved,
                reason: "empty path segment".to_string(),
            });
        }

        let url = self
            .base
            .join(&resolved)
            .map_err(|e| DistributionError::InvalidPath {
                path: resolved.clone(),
                reason: e.to_string(),
            })?;
        if self.config.debug {
            tracing::info!(%method, %url, "prepared registry request");
        } else {
            tracing::debug!(%method, %url, "prepared registry request");
        }
        Ok(Request::new(method, url).set_header("User-Agent", &self.config.user_agent))
    }

    /// The token request answering a bearer challenge.
    ///
    /// A configured auth scope takes precedence over the challenge's scope.
    pub fn auth_request(&self, challenge: &AuthChallenge) -> DistributionResult<Request> {
        let Some(realm) = challenge.realm.as_deref() else {
            return Err(DistributionError::MalformedChallenge("challenge has no realm".into()));
        };
        if challenge.scheme != AuthScheme::Bearer {
            return Err(DistributionError::MalformedChallenge(format!(
                "{} challenges take no token request",
                challenge.scheme
            )));
        }
        let url = Url::parse(realm)
            .map_err(|_| DistributionError::MalformedChallenge(format!("invalid realm {realm}")))?;
        let mut req = Request::new(Method::Get, url)
            .set_header("Accept", "application/json")
            .set_header("User-Agent", &self.config.user_agent);
        if let Some(service) = challenge.service.as_deref() {
            req = req.set_query_param("service", service);
        }
        if let Some(scope) = self.config.auth_scope.as_deref().or(challenge.scope.as_deref()) {
            req = req.set_query_param("scope", scope);
        }
        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            req = req.set_basic_auth(user, pass);
        }
        Ok(req)
    }

    /// Extract the token from a token endpoint response body.
    pub fn token_from(response: &Response) -> Option<String> {
        let body: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
        body.get("token")
            .or_else(|| body.get("access_token"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Attach credentials answering `challenge` to a request being retried.
    ///
    /// Bearer challenges need the token obtained through
    /// [`auth_request`](Self::auth_request); basic challenges use the
    /// configured username and password.
    pub fn authorize(
        &self,
        request: Request,
        challenge: &AuthChallenge,
        token: Option<&str>,
    ) -> DistributionResult<Request> {
        match (challenge.scheme, token) {
            (AuthScheme::Bearer, Some(token)) => Ok(request.set_auth_token(token)),
            (AuthScheme::Bearer, None) => Err(DistributionError::InvalidConfig(
                "bearer challenge answered without a token".into(),
            )),
            (AuthScheme::Basic, _) => match (&self.config.username, &self.config.password) {
                (Some(user), Some(pass)) => Ok(request.set_basic_auth(user, pass)),
                _ => Err(DistributionError::InvalidConfig(
                    "basic challenge needs a username and password".into(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use oci_digest::DigestError;

    use super::*;

    const ADDRESS: &str = "http://localhost:5000";

    fn client() -> Client {
        Client::new(
            ClientConfig::new(ADDRESS)
                .with_username_password("testuser", "testpass")
                .with_default_name("testname")
                .with_user_agent("reggie-tests"),
        )
        .unwrap()
    }

    #[test]
    fn default_name_fills_template() {
        let req = client()
            .new_request(Method::Get, "/v2/<name>/tags/list", RequestOptions::new())
            .unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:5000/v2/testname/tags/list");
        assert_eq!(req.header("User-Agent"), Some("reggie-tests"));
    }

    #[test]
    fn runtime_and_per_request_names() {
        let mut c = client();
        c.set_default_name("othername");
        let req = c
            .new_request(Method::Get, "/v2/<name>/tags/list", RequestOptions::new())
            .unwrap();
        assert!(req.url().path().contains("othername"));
        let req = c
            .new_request(
                Method::Get,
                "/v2/<name>/tags/list",
                RequestOptions::new().name("customname"),
            )
            .unwrap();
        assert_eq!(req.url().path(), "/v2/customname/tags/list");
    }

    #[test]
    fn reference_digest_and_session() {
        let c = client();
        let req = c
            .new_request(
                Method::Head,
                "/v2/<name>/manifests/<reference>",
                RequestOptions::new().reference("silly"),
            )
            .unwrap();
        assert!(req.url().as_str().ends_with("silly"));

        let digest = "sha256:6f4e69a5ff18d92e7315e3ee31c62165ebf25bfa05cad05c0d09d8f412dae401";
        let req = c
            .new_request(Method::Get, "/v2/<name>/blobs/<digest>", RequestOptions::new().digest(digest))
            .unwrap();
        assert!(req.url().as_str().ends_with(digest));

        let session = "f0ca5d12-5557-4747-9c21-3d916f2fc885";
        let req = c
            .new_request(
                Method::Get,
                "/v2/<name>/blobs/uploads/<session_id>",
                RequestOptions::new().session_id(session),
            )
            .unwrap();
        assert!(req.url().as_str().ends_with(session));
    }

    #[test]
    fn invalid_digests_rejected_before_substitution() {
        let c = client();
        let bare = "6f4e69a5ff18d92e7315e3ee31c62165ebf25bfa05cad05c0d09d8f412dae401";
        let err = c
            .new_request(Method::Get, "/v2/<name>/blobs/<digest>", RequestOptions::new().digest(bare))
            .unwrap_err();
        assert_eq!(err, DistributionError::Digest(DigestError::InvalidFormat));

        let err = c
            .new_request(
                Method::Get,
                "/v2/<name>/blobs/<digest>",
                RequestOptions::new().digest("md5:d41d8cd98f00b204e9800998ecf8427e"),
            )
            .unwrap_err();
        assert!(matches!(err, DistributionError::Digest(ref e) if e.is_unsupported()));
    }

    #[test]
    fn restricted_registry_applies_to_digests() {
        let config = oci_digest::RegistryConfig {
            algorithms: vec![oci_digest::Algorithm::Sha256],
            canonical: oci_digest::Algorithm::Sha256,
        };
        let registry = Arc::new(AlgorithmRegistry::from_config(&config).unwrap());
        let sha512 = oci_digest::Algorithm::Sha512.from_bytes(b"blob");
        let opts = RequestOptions::new().digest(&sha512);
        assert!(client()
            .new_request(Method::Get, "/v2/<name>/blobs/<digest>", opts.clone())
            .is_ok());

        let c = client().with_registry(registry);
        let err = c
            .new_request(Method::Get, "/v2/<name>/blobs/<digest>", opts)
            .unwrap_err();
        assert!(matches!(err, DistributionError::Digest(ref e) if e.is_unsupported()));
        assert!(c
            .new_request(
                Method::Get,
                "/v2/<name>/blobs/<digest>",
                RequestOptions::new().digest(oci_digest::from_bytes(b"blob")),
            )
            .is_ok());
    }

    #[test]
    fn unfilled_placeholders_rejected() {
        let c = client();
        for path in [
            "/v2/<name>/manifests/<reference>",
            "/v2/<name>/blobs/<digest>",
            "/v2/<name>/blobs/uploads/<session_id>",
        ] {
            let err = c.new_request(Method::Get, path, RequestOptions::new()).unwrap_err();
            assert!(matches!(err, DistributionError::InvalidPath { .. }), "{path}");
        }
        let nameless = Client::new(ClientConfig::new(ADDRESS)).unwrap();
        assert!(nameless
            .new_request(Method::Get, "/v2/<name>/tags/list", RequestOptions::new())
            .is_err());
        assert!(c
            .new_request(Method::Get, "/v2//tags/list", RequestOptions::new())
            .is_err());
    }

    #[test]
    fn bad_address() {
        assert!(matches!(
            Client::new(ClientConfig::new("xwejknxw://jshnws")),
            Err(DistributionError::InvalidAddress(_))
        ));
    }

    #[test]
    fn headers_survive_auth() {
        let c = client();
        let req = c
            .new_request(Method::Put, "/a/b/c", RequestOptions::new())
            .unwrap()
            .set_header("Content-Length", "3")
            .set_header("Content-Range", "0-2")
            .set_header("Content-Type", "application/octet-stream")
            .set_query_param("digest", "xyz")
            .set_body(b"abc".to_vec());
        let challenge = AuthChallenge::parse(r#"Basic realm="registry""#).unwrap();
        let req = c.authorize(req, &challenge, None).unwrap();
        assert_eq!(req.headers().len(), 5);
        for name in ["Content-Length", "Content-Range", "Content-Type", "Authorization", "User-Agent"] {
            assert!(req.header(name).is_some(), "{name}");
        }
        assert_eq!(req.body(), Some(&b"abc"[..]));
    }

    #[test]
    fn bearer_token_flow() {
        let c = client();
        let challenge = AuthChallenge::parse(
            r#"Bearer realm="http://localhost:5000/token",service="registry",scope="repository:testname:pull""#,
        )
        .unwrap();
        let token_req = c.auth_request(&challenge).unwrap();
        assert_eq!(token_req.method(), Method::Get);
        assert_eq!(token_req.url().path(), "/token");
        assert_eq!(token_req.query_param("service").as_deref(), Some("registry"));
        assert_eq!(token_req.query_param("scope").as_deref(), Some("repository:testname:pull"));
        assert!(token_req.header("Authorization").unwrap().starts_with("Basic "));

        let token_resp = Response::new(200).with_body(r#"{"access_token": "abc123"}"#);
        let token = Client::token_from(&token_resp).unwrap();
        let original = c
            .new_request(Method::Get, "/v2/<name>/tags/list", RequestOptions::new())
            .unwrap();
        let retried = c.authorize(original, &challenge, Some(&token)).unwrap();
        assert_eq!(retried.header("Authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn configured_scope_wins() {
        let c = Client::new(ClientConfig::new(ADDRESS).with_auth_scope("repository:x:push")).unwrap();
        let challenge =
            AuthChallenge::parse(r#"Bearer realm="http://auth.local/token",scope="repository:x:pull""#)
                .unwrap();
        let req = c.auth_request(&challenge).unwrap();
        assert_eq!(req.query_param("scope").as_deref(), Some("repository:x:push"));
        assert!(req.header("Authorization").is_none());
    }

    #[test]
    fn token_field_preferred() {
        let r = Response::new(200).with_body(r#"{"token": "t1", "access_token": "t2"}"#);
        assert_eq!(Client::token_from(&r).as_deref(), Some("t1"));
        assert_eq!(Client::token_from(&Response::new(200).with_body("{}")), None);
    }
}
