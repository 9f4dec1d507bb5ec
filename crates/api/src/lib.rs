//! Rekt HTTP transport.
//!
//! This crate owns the boundary to the HTTP stack. It provides:
//!
//! - [`ClientOptions`]: transport options supplied once when a client is
//!   created (certificates, TLS verification, timeout, default headers) plus
//!   the size of the client's worker pool
//! - [`RektHttpClient`]: a thin wrapper around a configured `reqwest::Client`
//!   that applies those options to every request it builds
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rekt_api::{ClientOptions, RektHttpClient};
//!
//! let options = ClientOptions::default().with_verify(false);
//! let client = RektHttpClient::new(Arc::new(options))?;
//! let request = client.request(reqwest::Method::GET, "https://example.com/items");
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use reqwest::{
    Certificate, Client, Identity, Method, RequestBuilder,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Worker pool size used when none is configured.
pub const DEFAULT_WORKER_THREADS: usize = 6;

/// TLS server verification policy.
///
/// Deserializes from either a boolean or a path to a PEM CA bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Verify {
    /// `true` verifies against the built-in roots, `false` disables verification.
    Enabled(bool),
    /// Verify against the built-in roots plus the certificates in this bundle.
    CaBundle(PathBuf),
}

impl Default for Verify {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

/// Encoding of arguments placed in a request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`.
    #[default]
    Form,
    /// `application/json` object.
    Json,
}

/// Options fixed at client construction and forwarded to every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// PEM client certificate. May also hold the private key.
    pub cert: Option<PathBuf>,
    /// PEM private key, when kept separately from `cert`.
    pub key: Option<PathBuf>,
    pub verify: Verify,
    /// Whole-request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Headers added to every request.
    pub headers: IndexMap<String, String>,
    pub body_encoding: BodyEncoding,
    /// Number of workers running asynchronous operations.
    pub worker_threads: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cert: None,
            key: None,
            verify: Verify::default(),
            timeout_secs: None,
            user_agent: None,
            headers: IndexMap::new(),
            body_encoding: BodyEncoding::default(),
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl ClientOptions {
    pub fn with_cert(mut self, cert: impl Into<PathBuf>) -> Self {
        self.cert = Some(cert.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<PathBuf>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Verify::Enabled(verify);
        self
    }

    pub fn with_ca_bundle(mut self, bundle: impl Into<PathBuf>) -> Self {
        self.verify = Verify::CaBundle(bundle.into());
        self
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.body_encoding = encoding;
        self
    }

    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }

    /// Effective pool size; never below one.
    pub fn pool_size(&self) -> usize {
        self.worker_threads.max(1)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client`.
///
/// Cloning is cheap; clones share the connection pool and the options.
pub struct RektHttpClient {
    pub http: Client,
    pub user_agent: String,
    options: Arc<ClientOptions>,
}

impl RektHttpClient {
    /// Construct a client applying `options`.
    ///
    /// Certificate files are read eagerly so that a bad path fails here
    /// instead of on the first call.
    pub fn new(options: Arc<ClientOptions>) -> Result<Self> {
        let mut builder = Client::builder().default_headers(build_default_headers(&options.headers)?);

        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }

        match &options.verify {
            Verify::Enabled(true) => {}
            Verify::Enabled(false) => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            Verify::CaBundle(path) => {
                let pem = read_pem(path, "CA bundle")?;
                let certificate = Certificate::from_pem(&pem).context("parse CA bundle")?;
                builder = builder.add_root_certificate(certificate);
            }
        }

        if let Some(identity) = build_identity(options.cert.as_deref(), options.key.as_deref())? {
            builder = builder.identity(identity);
        }

        let http = builder.build().context("build http client")?;
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("rekt/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS));

        Ok(Self {
            http,
            user_agent,
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Build a `reqwest::RequestBuilder` for a method and absolute URL.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, %url, "building request");
        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

fn build_default_headers(headers: &IndexMap<String, String>) -> Result<HeaderMap> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).with_context(|| format!("invalid header name '{}'", name))?;
        let header_value = HeaderValue::from_str(value).with_context(|| format!("invalid value for header '{}'", name))?;
        default_headers.insert(header_name, header_value);
    }
    Ok(default_headers)
}

/// Load the client identity from a certificate and an optional separate key.
fn build_identity(cert: Option<&Path>, key: Option<&Path>) -> Result<Option<Identity>> {
    let Some(cert) = cert else {
        return Ok(None);
    };
    let mut pem = read_pem(cert, "client certificate")?;
    if let Some(key) = key {
        pem.push(b'\n');
        pem.extend(read_pem(key, "client key")?);
    }
    let identity = Identity::from_pem(&pem).context("parse client certificate")?;
    Ok(Some(identity))
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {} {}", what, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ClientOptions = serde_json::from_str("{}").expect("empty options");
        assert_eq!(options, ClientOptions::default());
        assert_eq!(options.pool_size(), DEFAULT_WORKER_THREADS);
        assert_eq!(options.verify, Verify::Enabled(true));
        assert_eq!(options.body_encoding, BodyEncoding::Form);
    }

    #[test]
    fn verify_accepts_flag_or_bundle_path() {
        let options: ClientOptions =
            serde_json::from_str(r#"{"verify": false, "body_encoding": "json", "worker_threads": 0}"#).expect("options");
        assert_eq!(options.verify, Verify::Enabled(false));
        assert_eq!(options.body_encoding, BodyEncoding::Json);
        assert_eq!(options.pool_size(), 1, "pool size is clamped to one worker");

        let options: ClientOptions = serde_json::from_str(r#"{"verify": "/etc/ssl/bundle.pem"}"#).expect("options");
        assert_eq!(options.verify, Verify::CaBundle(PathBuf::from("/etc/ssl/bundle.pem")));
    }

    #[test]
    fn builds_client_with_custom_user_agent() {
        let options = ClientOptions {
            user_agent: Some("places-demo/1.0".into()),
            ..ClientOptions::default()
        }
        .with_verify(false)
        .with_timeout_secs(5)
        .with_header("x-trace", "on");
        let client = RektHttpClient::new(Arc::new(options)).expect("build client");
        assert_eq!(client.user_agent, "places-demo/1.0");
        assert_eq!(client.options().timeout(), Some(Duration::from_secs(5)));

        let request = client
            .request(Method::GET, "https://example.com/items")
            .build()
            .expect("build request");
        assert_eq!(
            request.headers().get(header::USER_AGENT).and_then(|value| value.to_str().ok()),
            Some("places-demo/1.0")
        );
    }

    #[test]
    fn rejects_invalid_header_names() {
        let options = ClientOptions::default().with_header("bad header", "x");
        let error = RektHttpClient::new(Arc::new(options)).expect_err("invalid header");
        assert!(error.to_string().contains("invalid header name"), "got {error}");
    }

    #[test]
    fn missing_certificate_fails_at_construction() {
        let options = ClientOptions::default().with_cert("/definitely/not/a/cert.pem");
        let error = RektHttpClient::new(Arc::new(options)).expect_err("missing cert");
        assert!(error.to_string().contains("client certificate"), "got {error}");
    }

    #[test]
    fn garbage_certificate_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cert = dir.path().join("cert.pem");
        fs::write(&cert, "not a certificate").expect("write cert");
        let options = ClientOptions::default().with_cert(&cert);
        assert!(RektHttpClient::new(Arc::new(options)).is_err());
    }
}
