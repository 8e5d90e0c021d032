//! Request signing.
//!
//! The remote service authenticates the connection upgrade through the query
//! string. The signed text is three newline-joined lines:
//!
//! ```text
//! host: {host}
//! date: {timestamp}
//! {METHOD} {path} HTTP/1.1
//! ```
//!
//! The HMAC-SHA256 digest of that text is base64-encoded, embedded in an
//! authorization descriptor, and the descriptor is base64-encoded a second
//! time. Both encoding passes are part of the wire contract.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use config::Credentials;
use errors::DialogueError;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "hmac-sha256";
pub const SIGNED_HEADERS: &str = "host date request-line";
pub const HTTP_VERSION: &str = "HTTP/1.1";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formats a timestamp as an RFC 1123 HTTP-date.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// The fields covered by one signature. Built fresh for every connection
/// attempt and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub host: String,
    pub path: String,
    pub method: String,
    pub http_version: &'static str,
    pub timestamp: String,
    pub algorithm: &'static str
}

impl SigningContext {
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
        timestamp: impl Into<String>
    ) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            method: method.into().to_uppercase(),
            http_version: HTTP_VERSION,
            timestamp: timestamp.into(),
            algorithm: ALGORITHM
        }
    }

    /// A context stamped with the current time.
    pub fn now(host: impl Into<String>, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(host, path, method, http_date(Utc::now()))
    }

    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.http_version)
    }

    pub fn canonical_string(&self) -> String {
        format!(
            "host: {}\ndate: {}\n{}",
            self.host,
            self.timestamp,
            self.request_line()
        )
    }
}

/// Output of [`sign`]: the transport-ready authorization value plus the
/// timestamp it was computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization {
    /// base64 of the descriptor (which itself embeds a base64 signature)
    pub authorization: String,
    pub timestamp: String,
    /// base64 HMAC digest, kept for diagnostics
    pub signature: String
}

/// Signs `context` with the shared secret in `credentials`.
///
/// Pure: no clock, network or state access. Fails only when the secret is
/// blank, which is reported as a configuration error.
pub fn sign(credentials: &Credentials, context: &SigningContext) -> Result<SignedAuthorization, DialogueError> {
    let secret = credentials.api_secret();
    if secret.is_empty() {
        return Err(DialogueError::configuration("signing secret is empty"));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DialogueError::configuration(format!("invalid signing secret: {e}")))?;
    mac.update(context.canonical_string().as_bytes());
    let digest = mac.finalize().into_bytes();
    let signature = general_purpose::STANDARD.encode(&digest[..]);

    let descriptor = format!(
        "api_key=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
        credentials.api_key(),
        context.algorithm,
        SIGNED_HEADERS,
        signature
    );

    Ok(SignedAuthorization {
        authorization: general_purpose::STANDARD.encode(descriptor.as_bytes()),
        timestamp: context.timestamp.clone(),
        signature
    })
}

/// A signed URL for exactly one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    url: Url,
    timestamp: String
}

impl ConnectionEndpoint {
    /// Builds `{scheme}://{host}{path}?authorization=..&date=..&host=..`.
    pub fn build(
        scheme: &str,
        context: &SigningContext,
        authorization: &SignedAuthorization
    ) -> Result<Self, DialogueError> {
        let base = format!("{}://{}{}", scheme, context.host, context.path);
        let mut url = Url::parse(&base)
            .map_err(|e| DialogueError::configuration(format!("invalid endpoint '{base}': {e}")))?;

        url.query_pairs_mut()
            .append_pair("authorization", &authorization.authorization)
            .append_pair("date", &authorization.timestamp)
            .append_pair("host", &context.host);

        Ok(Self {
            url,
            timestamp: authorization.timestamp.clone()
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The URL with the authorization value masked, for logging.
    pub fn redacted(&self) -> String {
        format!(
            "{}://{}{}?authorization=***&date={}",
            self.url.scheme(),
            self.url.host_str().unwrap_or_default(),
            self.url.path(),
            self.timestamp
        )
    }
}

/// Signs a fresh context and returns the endpoint for one attempt.
pub fn signed_endpoint(
    credentials: &Credentials,
    scheme: &str,
    context: &SigningContext
) -> Result<ConnectionEndpoint, DialogueError> {
    let authorization = sign(credentials, context)?;
    ConnectionEndpoint::build(scheme, context, &authorization)
}
