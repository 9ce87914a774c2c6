//! AWS Signature Version 4 request signing.
//!
//! Only what the client needs: a canonical request over a fixed header set,
//! the derived signing key, and the `Authorization` header value. Verified
//! against the published SigV4 test vector in `tests/sign_spec.rs`.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Debug, Error)]
pub enum SignError {
    #[error("failed to initialize signing key")]
    InvalidKey,
}

/// The request parts that participate in the signature.
///
/// Header names must already be lowercase; the query string must already be
/// canonical (sorted, percent-encoded).
#[derive(Debug)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

impl CanonicalRequest<'_> {
    /// The canonical request string that gets hashed into the signature.
    pub fn canonical_string(&self) -> String {
        let mut headers: Vec<(&str, &str)> = self.headers.to_vec();
        headers.sort_by_key(|(name, _)| *name);

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            self.query,
            canonical_headers,
            self.signed_headers(),
            sha256_hex(self.payload)
        )
    }

    /// Semicolon-joined sorted header names, as they appear in the
    /// `Authorization` header.
    pub fn signed_headers(&self) -> String {
        let mut names: Vec<&str> = self.headers.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.join(";")
    }
}

/// Produce the `Authorization` header value for a request.
pub fn authorization(
    request: &CanonicalRequest<'_>,
    access_key_id: &str,
    secret_access_key: &str,
    region: &str,
    service: &str,
    timestamp: &DateTime<Utc>,
) -> Result<String, SignError> {
    let date = datestamp(timestamp);
    let scope = format!("{}/{}/{}/aws4_request", date, region, service);

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date(timestamp),
        scope,
        sha256_hex(request.canonical_string().as_bytes())
    );

    let key = signing_key(secret_access_key, &date, region, service)?;
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        access_key_id,
        scope,
        request.signed_headers(),
        signature
    ))
}

/// `x-amz-date` header value: `20150830T123600Z`.
pub fn amz_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

fn datestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d").to_string()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Derive the per-day signing key: HMAC chain over date, region, service.
fn signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SignError> {
    let seed = format!("AWS4{}", secret_access_key);
    let k_date = hmac(seed.as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SignError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| SignError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
