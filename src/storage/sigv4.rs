//! AWS Signature Version 4 request signing
//!
//! Only what the S3 backend needs: header-based signing of single requests with an
//! empty query string. Callers pass an already URI-encoded path (see [`uri_encode`]).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Static AWS credentials
#[derive(Clone)]
pub struct Credentials {
  pub access_key_id: String,
  pub secret_access_key: String,
  pub session_token: Option<String>,
}

/// The parts of an HTTP request covered by the signature
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
  pub method: &'a str,
  /// Host header value, including a non-default port
  pub host: &'a str,
  /// URI-encoded absolute path
  pub path: &'a str,
  /// Additional headers to sign, e.g. `content-type`
  pub headers: &'a [(&'a str, &'a str)],
  pub payload: &'a [u8],
}

/// Sign a request, returning the headers to attach to it
///
/// The result always contains `x-amz-date`, `x-amz-content-sha256` and
/// `authorization`, plus `x-amz-security-token` for temporary credentials.
pub fn sign(
  request: &SigningRequest<'_>,
  credentials: &Credentials,
  region: &str,
  service: &str,
  now: DateTime<Utc>,
) -> Vec<(String, String)> {
  let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
  let date = now.format("%Y%m%d").to_string();
  let payload_hash = sha256_hex(request.payload);

  let mut headers: Vec<(String, String)> = request
    .headers
    .iter()
    .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
    .collect();
  headers.push(("host".to_string(), request.host.to_string()));
  headers.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
  headers.push(("x-amz-date".to_string(), amz_date.clone()));
  if let Some(token) = &credentials.session_token {
    headers.push(("x-amz-security-token".to_string(), token.clone()));
  }
  headers.sort();

  let canonical_headers: String = headers.iter().map(|(n, v)| format!("{}:{}\n", n, v)).collect();
  let signed_headers = headers.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(";");

  let canonical_request = format!(
    "{}\n{}\n\n{}\n{}\n{}",
    request.method, request.path, canonical_headers, signed_headers, payload_hash
  );

  let scope = format!("{}/{}/{}/aws4_request", date, region, service);
  let string_to_sign = format!(
    "{}\n{}\n{}\n{}",
    ALGORITHM,
    amz_date,
    scope,
    sha256_hex(canonical_request.as_bytes())
  );

  let key = signing_key(&credentials.secret_access_key, &date, region, service);
  let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes()));

  let authorization = format!(
    "{} Credential={}/{}, SignedHeaders={}, Signature={}",
    ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
  );

  let mut out = vec![
    ("x-amz-date".to_string(), amz_date),
    ("x-amz-content-sha256".to_string(), payload_hash),
  ];
  if let Some(token) = &credentials.session_token {
    out.push(("x-amz-security-token".to_string(), token.clone()));
  }
  out.push(("authorization".to_string(), authorization));
  out
}

/// Derive the per-day, per-scope signing key
pub fn signing_key(secret_access_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
  let k_date = hmac_sha256(format!("AWS4{}", secret_access_key).as_bytes(), date.as_bytes());
  let k_region = hmac_sha256(&k_date, region.as_bytes());
  let k_service = hmac_sha256(&k_region, service.as_bytes());
  hmac_sha256(&k_service, b"aws4_request")
}

/// Percent-encode everything outside the RFC 3986 unreserved set
pub fn uri_encode(segment: &str) -> String {
  let mut out = String::with_capacity(segment.len());
  for byte in segment.bytes() {
    if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
      out.push(byte as char);
    } else {
      out.push_str(&format!("%{:02X}", byte));
    }
  }
  out
}

pub fn sha256_hex(bytes: &[u8]) -> String {
  format!("{:x}", Sha256::digest(bytes))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
  // HMAC accepts keys of any length, so this never fails
  let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key of any length");
  mac.update(data);
  mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
