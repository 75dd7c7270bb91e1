use super::sigv4::{self, Credentials, SigningRequest};
use super::{ObjectStore, StoreError, StoreErrorCode};
use crate::core::config::StorageConfig;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use std::time::Instant;

const SERVICE: &str = "s3";

/// S3 bucket addressed with path-style URLs
///
/// Works against AWS and against S3-compatible servers reachable through
/// `AWS_ENDPOINT_URL`. Every request is SigV4-signed.
pub struct S3Store {
  pub endpoint: String,
  pub bucket: String,
  pub region: String,
  credentials: Credentials,
  client: Client,
}

impl S3Store {
  #[must_use]
  pub fn new(bucket: String, region: String, credentials: Credentials) -> Self {
    Self {
      endpoint: format!("https://s3.{}.amazonaws.com", region),
      bucket,
      region,
      credentials,
      client: Client::new(),
    }
  }

  pub fn from_config(config: &StorageConfig) -> Self {
    let credentials = Credentials {
      access_key_id: config.access_key_id.clone(),
      secret_access_key: config.secret_access_key.clone(),
      session_token: config.session_token.clone(),
    };
    Self::new(config.bucket.clone(), config.region.clone(), credentials).with_endpoint(config.endpoint.clone())
  }

  #[must_use]
  pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
    if let Some(endpoint) = endpoint
      .map(|x| x.trim_end_matches('/').to_string())
      .filter(|x| !x.is_empty())
    {
      self.endpoint = endpoint;
    }
    self
  }

  /// URI-encoded request path for a key
  fn object_path(&self, key: &str) -> String {
    let key_path = key
      .trim_start_matches('/')
      .split('/')
      .map(sigv4::uri_encode)
      .collect::<Vec<_>>()
      .join("/");
    format!("/{}/{}", sigv4::uri_encode(&self.bucket), key_path)
  }

  fn host(&self) -> &str {
    let without_scheme = self.endpoint.split_once("://").map(|(_, rest)| rest).unwrap_or(&self.endpoint);
    without_scheme.split('/').next().unwrap_or(without_scheme)
  }

  fn signed(
    &self,
    builder: RequestBuilder,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    payload: &[u8],
  ) -> RequestBuilder {
    let request = SigningRequest {
      method,
      host: self.host(),
      path,
      headers,
      payload,
    };
    sigv4::sign(&request, &self.credentials, &self.region, SERVICE, chrono::Utc::now())
      .into_iter()
      .fold(builder, |b, (name, value)| b.header(name, value))
  }
}

impl ObjectStore for S3Store {
  fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
    let started = Instant::now();
    let path = self.object_path(key);
    let url = format!("{}{}", self.endpoint, path);
    tracing::debug!(%url, "s3 GET");

    let resp = self
      .signed(self.client.get(&url), "GET", &path, &[], b"")
      .send()
      .map_err(|e| StoreError::new(StoreErrorCode::Network, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(status_error(status, "get", key, resp.text().unwrap_or_default()));
    }

    let bytes = resp
      .bytes()
      .map_err(|e| StoreError::new(StoreErrorCode::Network, e.to_string()))?
      .to_vec();
    tracing::debug!(bytes = bytes.len(), elapsed_ms = started.elapsed().as_millis() as u64, "s3 GET done");
    Ok(bytes)
  }

  fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
    let started = Instant::now();
    let path = self.object_path(key);
    let url = format!("{}{}", self.endpoint, path);
    tracing::debug!(%url, bytes = bytes.len(), content_type, "s3 PUT");

    let req = self
      .client
      .put(&url)
      .header(reqwest::header::CONTENT_TYPE, content_type)
      .body(bytes.to_vec());
    let resp = self
      .signed(req, "PUT", &path, &[("content-type", content_type)], bytes)
      .send()
      .map_err(|e| StoreError::new(StoreErrorCode::Network, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(status_error(status, "put", key, resp.text().unwrap_or_default()));
    }
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "s3 PUT done");
    Ok(())
  }

  fn describe(&self, key: &str) -> String {
    format!("s3://{}/{}", self.bucket, key.trim_start_matches('/'))
  }
}

fn status_error(status: StatusCode, op: &str, key: &str, body: String) -> StoreError {
  let code = match status {
    StatusCode::NOT_FOUND => StoreErrorCode::NotFound,
    StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => StoreErrorCode::Denied,
    _ => StoreErrorCode::Network,
  };
  let detail = s3_error_code(&body).map(|c| format!(" ({})", c)).unwrap_or_default();
  StoreError::new(code, format!("s3 {} '{}' failed: {}{}", op, key, status, detail))
}

/// Pull `<Code>...</Code>` out of an S3 XML error body
fn s3_error_code(body: &str) -> Option<&str> {
  let start = body.find("<Code>")? + "<Code>".len();
  let end = body[start..].find("</Code>")? + start;
  Some(&body[start..end])
}
