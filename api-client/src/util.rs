use std::fmt::Debug;

use anyhow::{Context, Result};
use async_trait::async_trait;
use azsql_common::models::error::ApiError;
use http::StatusCode;
use serde::{de::DeserializeOwned, Serialize};

/// Helpers for consuming and parsing response bodies and handling parsing of an ApiError if the response is 4xx/5xx
#[async_trait]
pub trait ToBodyContent {
    async fn to_json<T: DeserializeOwned>(self) -> Result<ParsedJson<T>>;
    async fn to_empty(self) -> Result<()>;
}

fn into_api_error(body: &str, status_code: StatusCode) -> ApiError {
    #[cfg(feature = "tracing")]
    tracing::trace!("Parsing response as API error");

    ApiError::from_response(body, status_code)
}

/// Tries to convert bytes to string. If not possible, returns a string symbolizing the bytes and the length
fn bytes_to_string_with_fallback(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| format!("[{} bytes]", bytes.len()))
}

/// A deserialized response that keeps the exact text it was parsed from
pub struct ParsedJson<T> {
    inner: T,
    pub raw_json: String,
}

impl<T> ParsedJson<T> {
    pub fn new(inner: T, raw_json: String) -> Self {
        Self { inner, raw_json }
    }
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Serialize> ParsedJson<T> {
    /// Wrap a value that did not come off the wire, rendering its JSON form
    pub fn from_value(inner: T) -> Result<Self> {
        let raw_json = serde_json::to_string(&inner)?;
        Ok(Self { inner, raw_json })
    }
}

impl<T> AsRef<T> for ParsedJson<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T: Debug> Debug for ParsedJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

#[async_trait]
impl ToBodyContent for reqwest::Response {
    async fn to_json<T: DeserializeOwned>(self) -> Result<ParsedJson<T>> {
        let status_code = self.status();
        let bytes = self.bytes().await?;
        let string = bytes_to_string_with_fallback(&bytes);

        #[cfg(feature = "tracing")]
        tracing::trace!(response = %string, "Parsing response as JSON");

        if status_code.is_client_error() || status_code.is_server_error() {
            return Err(into_api_error(&string, status_code).into());
        }

        let t = serde_json::from_str(&string).context("failed to parse a successful response")?;

        Ok(ParsedJson {
            inner: t,
            raw_json: string,
        })
    }

    async fn to_empty(self) -> Result<()> {
        let status_code = self.status();

        if status_code.is_client_error() || status_code.is_server_error() {
            let bytes = self.bytes().await?;
            let string = bytes_to_string_with_fallback(&bytes);
            return Err(into_api_error(&string, status_code).into());
        }

        Ok(())
    }
}
