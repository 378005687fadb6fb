//! Tracking of long running Resource Manager operations.
//!
//! A create that can not finish within the request is answered with `201`/`202` and a URL to
//! watch, either in `Azure-AsyncOperation` (an operation status document) or in `Location`
//! (answers `202` until done).

use std::time::Duration;

use azsql_common::models::error::ErrorDetail;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

pub const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

#[derive(Debug, Clone, PartialEq)]
pub enum Monitor {
    AsyncOperation(Url),
    Location(Url),
}

impl Monitor {
    pub fn url(&self) -> &Url {
        match self {
            Monitor::AsyncOperation(url) | Monitor::Location(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub monitor: Monitor,
    pub retry_after: Duration,
}

impl PendingOperation {
    /// Returns `None` for responses that already carry the final result
    pub fn from_response(res: &Response, default_interval: Duration) -> Option<Self> {
        if !matches!(res.status(), StatusCode::CREATED | StatusCode::ACCEPTED) {
            return None;
        }

        let headers = res.headers();
        let monitor = if let Some(url) = header_url(headers, ASYNC_OPERATION_HEADER) {
            Monitor::AsyncOperation(url)
        } else {
            Monitor::Location(header_url(headers, LOCATION.as_str())?)
        };

        Some(Self {
            monitor,
            retry_after: retry_after(headers).unwrap_or(default_interval),
        })
    }
}

fn header_url(headers: &HeaderMap, name: &str) -> Option<Url> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
}

/// Only the delay-seconds form of `Retry-After` is sent by the management API
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Body served from an `Azure-AsyncOperation` URL
#[derive(Debug, Deserialize)]
pub struct OperationStatus {
    pub status: OperationState,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum OperationState {
    Succeeded,
    Failed,
    Canceled,
    /// `InProgress` and any provider specific intermediate state
    #[serde(other)]
    InProgress,
}
