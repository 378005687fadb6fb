use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use azsql_common::constants::{
    DEFAULT_POLL_INTERVAL_SECS, MAX_OPERATION_WAIT_SECS, SQL_API_VERSION, SQL_PROVIDER,
};
use azsql_common::models::{
    elastic_pool::ElasticPool,
    error::{ApiError, ErrorDetail},
    server::Server,
};
use http::StatusCode;
use reqwest::Response;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::Serialize;
use url::Url;

#[cfg(feature = "tracing")]
mod middleware;
#[cfg(feature = "tracing")]
use tracing::debug;

#[cfg(feature = "tracing")]
use crate::middleware::LoggingMiddleware;

pub mod operation;
pub mod util;
use operation::{Monitor, OperationState, OperationStatus, PendingOperation};
use util::{ParsedJson, ToBodyContent};

/// The management calls creating a pool needs. Implemented over HTTP by [`SqlManagementClient`].
#[async_trait]
pub trait SqlManagement: Send + Sync {
    /// Fails with an [`ApiError`] whose status is `404` when the pool (or its server) does not exist
    async fn get_elastic_pool(
        &self,
        resource_group: &str,
        server: &str,
        pool: &str,
    ) -> Result<ParsedJson<ElasticPool>>;

    async fn get_server_location(&self, resource_group: &str, server: &str) -> Result<String>;

    /// Create or update the pool, waiting for the service to finish provisioning it
    async fn upsert_elastic_pool(
        &self,
        resource_group: &str,
        server: &str,
        pool: &str,
        body: &ElasticPool,
    ) -> Result<ParsedJson<ElasticPool>>;
}

#[derive(Clone)]
pub struct SqlManagementClient {
    pub client: ClientWithMiddleware,
    pub api_url: Url,
    pub subscription_id: String,
    pub access_token: Option<String>,
    poll_interval: Duration,
    max_operation_wait: Duration,
}

impl SqlManagementClient {
    pub fn new(
        api_url: &str,
        subscription_id: String,
        access_token: Option<String>,
        timeout: Option<u64>,
    ) -> Result<Self> {
        let api_url =
            Url::parse(api_url).with_context(|| format!("invalid management API url '{api_url}'"))?;
        if api_url.cannot_be_a_base() {
            bail!("invalid management API url '{api_url}'");
        }

        let mut builder = reqwest::Client::builder();

        if let Ok(proxy) = std::env::var("HTTP_PROXY") {
            builder = builder.proxy(reqwest::Proxy::http(proxy).context("invalid HTTP_PROXY")?);
        }

        if let Ok(proxy) = std::env::var("HTTPS_PROXY") {
            builder = builder.proxy(reqwest::Proxy::https(proxy).context("invalid HTTPS_PROXY")?);
        }

        let client = builder
            .timeout(Duration::from_secs(timeout.unwrap_or(60)))
            .build()
            .context("failed to build http client")?;

        let builder = reqwest_middleware::ClientBuilder::new(client);

        #[cfg(feature = "tracing")]
        let builder = builder.with(LoggingMiddleware);

        let client = builder.build();

        Ok(Self {
            client,
            api_url,
            subscription_id,
            access_token,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_operation_wait: Duration::from_secs(MAX_OPERATION_WAIT_SECS),
        })
    }

    /// Interval between operation polls when the service does not send `Retry-After`
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Deadline for following a long running operation, one hour by default
    pub fn with_max_operation_wait(mut self, wait: Duration) -> Self {
        self.max_operation_wait = wait;
        self
    }

    pub fn set_auth_bearer(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(ref token) = self.access_token {
            builder.bearer_auth(token)
        } else {
            builder
        }
    }

    /// `{api_url}/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Sql/servers/{server}[/..]?api-version=..`
    fn server_url(&self, resource_group: &str, server: &str, child: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("management API url can not be a base"))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                resource_group,
                "providers",
                SQL_PROVIDER,
                "servers",
                server,
            ])
            .extend(child);
        url.query_pairs_mut()
            .append_pair("api-version", SQL_API_VERSION);

        Ok(url)
    }

    fn elastic_pool_url(&self, resource_group: &str, server: &str, pool: &str) -> Result<Url> {
        self.server_url(resource_group, server, &["elasticPools", pool])
    }

    pub async fn get_server(&self, resource_group: &str, server: &str) -> Result<ParsedJson<Server>> {
        let url = self.server_url(resource_group, server, &[])?;

        self.get(url).await?.to_json().await
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        let mut builder = self.client.get(url);
        builder = self.set_auth_bearer(builder);

        Ok(builder.send().await?)
    }

    pub async fn put<T: Serialize>(&self, url: Url, body: &T) -> Result<Response> {
        let mut builder = self.client.put(url);
        builder = self.set_auth_bearer(builder);

        let body = serde_json::to_string(body)?;
        #[cfg(feature = "tracing")]
        debug!("Outgoing body: {}", body);
        builder = builder.body(body);
        builder = builder.header("Content-Type", "application/json");

        Ok(builder.send().await?)
    }

    /// Poll a long running operation until it reaches a terminal state.
    ///
    /// Gives up as soon as the next poll would be sent after `max_operation_wait` has passed,
    /// without waiting out a `Retry-After` that ends beyond it.
    pub async fn wait_for_operation(&self, operation: PendingOperation) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.max_operation_wait;
        let mut retry_after = operation.retry_after;

        loop {
            if tokio::time::Instant::now() + retry_after > deadline {
                bail!(
                    "gave up waiting on operation {} after {} seconds",
                    operation.monitor.url(),
                    self.max_operation_wait.as_secs()
                );
            }
            tokio::time::sleep(retry_after).await;

            let res = self.get(operation.monitor.url().clone()).await?;
            retry_after = operation::retry_after(res.headers()).unwrap_or(self.poll_interval);

            match operation.monitor {
                Monitor::AsyncOperation(_) => {
                    let status: OperationStatus = res.to_json().await?.into_inner();

                    #[cfg(feature = "tracing")]
                    debug!(state = ?status.status, "polled operation");

                    match status.status {
                        OperationState::Succeeded => return Ok(()),
                        OperationState::InProgress => continue,
                        state @ (OperationState::Failed | OperationState::Canceled) => {
                            let detail = status.error.unwrap_or_else(|| ErrorDetail {
                                code: format!("Operation{state:?}"),
                                message: format!("the operation ended in state {state:?}"),
                                target: None,
                                details: Vec::new(),
                            });
                            return Err(ApiError::from_detail(
                                detail,
                                StatusCode::INTERNAL_SERVER_ERROR,
                            )
                            .into());
                        }
                    }
                }
                Monitor::Location(_) => {
                    if res.status() == StatusCode::ACCEPTED {
                        continue;
                    }
                    return res.to_empty().await;
                }
            }
        }
    }
}

#[async_trait]
impl SqlManagement for SqlManagementClient {
    async fn get_elastic_pool(
        &self,
        resource_group: &str,
        server: &str,
        pool: &str,
    ) -> Result<ParsedJson<ElasticPool>> {
        let url = self.elastic_pool_url(resource_group, server, pool)?;

        self.get(url).await?.to_json().await
    }

    async fn get_server_location(&self, resource_group: &str, server: &str) -> Result<String> {
        let server = self
            .get_server(resource_group, server)
            .await
            .with_context(|| format!("failed to look up server '{server}'"))?;

        Ok(server.into_inner().location)
    }

    async fn upsert_elastic_pool(
        &self,
        resource_group: &str,
        server: &str,
        pool: &str,
        body: &ElasticPool,
    ) -> Result<ParsedJson<ElasticPool>> {
        let url = self.elastic_pool_url(resource_group, server, pool)?;
        let res = self.put(url, body).await?;

        if let Some(operation) = PendingOperation::from_response(&res, self.poll_interval) {
            #[cfg(feature = "tracing")]
            debug!(monitor = ?operation.monitor, "waiting on elastic pool creation");

            self.wait_for_operation(operation).await?;

            return self.get_elastic_pool(resource_group, server, pool).await;
        }

        if res.status() == StatusCode::ACCEPTED {
            // accepted without anything to watch, the pool itself shows the outcome
            return self.get_elastic_pool(resource_group, server, pool).await;
        }

        res.to_json().await
    }
}
