//! Background execution for `--as-job`.

use anyhow::{Context, Result};
use azsql_api_client::{util::ParsedJson, SqlManagement};
use azsql_common::models::elastic_pool::ElasticPool;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::create::{create_elastic_pool, CreateElasticPoolParams};

/// A pool creation running on its own task. Errors surface from [`Job::wait`].
pub struct Job {
    pub id: Uuid,
    handle: JoinHandle<Result<ParsedJson<ElasticPool>>>,
}

pub fn spawn<S>(client: S, params: CreateElasticPoolParams) -> Job
where
    S: SqlManagement + 'static,
{
    let id = Uuid::new_v4();
    let span = info_span!("job", %id, pool = %params.name);

    let handle = tokio::spawn(
        async move {
            debug!("job started");
            let res = create_elastic_pool(&client, &params).await;
            debug!(ok = res.is_ok(), "job finished");
            res
        }
        .instrument(span),
    );

    Job { id, handle }
}

impl Job {
    pub async fn wait(self) -> Result<ParsedJson<ElasticPool>> {
        self.handle
            .await
            .with_context(|| format!("job {} did not run to completion", self.id))?
    }
}
