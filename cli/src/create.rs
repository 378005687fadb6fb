//! `elastic-pool create`: validate, make sure the pool does not exist yet, build the request and
//! submit it.

use std::collections::BTreeMap;

use anyhow::Result;
use azsql_api_client::{util::ParsedJson, SqlManagement};
use azsql_common::{
    models::{
        elastic_pool::{
            megabytes_to_bytes, Edition, ElasticPool, ElasticPoolProperties, PerDatabaseSettings,
            Sku,
        },
        error::ApiError,
    },
    constants::MAX_STORAGE_MB,
    tags::create_tag_map,
};
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum CreatePoolError {
    #[error("The elastic pool '{pool}' already exists in server '{server}'.")]
    AlreadyExists { pool: String, server: String },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// How the capacity of a pool is expressed. The two models can not be mixed.
#[derive(Debug, Clone, PartialEq)]
pub enum Sizing {
    Dtu {
        edition: Option<Edition>,
        dtu: Option<i32>,
        database_dtu_min: Option<i32>,
        database_dtu_max: Option<i32>,
    },
    Vcore {
        vcore: i32,
        requested_sku_name: String,
        edition: Option<Edition>,
    },
}

/// Everything the caller asked for. `None` means the option was not given.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateElasticPoolParams {
    pub resource_group: String,
    pub server: String,
    pub name: String,
    pub sizing: Sizing,
    pub storage_mb: Option<i64>,
    pub tags: Vec<(String, String)>,
    pub zone_redundant: Option<bool>,
}

/// Create a pool that must not exist yet, returning the service's view of the new pool
pub async fn create_elastic_pool<S>(
    client: &S,
    params: &CreateElasticPoolParams,
) -> Result<ParsedJson<ElasticPool>>
where
    S: SqlManagement + ?Sized,
{
    let tags = validate(params)?;
    ensure_absent(client, params).await?;
    let request = construct(client, params, tags).await?;
    persist(client, params, &request).await
}

/// Checks that need no remote calls, so bad input never reaches the service
fn validate(params: &CreateElasticPoolParams) -> Result<Option<BTreeMap<String, String>>> {
    if let Sizing::Dtu {
        database_dtu_min: Some(min),
        database_dtu_max: Some(max),
        ..
    } = params.sizing
    {
        if min > max {
            return Err(CreatePoolError::InvalidParameters(format!(
                "--database-dtu-min ({min}) can not be larger than --database-dtu-max ({max})"
            ))
            .into());
        }
    }

    if let Some(storage_mb) = params.storage_mb {
        if storage_mb < 0 || megabytes_to_bytes(storage_mb).is_none() {
            return Err(CreatePoolError::InvalidParameters(format!(
                "--storage-mb must be between 0 and {MAX_STORAGE_MB}, got {storage_mb}"
            ))
            .into());
        }
    }

    Ok(create_tag_map(params.tags.clone())?)
}

async fn ensure_absent<S>(client: &S, params: &CreateElasticPoolParams) -> Result<()>
where
    S: SqlManagement + ?Sized,
{
    match client
        .get_elastic_pool(&params.resource_group, &params.server, &params.name)
        .await
    {
        Ok(_) => Err(CreatePoolError::AlreadyExists {
            pool: params.name.clone(),
            server: params.server.clone(),
        }
        .into()),
        Err(err) if err.downcast_ref::<ApiError>().is_some_and(ApiError::is_not_found) => {
            trace!(pool = %params.name, "no existing pool, continuing");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

async fn construct<S>(
    client: &S,
    params: &CreateElasticPoolParams,
    tags: Option<BTreeMap<String, String>>,
) -> Result<ElasticPool>
where
    S: SqlManagement + ?Sized,
{
    let location = client
        .get_server_location(&params.resource_group, &params.server)
        .await?;

    Ok(elastic_pool_request(location, params, tags))
}

async fn persist<S>(
    client: &S,
    params: &CreateElasticPoolParams,
    request: &ElasticPool,
) -> Result<ParsedJson<ElasticPool>>
where
    S: SqlManagement + ?Sized,
{
    debug!(pool = %params.name, location = %request.location, "creating elastic pool");

    client
        .upsert_elastic_pool(&params.resource_group, &params.server, &params.name, request)
        .await
}

/// Build the request body. Only options the caller gave end up in it.
///
/// A storage limit too large to express in bytes is left out; `create_elastic_pool` rejects it
/// before getting here.
pub fn elastic_pool_request(
    location: String,
    params: &CreateElasticPoolParams,
    tags: Option<BTreeMap<String, String>>,
) -> ElasticPool {
    let (sku, per_database_settings) = match &params.sizing {
        Sizing::Dtu {
            edition,
            dtu,
            database_dtu_min,
            database_dtu_max,
        } => {
            let sku = Sku {
                name: edition.map(|e| e.pool_sku_name()),
                tier: edition.map(|e| e.to_string()),
                capacity: *dtu,
                ..Default::default()
            };
            let per_database_settings = PerDatabaseSettings {
                min_capacity: database_dtu_min.map(f64::from),
                max_capacity: database_dtu_max.map(f64::from),
            };

            (sku, Some(per_database_settings).filter(|s| !s.is_empty()))
        }
        Sizing::Vcore {
            vcore,
            requested_sku_name,
            edition,
        } => {
            let sku = Sku {
                name: Some(requested_sku_name.clone()),
                tier: edition.map(|e| e.to_string()),
                capacity: Some(*vcore),
                ..Default::default()
            };

            (sku, None)
        }
    };

    ElasticPool {
        location,
        tags,
        sku: Some(sku).filter(|s| *s != Sku::default()),
        properties: ElasticPoolProperties {
            max_size_bytes: params.storage_mb.and_then(megabytes_to_bytes),
            per_database_settings,
            zone_redundant: params.zone_redundant,
            ..Default::default()
        },
        ..Default::default()
    }
}
