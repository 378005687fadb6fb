use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[cfg(feature = "display")]
use comfy_table::{
    presets::{NOTHING, UTF8_BORDERS_ONLY},
    Attribute, Cell, ContentArrangement, Table,
};
#[cfg(feature = "display")]
use crossterm::style::Stylize;

use crate::constants::{BYTES_PER_MEGABYTE, DTU_POOL_SKU_POSTFIX};

/// Service tier of a pool. Parsed case-insensitively, displayed in the form the service expects.
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum Edition {
    Basic,
    Standard,
    Premium,
    GeneralPurpose,
    BusinessCritical,
    Hyperscale,
}

impl Edition {
    /// Sku name of a DTU based pool in this edition, e.g. `StandardPool`
    pub fn pool_sku_name(&self) -> String {
        format!("{self}{DTU_POOL_SKU_POSTFIX}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Capacity bounds applied to every database in the pool
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerDatabaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<f64>,
}

impl PerDatabaseSettings {
    pub fn is_empty(&self) -> bool {
        self.min_capacity.is_none() && self.max_capacity.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPoolProperties {
    /// Read only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Read only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_database_settings: Option<PerDatabaseSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_redundant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_configuration_id: Option<String>,
}

/// An elastic pool resource. Used both as the body of a create request and as the service's answer.
///
/// Every optional field is left out of the serialized form when it is `None`, so the service can
/// tell "not given" apart from an explicit zero or `false`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: ElasticPoolProperties,
}

/// Convert a storage limit given in megabytes to the byte count the service expects.
///
/// Returns `None` when the byte count does not fit in an `i64`.
pub fn megabytes_to_bytes(megabytes: i64) -> Option<i64> {
    megabytes.checked_mul(BYTES_PER_MEGABYTE)
}

impl ElasticPool {
    /// Look up the segment following `key` in the resource id,
    /// e.g. `servers` in `/subscriptions/../servers/{server}/elasticPools/{pool}`.
    fn id_segment(&self, key: &str) -> Option<&str> {
        let mut segments = self.id.as_deref()?.split('/');
        segments.find(|s| s.eq_ignore_ascii_case(key))?;
        segments.next()
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.id_segment("resourceGroups")
    }

    pub fn server_name(&self) -> Option<&str> {
        self.id_segment("servers")
    }

    #[cfg(feature = "display")]
    pub fn to_string_colored(&self, raw: bool) -> String {
        format!(
            "{}\n{}",
            "Elastic pool:".bold(),
            get_elastic_pool_table(self, raw)
        )
    }
}

#[cfg(feature = "display")]
pub fn get_elastic_pool_table(pool: &ElasticPool, raw: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(if raw { NOTHING } else { UTF8_BORDERS_ONLY })
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(vec!["Property", "Value"]);

    let na = || "N/A".to_string();
    let sku = pool.sku.clone().unwrap_or_default();
    let per_db = pool
        .properties
        .per_database_settings
        .clone()
        .unwrap_or_default();
    let tags = pool
        .tags
        .as_ref()
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_else(na);

    let rows = [
        ("Name", pool.name.clone().unwrap_or_else(na)),
        (
            "Resource group",
            pool.resource_group().map(str::to_string).unwrap_or_else(na),
        ),
        (
            "Server",
            pool.server_name().map(str::to_string).unwrap_or_else(na),
        ),
        ("Location", pool.location.clone()),
        ("Sku", sku.name.unwrap_or_else(na)),
        ("Tier", sku.tier.unwrap_or_else(na)),
        (
            "Capacity",
            sku.capacity.map(|c| c.to_string()).unwrap_or_else(na),
        ),
        (
            "Max size (bytes)",
            pool.properties
                .max_size_bytes
                .map(|b| b.to_string())
                .unwrap_or_else(na),
        ),
        (
            "Per database min",
            per_db.min_capacity.map(|c| c.to_string()).unwrap_or_else(na),
        ),
        (
            "Per database max",
            per_db.max_capacity.map(|c| c.to_string()).unwrap_or_else(na),
        ),
        (
            "Zone redundant",
            pool.properties
                .zone_redundant
                .map(|z| z.to_string())
                .unwrap_or_else(na),
        ),
        ("State", pool.properties.state.clone().unwrap_or_else(na)),
        (
            "Created",
            pool.properties
                .creation_date
                .map(|d| d.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                .unwrap_or_else(na),
        ),
        ("Tags", tags),
    ];

    for (property, value) in rows {
        table.add_row(vec![
            Cell::new(property).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }

    table.to_string()
}
