use azsql_common::{constants::MAX_STORAGE_MB, models::elastic_pool::Edition, tags::parse_tag};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::create::{CreateElasticPoolParams, CreatePoolError, Sizing};

#[derive(Parser, Debug)]
#[command(version, next_help_heading = "Global options")]
pub struct AzsqlArgs {
    /// Subscription that holds the resources (default: `subscription_id` from the config file)
    #[arg(global = true, long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription: Option<String>,
    /// Bearer token for the management API (default: `access_token` from the config file)
    #[arg(global = true, long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
    /// URL of the management API to target (default: the public Azure cloud)
    #[arg(global = true, long, env = "AZSQL_API_URL", hide = true)]
    pub api_url: Option<String>,
    /// Read defaults from `config.<profile>.toml` instead of `config.toml`
    #[arg(global = true, long, env = "AZSQL_PROFILE")]
    pub profile: Option<String>,
    /// Seconds to wait for a single response from the management API
    #[arg(global = true, long, default_value_t = 60)]
    pub timeout: u64,
    /// What format to print output in
    #[arg(
        global = true,
        long = "output",
        env = "AZSQL_OUTPUT_MODE",
        default_value = "normal"
    )]
    pub output_mode: OutputMode,
    /// Turn on tracing output. (WARNING: can print sensitive data)
    #[arg(global = true, long, env = "AZSQL_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Normal,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage elastic pools
    #[command(subcommand, visible_alias = "pool")]
    ElasticPool(ElasticPoolCommand),
}

#[derive(Subcommand, Debug)]
pub enum ElasticPoolCommand {
    /// Create an elastic pool. Fails if a pool with the same name already exists
    Create(CreateArgs),
}

/// Pools are sized either in DTUs (`--dtu`, `--database-dtu-min`, `--database-dtu-max`)
/// or in vCores (`--vcore` together with `--requested-sku-name`).
#[derive(Args, Clone, Debug)]
pub struct CreateArgs {
    /// Resource group of the server
    #[arg(long, short = 'g', visible_alias = "resource-group-name")]
    pub resource_group: String,
    /// Server to create the pool on
    #[arg(long, short = 's', visible_alias = "server-name")]
    pub server: String,
    /// Name of the new pool
    #[arg(long, short = 'n', visible_alias = "elastic-pool-name")]
    pub name: String,
    /// Service tier, e.g. Standard or GeneralPurpose
    #[arg(long)]
    pub edition: Option<Edition>,
    /// Total DTUs shared by the databases in the pool
    #[arg(
        long,
        value_parser = clap::value_parser!(i32).range(0..),
        conflicts_with_all = ["vcore", "requested_sku_name"]
    )]
    pub dtu: Option<i32>,
    /// Storage limit of the pool in megabytes
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=MAX_STORAGE_MB))]
    pub storage_mb: Option<i64>,
    /// Minimum DTUs guaranteed to every database in the pool
    #[arg(
        long,
        value_parser = clap::value_parser!(i32).range(0..),
        conflicts_with_all = ["vcore", "requested_sku_name"]
    )]
    pub database_dtu_min: Option<i32>,
    /// Maximum DTUs any one database in the pool can use
    #[arg(
        long,
        value_parser = clap::value_parser!(i32).range(0..),
        conflicts_with_all = ["vcore", "requested_sku_name"]
    )]
    pub database_dtu_max: Option<i32>,
    /// vCores shared by the databases in the pool
    #[arg(
        long,
        requires = "requested_sku_name",
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    pub vcore: Option<i32>,
    /// Sku of a vCore pool, e.g. GP_Gen5
    #[arg(long, requires = "vcore")]
    pub requested_sku_name: Option<String>,
    /// Tag to set on the pool, can be given multiple times
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,
    /// Spread the pool's replicas across availability zones
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub zone_redundant: Option<bool>,
    /// Run the creation as a background job and report when it completes
    #[arg(long)]
    pub as_job: bool,
}

impl CreateArgs {
    /// Pick the sizing model from the flags that were given
    pub fn sizing(&self) -> Result<Sizing, CreatePoolError> {
        match (self.vcore, &self.requested_sku_name) {
            (Some(vcore), Some(requested_sku_name)) => Ok(Sizing::Vcore {
                vcore,
                requested_sku_name: requested_sku_name.clone(),
                edition: self.edition,
            }),
            (None, None) => Ok(Sizing::Dtu {
                edition: self.edition,
                dtu: self.dtu,
                database_dtu_min: self.database_dtu_min,
                database_dtu_max: self.database_dtu_max,
            }),
            _ => Err(CreatePoolError::InvalidParameters(
                "--vcore and --requested-sku-name must be given together".to_string(),
            )),
        }
    }

    pub fn into_params(self) -> Result<CreateElasticPoolParams, CreatePoolError> {
        let sizing = self.sizing()?;

        Ok(CreateElasticPoolParams {
            resource_group: self.resource_group,
            server: self.server,
            name: self.name,
            sizing,
            storage_mb: self.storage_mb,
            tags: self.tags,
            zone_redundant: self.zone_redundant,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, CommandFactory};
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(extra: &[&str]) -> Result<CreateArgs, clap::Error> {
        let mut argv = vec![
            "azsql", "pool", "create", "-g", "group1", "-s", "server1", "-n", "pool1",
        ];
        argv.extend_from_slice(extra);

        AzsqlArgs::try_parse_from(argv).map(|args| match args.cmd {
            Command::ElasticPool(ElasticPoolCommand::Create(create)) => create,
        })
    }

    #[test]
    fn test_args() {
        AzsqlArgs::command().debug_assert();
    }

    #[test]
    fn dtu_flags_select_dtu_sizing() {
        let args = parse(&["--edition", "standard", "--dtu", "100", "--storage-mb", "1024"]).unwrap();

        assert_eq!(
            args.sizing().unwrap(),
            Sizing::Dtu {
                edition: Some(Edition::Standard),
                dtu: Some(100),
                database_dtu_min: None,
                database_dtu_max: None,
            }
        );
        assert_eq!(args.storage_mb, Some(1024));
    }

    #[test]
    fn vcore_flags_select_vcore_sizing() {
        let args = parse(&[
            "--vcore",
            "2",
            "--requested-sku-name",
            "GP_Gen5",
            "--edition",
            "GeneralPurpose",
        ])
        .unwrap();

        assert_eq!(
            args.sizing().unwrap(),
            Sizing::Vcore {
                vcore: 2,
                requested_sku_name: "GP_Gen5".to_string(),
                edition: Some(Edition::GeneralPurpose),
            }
        );
    }

    #[test]
    fn unbound_flags_stay_unset() {
        let args = parse(&[]).unwrap();

        assert_eq!(args.zone_redundant, None);
        assert_eq!(args.storage_mb, None);
        assert!(args.tags.is_empty());
        assert!(!args.as_job);
        assert_eq!(
            args.sizing().unwrap(),
            Sizing::Dtu {
                edition: None,
                dtu: None,
                database_dtu_min: None,
                database_dtu_max: None,
            }
        );
    }

    #[test]
    fn zone_redundant_takes_an_optional_value() {
        assert_eq!(parse(&["--zone-redundant"]).unwrap().zone_redundant, Some(true));
        assert_eq!(
            parse(&["--zone-redundant", "false"]).unwrap().zone_redundant,
            Some(false)
        );
    }

    #[test]
    fn tags_are_repeatable() {
        let args = parse(&["--tag", "env=dev", "--tag", "team=data"]).unwrap();

        assert_eq!(
            args.tags,
            vec![
                ("env".to_string(), "dev".to_string()),
                ("team".to_string(), "data".to_string())
            ]
        );
        assert!(parse(&["--tag", "novalue"]).is_err());
    }

    #[test]
    fn sizing_models_are_mutually_exclusive() {
        let err = parse(&["--dtu", "100", "--vcore", "2", "--requested-sku-name", "GP_Gen5"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let err = parse(&["--vcore", "2"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["--requested-sku-name", "GP_Gen5"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_negative_and_unknown_values() {
        assert!(parse(&["--dtu", "-5"]).is_err());
        assert!(parse(&["--storage-mb", "-1"]).is_err());
        assert!(parse(&["--edition", "Gold"]).is_err());
    }

    #[test]
    fn storage_is_bounded_by_what_fits_in_bytes() {
        let largest = MAX_STORAGE_MB.to_string();
        assert_eq!(
            parse(&["--storage-mb", largest.as_str()]).unwrap().storage_mb,
            Some(MAX_STORAGE_MB)
        );

        let too_large = (MAX_STORAGE_MB + 1).to_string();
        let err = parse(&["--storage-mb", too_large.as_str()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(parse(&["--storage-mb", "9000000000000"]).is_err());
    }

    #[test]
    fn half_a_vcore_sizing_is_invalid() {
        let mut args = parse(&[]).unwrap();
        args.vcore = Some(2);

        assert!(matches!(
            args.sizing(),
            Err(CreatePoolError::InvalidParameters(_))
        ));
    }
}
