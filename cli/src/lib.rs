pub mod args;
pub mod config;
pub mod create;
pub mod job;

use anyhow::Result;
use azsql_api_client::{util::ParsedJson, SqlManagementClient};
use azsql_common::models::elastic_pool::ElasticPool;
use tracing::trace;

pub use crate::args::{AzsqlArgs, Command, CreateArgs, ElasticPoolCommand, OutputMode};
use crate::config::RequestContext;
use crate::create::create_elastic_pool;

/// Install the tracing subscriber, printing to stderr so stdout stays parseable
pub fn setup_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(
            // RUST_LOG wins over --debug
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                Into::into(if debug {
                    "warn,azsql=trace,azsql_api_client=trace,azsql_common=trace"
                } else {
                    "warn"
                })
            }),
        )
        .init();
}

pub struct Azsql {
    ctx: RequestContext,
    output_mode: OutputMode,
}

impl Azsql {
    pub fn new(profile: Option<String>) -> Result<Self> {
        let ctx = RequestContext::load_global(profile)?;
        Ok(Self::with_context(ctx))
    }

    pub fn with_context(ctx: RequestContext) -> Self {
        Self {
            ctx,
            output_mode: OutputMode::default(),
        }
    }

    pub async fn run(mut self, args: AzsqlArgs) -> Result<()> {
        trace!("running azsql");
        self.output_mode = args.output_mode;
        self.ctx.set_subscription_id(args.subscription);
        self.ctx.set_access_token(args.access_token);
        self.ctx.set_api_url(args.api_url);

        let client = SqlManagementClient::new(
            &self.ctx.api_url(),
            self.ctx.subscription_id()?,
            Some(self.ctx.access_token()?),
            Some(args.timeout),
        )?;

        match args.cmd {
            Command::ElasticPool(ElasticPoolCommand::Create(create_args)) => {
                self.elastic_pool_create(client, create_args).await
            }
        }
    }

    async fn elastic_pool_create(
        &self,
        client: SqlManagementClient,
        args: CreateArgs,
    ) -> Result<()> {
        let as_job = args.as_job;
        let params = args.into_params()?;

        let pool = if as_job {
            let job = job::spawn(client, params);
            eprintln!("Started job {}", job.id);
            job.wait().await?
        } else {
            create_elastic_pool(&client, &params).await?
        };

        self.report(pool);

        Ok(())
    }

    fn report(&self, pool: ParsedJson<ElasticPool>) {
        match self.output_mode {
            OutputMode::Normal => println!("{}", pool.as_ref().to_string_colored(false)),
            OutputMode::Json => println!("{}", pool.raw_json),
        }
    }
}
