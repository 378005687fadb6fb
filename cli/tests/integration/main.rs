mod create;

use std::{future::Future, path::PathBuf};

use azsql::{config::RequestContext, Azsql, AzsqlArgs};
use azsql_common::config::GlobalConfig;
use azsql_common_tests::arm::{ACCESS_TOKEN, SUBSCRIPTION_ID};
use clap::Parser;

/// runs `azsql` against `api_url` with credentials given as flags and an empty config file
fn azsql_command(
    api_url: &str,
    extra: &[&str],
) -> impl Future<Output = anyhow::Result<()>> {
    let mut argv = vec![
        "azsql",
        "--subscription",
        SUBSCRIPTION_ID,
        "--access-token",
        ACCESS_TOKEN,
        "--api-url",
        api_url,
        "--output",
        "json",
    ];
    argv.extend_from_slice(extra);
    let args = AzsqlArgs::try_parse_from(argv).unwrap();

    let ctx = RequestContext::new(
        GlobalConfig::default(),
        PathBuf::from("/nonexistent/azsql/config.toml"),
    );

    Azsql::with_context(ctx).run(args)
}

#[tokio::test]
async fn missing_access_token_is_reported_before_any_request() {
    let mut args = AzsqlArgs::try_parse_from([
        "azsql",
        "--subscription",
        SUBSCRIPTION_ID,
        "--api-url",
        "http://azsql.invalid",
        "pool",
        "create",
        "-g",
        "group1",
        "-s",
        "server1",
        "-n",
        "pool1",
    ])
    .unwrap();
    // the environment may carry a token
    args.access_token = None;

    let ctx = RequestContext::new(
        GlobalConfig::default(),
        PathBuf::from("/nonexistent/azsql/config.toml"),
    );
    let err = Azsql::with_context(ctx).run(args).await.err().unwrap();

    assert!(err.to_string().starts_with("No access token found"));
}
