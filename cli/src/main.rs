use anyhow::Result;
use azsql::{setup_tracing, Azsql, AzsqlArgs};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = AzsqlArgs::parse();
    setup_tracing(args.debug);

    Azsql::new(args.profile.clone())?.run(args).await?;

    Ok(())
}
