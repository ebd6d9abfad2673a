use anyhow::Result;
use clap::Parser;
use clerk_server::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli).await
}
