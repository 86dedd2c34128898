use anyhow::Result;
use docqa::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
