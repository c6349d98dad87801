use clap::Parser;
use coursework_sync_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    coursework_sync_lib::run(cli).await
}
