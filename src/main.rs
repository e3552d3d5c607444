use anyhow::Result;
use clap::Parser;
use tikun_olam::cli::{Cli, Commands};
use tikun_olam::config::Config;
use tikun_olam::store::SqliteCaseStore;
use tikun_olam::{client, gateway, seed};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::load_or_default()?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            gateway::run_gateway(&host, port, config).await
        }
        Commands::Seed { data_dir } => {
            let store =
                SqliteCaseStore::open(std::path::Path::new(&config.storage.database_path)).await?;
            let summary = seed::run_seed(&store, &data_dir).await?;
            println!(
                "✓ seeded {} case(s), {} result row(s), {} sigma record(s)",
                summary.cases, summary.results, summary.sigmas
            );
            Ok(())
        }
        Commands::Analyze {
            case_name,
            scenario,
            url,
        } => {
            let result = client::run_analysis(&url, &case_name, &scenario).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
