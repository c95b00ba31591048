mod collect;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::PlanOverrides;

#[derive(Debug, Parser)]
#[command(name = "cartscan")]
#[command(about = "Collect grocery search results into object storage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every planned term and upload one JSON object per term
    Collect {
        /// Search term; repeat to search several. Replaces the plan's terms.
        #[arg(long = "term")]
        terms: Vec<String>,
        /// Postal code to search around
        #[arg(long)]
        postal: Option<String>,
        /// Country code, e.g. BR
        #[arg(long)]
        country: Option<String>,
        /// Keep going after a term fails; the run still exits non-zero
        #[arg(long)]
        keep_going: bool,
        /// Print the object keys that would be written and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved search plan
    Plan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cartscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Collect {
            terms,
            postal,
            country,
            keep_going,
            dry_run,
        } => {
            let overrides = PlanOverrides {
                terms,
                postal_code: postal,
                country_code: country,
            };
            collect::run_collect(&config, overrides, keep_going, dry_run).await?;
        }
        Commands::Plan => {
            let plan = collect::resolve_plan(&config.plan_path, PlanOverrides::default())?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}
