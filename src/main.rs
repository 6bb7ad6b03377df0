use anyhow::Context;
use catch_forecast::{cli, ForecastConfig, ForecastContext};
use log::info;
use tokio::io::{self, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ForecastConfig::from_env().context("loading the configuration")?;
    info!(samples = config.samples, epochs = config.epochs.get(); "training the forecaster");

    let mut context = ForecastContext::bootstrap(config)
        .await
        .context("training the forecaster")?;

    let served = cli::run(&mut context, BufReader::new(io::stdin()), io::stdout()).await?;

    info!(snapshots = served; "input closed, shutting down");
    Ok(())
}
