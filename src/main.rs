use anyhow::{Context, Result};

use entitler::{
    cli::{Command, args_from_env},
    config::Config,
    logging::init_tracing,
    scenario::Scenario,
};

fn main() -> Result<()> {
    let args = args_from_env()?;
    let config = Config::load_or_default(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let logging_guard = init_tracing(&config.logging).context("failed to initialize logging")?;

    let scenario = Scenario::load(&args.scenario_path)?;
    tracing::info!(
        target: "entitler",
        run_id = %logging_guard.run_id(),
        command = ?args.command,
        caller = %args.caller,
        consumer_id = %scenario.consumer.id,
        pools = scenario.pools.len(),
        "scenario_loaded"
    );

    let output = match args.command {
        Command::Select => serde_json::to_string_pretty(&scenario.select(&config)),
        Command::Validate => {
            serde_json::to_string_pretty(&scenario.validate(&config, args.caller)?)
        }
    }
    .context("failed to render result")?;

    println!("{output}");
    Ok(())
}
