use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

use crate::enforcer::CallerType;

const USAGE: &str = "usage: entitler [--config <path>] <select|validate> --scenario <path> [--caller bind|list_pools|best_pools|unknown]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select,
    Validate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub command: Command,
    pub scenario_path: PathBuf,
    pub caller: CallerType,
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut command = None;
    let mut scenario_path = None;
    let mut caller = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--scenario" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --scenario"))?;
                scenario_path = Some(PathBuf::from(value));
            }
            "--caller" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --caller"))?;
                caller = Some(value.parse::<CallerType>().map_err(|err| anyhow!(err))?);
            }
            "select" if command.is_none() => command = Some(Command::Select),
            "validate" if command.is_none() => command = Some(Command::Validate),
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    let command = command.ok_or_else(|| anyhow!("missing command. {USAGE}"))?;
    let scenario_path =
        scenario_path.ok_or_else(|| anyhow!("missing --scenario <path>. {USAGE}"))?;
    let caller = caller.unwrap_or(match command {
        Command::Select => CallerType::BestPools,
        Command::Validate => CallerType::Bind,
    });

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("./entitler.jsonc")),
        command,
        scenario_path,
        caller,
    })
}
