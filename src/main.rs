mod argsets;
mod command;

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use env_logger::Env;

use ipmigw::constants::{defaults, envvars};
use ipmigw::helpers::load_dotenv;

const CMD_PING: &str = "ping";
const CMD_SCAN: &str = "scan";
const CMD_DUMP: &str = "dump";
const CMD_RUN: &str = "run";

fn config_path(args: &mut pico_args::Arguments) -> Result<PathBuf> {
    if let Some(path) = args.opt_value_from_str("--config")? {
        return Ok(path);
    }
    env::var(envvars::CONFIG)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("No config given; pass --config or set {}", envvars::CONFIG))
}

fn main() -> Result<()> {
    load_dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_PING) => command::ping(argsets::ConfigArgs {
            config: config_path(&mut args)?,
        }),
        Some(CMD_SCAN) => command::scan(argsets::ConfigArgs {
            config: config_path(&mut args)?,
        }),
        Some(CMD_DUMP) => command::dump(argsets::DumpArgs {
            config: config_path(&mut args)?,
            file: args.free_from_str()?,
        }),
        Some(CMD_RUN) => command::run(argsets::RunArgs {
            once: args.contains("--once"),
            config: config_path(&mut args)?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'ping', 'scan', 'dump', 'run'"
        )),
    }
}
