//! propbind entry point.
//!
//! Binds `ApplicationProperties` from property files and the environment,
//! then logs every brand it found.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use propbind::domain::ApplicationProperties;
use propbind::{AppContext, Config, Error};

#[derive(Debug, Parser)]
#[command(name = "propbind", version, about = "Bind and print application properties")]
struct Cli {
    /// Property files to load, later files override earlier ones (.properties or .toml)
    #[arg(short, long = "config", default_value = "application.properties")]
    config: Vec<PathBuf>,

    /// Prefix of environment variables applied after the files
    #[arg(long, env = "PROPBIND_ENV_PREFIX", default_value = "APPLICATION")]
    env_prefix: String,

    /// Skip config files that don't exist instead of failing
    #[arg(long)]
    optional: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = propbind::logging::init(&cli.log_level) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut config = Config::builder();
    for path in &cli.config {
        config = config.with_file(path, !cli.optional);
    }
    let config = config.with_env(&cli.env_prefix, "__");

    let ctx = AppContext::<ApplicationProperties>::load(config)?;
    report(ctx.config());
    Ok(())
}

fn report(props: &ApplicationProperties) {
    info!("Map of brands");
    for (key, brand) in &props.map_of_brands {
        info!("   Key: {key}, value: {brand}");
    }
    info!("List of brands");
    for brand in &props.list_of_brands {
        info!("   Brand: {brand}");
    }
}
